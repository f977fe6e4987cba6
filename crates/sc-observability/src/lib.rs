use metrics::{describe_counter, describe_gauge, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
    pub metrics_addr: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ObservabilityHandle {
    pub service_name: String,
    pub metrics_enabled: bool,
}

/// Installs the global tracing subscriber and, when an address is
/// configured, the Prometheus exporter. Safe to call more than once; later
/// calls leave the first subscriber in place.
pub fn init(config: &ObservabilityConfig) -> ObservabilityHandle {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);

    let metrics_enabled = init_metrics(config);
    if metrics_enabled {
        describe_zone_metrics();
    }

    ObservabilityHandle {
        service_name: config.service_name.clone(),
        metrics_enabled,
    }
}

pub fn log_startup(handle: &ObservabilityHandle, environment: &str) {
    tracing::info!(
        service = %handle.service_name,
        environment = %environment,
        metrics_enabled = handle.metrics_enabled,
        "zone service starting"
    );
}

fn describe_zone_metrics() {
    describe_counter!(
        "sc_zone_alerts_total",
        Unit::Count,
        "Hazard overlap alerts handed to the notification channel"
    );
    describe_counter!(
        "sc_zone_alert_failures_total",
        Unit::Count,
        "Hazard overlap alerts the notification channel refused"
    );
    describe_counter!(
        "sc_zone_records_rejected_total",
        Unit::Count,
        "Stored zone records skipped as malformed or invalid"
    );
    describe_counter!(
        "sc_zone_snapshots_applied_total",
        Unit::Count,
        "Zone snapshots applied, by kind"
    );
    describe_gauge!("sc_zones", Unit::Count, "Zones currently held, by kind");
}

fn parse_metrics_addr(config: &ObservabilityConfig) -> Option<SocketAddr> {
    let addr = config.metrics_addr.as_ref()?;
    match addr.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(
                service = %config.service_name,
                error = %err,
                "Invalid SC_METRICS_ADDR value"
            );
            None
        }
    }
}

fn init_metrics(config: &ObservabilityConfig) -> bool {
    let Some(addr) = parse_metrics_addr(config) else {
        return false;
    };

    let builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", config.service_name.clone())
        .add_global_label("environment", config.environment.clone());

    match builder.install() {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                service = %config.service_name,
                error = %err,
                "Failed to initialize Prometheus exporter"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(metrics_addr: Option<&str>) -> ObservabilityConfig {
        ObservabilityConfig {
            service_name: "sc-worker".to_string(),
            environment: "local".to_string(),
            log_level: "debug".to_string(),
            metrics_addr: metrics_addr.map(str::to_string),
        }
    }

    #[test]
    fn metrics_disabled_without_addr() {
        let handle = init(&config(None));
        assert!(!handle.metrics_enabled);
        assert_eq!(handle.service_name, "sc-worker");
    }

    #[test]
    fn bad_metrics_addr_is_ignored() {
        assert!(parse_metrics_addr(&config(Some("not-an-addr"))).is_none());
        assert_eq!(
            parse_metrics_addr(&config(Some("127.0.0.1:9464"))),
            Some(SocketAddr::from(([127, 0, 0, 1], 9464)))
        );
    }
}
