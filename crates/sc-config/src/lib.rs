use sc_geo::{DEFAULT_POLYGON_STEPS, MIN_POLYGON_STEPS};
use serde::{Deserialize, Serialize};
use std::{env, fmt};

/// Upper bound for `SC_POLYGON_STEPS`; every rendered zone allocates one
/// vertex per step.
pub const MAX_POLYGON_STEPS: u32 = 4096;
pub const DEFAULT_PLACE_RADIUS_M: f64 = 500.0;
pub const DEFAULT_SELF_ZONE_RADIUS_M: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Local,
    Dev,
    Test,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_env(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "local" => Self::Local,
            "dev" | "development" => Self::Dev,
            "test" | "testing" => Self::Test,
            "staging" => Self::Staging,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Prod => "prod",
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub environment: Environment,
    pub metrics_addr: Option<String>,
    pub log_level: String,
    /// Owner of the zone document this process follows.
    pub user_id: Option<String>,
}

impl ServiceConfig {
    pub fn from_env(default_service_name: &str) -> Self {
        Self::from_lookup(default_service_name, |key| env::var(key).ok())
    }

    pub fn from_lookup(
        default_service_name: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let service_name =
            lookup("SC_SERVICE_NAME").unwrap_or_else(|| default_service_name.to_string());
        let environment =
            Environment::from_env(&lookup("SC_ENV").unwrap_or_else(|| "local".to_string()));
        let metrics_addr = lookup("SC_METRICS_ADDR").filter(|value| !value.trim().is_empty());
        let log_level = lookup("SC_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let user_id = lookup("SC_USER_ID").filter(|value| !value.trim().is_empty());

        Self {
            service_name,
            environment,
            metrics_addr,
            log_level,
            user_id,
        }
    }
}

/// Knobs for the zone engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub polygon_steps: u32,
    /// Radius given to zones placed without an explicit one.
    pub default_radius_m: f64,
    pub self_zone_radius_m: f64,
    /// Where to seed the "You" zone when the document is empty.
    pub self_position: Option<(f64, f64)>,
    /// JSON document loaded at startup.
    pub zones_file: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            polygon_steps: DEFAULT_POLYGON_STEPS,
            default_radius_m: DEFAULT_PLACE_RADIUS_M,
            self_zone_radius_m: DEFAULT_SELF_ZONE_RADIUS_M,
            self_position: None,
            zones_file: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let polygon_steps = parse_or(&lookup, "SC_POLYGON_STEPS", defaults.polygon_steps)
            .clamp(MIN_POLYGON_STEPS, MAX_POLYGON_STEPS);
        let default_radius_m = positive_or(&lookup, "SC_DEFAULT_RADIUS_M", defaults.default_radius_m);
        let self_zone_radius_m =
            positive_or(&lookup, "SC_SELF_ZONE_RADIUS_M", defaults.self_zone_radius_m);
        let self_position = match (
            parse_opt::<f64>(&lookup, "SC_SELF_LAT"),
            parse_opt::<f64>(&lookup, "SC_SELF_LNG"),
        ) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        };
        let zones_file = lookup("SC_ZONES_FILE").filter(|value| !value.trim().is_empty());

        Self {
            polygon_steps,
            default_radius_m,
            self_zone_radius_m,
            self_position,
            zones_file,
        }
    }
}

fn parse_opt<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse::<T>().ok())
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    parse_opt(lookup, key).unwrap_or(default)
}

fn positive_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    parse_opt::<f64>(lookup, key)
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(default)
}
