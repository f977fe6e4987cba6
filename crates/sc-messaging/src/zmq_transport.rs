use crate::MessageEnvelope;
use serde::Serialize;
use std::{env, fmt};

#[derive(Debug)]
pub enum MessagingError {
    Zmq(zmq::Error),
    Serde(serde_json::Error),
    Poisoned,
}

impl fmt::Display for MessagingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zmq(err) => write!(f, "zmq error: {}", err),
            Self::Serde(err) => write!(f, "serialization error: {}", err),
            Self::Poisoned => write!(f, "publisher lock poisoned"),
        }
    }
}

impl std::error::Error for MessagingError {}

impl From<zmq::Error> for MessagingError {
    fn from(value: zmq::Error) -> Self {
        Self::Zmq(value)
    }
}

impl From<serde_json::Error> for MessagingError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZmqPublisherConfig {
    pub endpoint: String,
    pub bind: bool,
    pub high_water_mark: Option<i32>,
    pub linger_ms: Option<i32>,
}

impl ZmqPublisherConfig {
    pub fn bind(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bind: true,
            high_water_mark: None,
            linger_ms: Some(0),
        }
    }

    pub fn connect(endpoint: impl Into<String>) -> Self {
        Self {
            bind: false,
            ..Self::bind(endpoint)
        }
    }

    /// Reads `SC_ZMQ_PUB_ENDPOINT`, `SC_ZMQ_PUB_BIND`, `SC_ZMQ_PUB_HWM` and
    /// `SC_ZMQ_PUB_LINGER_MS`.
    pub fn from_env(default_endpoint: &str) -> Self {
        Self::from_lookup(default_endpoint, |key| env::var(key).ok())
    }

    pub fn from_lookup(default_endpoint: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let endpoint = lookup("SC_ZMQ_PUB_ENDPOINT").unwrap_or_else(|| default_endpoint.to_string());
        let bind = parse_bool(lookup("SC_ZMQ_PUB_BIND"), true);
        let high_water_mark = lookup("SC_ZMQ_PUB_HWM").and_then(|value| value.parse().ok());
        let linger_ms = lookup("SC_ZMQ_PUB_LINGER_MS")
            .and_then(|value| value.parse().ok())
            .or(Some(0));
        Self {
            endpoint,
            bind,
            high_water_mark,
            linger_ms,
        }
    }
}

pub struct ZmqPublisher {
    socket: zmq::Socket,
}

impl ZmqPublisher {
    pub fn new(config: &ZmqPublisherConfig) -> Result<Self, MessagingError> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUB)?;
        if let Some(hwm) = config.high_water_mark {
            socket.set_sndhwm(hwm)?;
        }
        if let Some(linger) = config.linger_ms {
            socket.set_linger(linger)?;
        }
        if config.bind {
            socket.bind(&config.endpoint)?;
        } else {
            socket.connect(&config.endpoint)?;
        }
        Ok(Self { socket })
    }

    /// Sends `[topic, json(envelope)]` as one multipart message.
    pub fn publish<T: Serialize>(
        &self,
        topic: &str,
        envelope: &MessageEnvelope<T>,
    ) -> Result<(), MessagingError> {
        let payload = serde_json::to_vec(envelope)?;
        self.socket.send_multipart([topic.as_bytes(), payload.as_slice()], 0)?;
        Ok(())
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|value| match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        })
        .unwrap_or(default)
}
