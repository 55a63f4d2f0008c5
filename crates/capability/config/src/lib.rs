//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub inverter_host: String,
    pub inverter_port: u16,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    /// 0 表示阻塞等待逆变器响应，不设读超时。
    pub read_timeout_ms: u64,
    pub max_frame_bytes: usize,
    pub auto_reconnect: bool,
    pub reconnect_interval_ms: u64,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_client_id: Option<String>,
    pub mqtt_topic: String,
    pub mqtt_qos: u8,
    pub publish_enabled: bool,
    pub merge_duplicate_fields: bool,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let inverter_host = env::var("SMX_INVERTER_HOST")
            .map_err(|_| ConfigError::Missing("SMX_INVERTER_HOST".to_string()))?;
        let inverter_port = read_u16_with_default("SMX_INVERTER_PORT", 12345)?;
        let poll_interval_ms = read_u64_with_default("SMX_POLL_INTERVAL_MS", 10_000)?;
        let connect_timeout_ms = read_u64_with_default("SMX_CONNECT_TIMEOUT_MS", 5_000)?;
        let read_timeout_ms = read_u64_with_default("SMX_READ_TIMEOUT_MS", 0)?;
        let max_frame_bytes = read_usize_with_default("SMX_MAX_FRAME_BYTES", 4096)?;
        let auto_reconnect = read_bool_with_default("SMX_AUTO_RECONNECT", false);
        let reconnect_interval_ms = read_u64_with_default("SMX_RECONNECT_INTERVAL_MS", 5_000)?;
        let mqtt_host = env::var("SMX_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("SMX_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("SMX_MQTT_USERNAME");
        let mqtt_password = read_optional("SMX_MQTT_PASSWORD");
        let mqtt_client_id = read_optional("SMX_MQTT_CLIENT_ID");
        let mqtt_topic = env::var("SMX_MQTT_TOPIC")
            .unwrap_or_else(|_| "iot-2/evt/status/fmt/json".to_string());
        let mqtt_qos = read_u8_with_default("SMX_MQTT_QOS", 1)?;
        let publish_enabled = read_bool_with_default("SMX_PUBLISH", true);
        let merge_duplicate_fields = read_bool_with_default("SMX_MERGE_DUPLICATE_FIELDS", false);

        Ok(Self {
            inverter_host,
            inverter_port,
            poll_interval_ms,
            connect_timeout_ms,
            read_timeout_ms,
            max_frame_bytes,
            auto_reconnect,
            reconnect_interval_ms,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_client_id,
            mqtt_topic,
            mqtt_qos,
            publish_enabled,
            merge_duplicate_fields,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u8_with_default(key: &str, default: u8) -> Result<u8, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u8>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
