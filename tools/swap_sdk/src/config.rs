//! Environment-backed configuration helpers shared by the chain clients.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{label} must start with http:// or https://")]
    NotHttp { label: String },
    #[error("{label} must be greater than zero")]
    Zero { label: String },
    #[error("{label}: {message}")]
    Invalid { label: String, message: String },
}

pub fn read_env_u64(key: &str, fallback: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(fallback)
}

pub fn read_env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn validate_http_url(label: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::NotHttp {
            label: label.to_string(),
        })
    }
}

pub fn validate_nonzero(label: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero {
            label: label.to_string(),
        })
    } else {
        Ok(())
    }
}
