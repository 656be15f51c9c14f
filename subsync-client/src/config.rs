use log_error::LogError;
use std::time::Duration;
use subsync_types::parse_duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_READ_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub base_url: String,
    /// Bound on every cache request, whatever the transport.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Retry budget for list requests. Writes are never retried.
    pub read_retries: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_retries: DEFAULT_READ_RETRIES,
        }
    }
}

impl ClientOptions {
    pub fn from_env() -> Self {
        let read_retries = if envmnt::exists("SUBSYNC_READ_RETRIES") {
            envmnt::get_parse("SUBSYNC_READ_RETRIES")
                .log_error("Unable to parse SUBSYNC_READ_RETRIES")
                .unwrap_or(DEFAULT_READ_RETRIES)
        } else {
            DEFAULT_READ_RETRIES
        };
        Self {
            base_url: envmnt::get_or("SUBSYNC_API_URL", DEFAULT_API_URL),
            timeout: env_duration("SUBSYNC_TIMEOUT", DEFAULT_TIMEOUT),
            connect_timeout: env_duration("SUBSYNC_CONNECT_TIMEOUT", DEFAULT_CONNECT_TIMEOUT),
            read_retries,
        }
    }
}

fn env_duration(key: &str, default: Duration) -> Duration {
    if !envmnt::exists(key) {
        return default;
    }
    parse_duration(&envmnt::get_or(key, ""))
        .log_error(&format!("Unable to parse {key}"))
        .unwrap_or(default)
}
