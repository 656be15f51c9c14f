use anyhow::Context;
use log_error::LogError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            seed: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("SUBSYNC_HOST")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match std::env::var("SUBSYNC_PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .context(format!("SUBSYNC_PORT is not a port number: {raw}"))
                .log_error("Unable to read SUBSYNC_PORT")
                .unwrap_or(DEFAULT_PORT),
            Err(_) => DEFAULT_PORT,
        };
        Self {
            host,
            port,
            seed: env_flag("SUBSYNC_SEED", true),
        }
    }
}

pub fn env_flag(key: &str, default_value: bool) -> bool {
    match std::env::var(key) {
        Ok(raw) => parse_flag(&raw).unwrap_or(default_value),
        Err(_) => default_value,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Loads `.env` into the process environment, creating an empty one first if absent.
pub fn load_dotenv() -> Result<(), anyhow::Error> {
    match std::fs::File::open(".env") {
        Ok(_) => envmnt::load_file(".env")?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            std::fs::File::create(".env")?;
            envmnt::load_file(".env")?;
        }
        Err(err) => {
            return Err(anyhow::anyhow!("Unable to open .env file: {err}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.seed);
    }
}
