#![deny(clippy::unwrap_used)]

use serde::Deserialize;

pub mod subscription;

pub fn parse_duration(duration: &str) -> Result<std::time::Duration, anyhow::Error> {
    let duration = duration.trim().to_lowercase().replace(".", "");
    duration_str::parse(duration).map_err(|dur| anyhow::anyhow!("Unable to parse duration {dur}"))
}

/// Treats a missing, `null` or empty string value as `None`. Other strings are kept as is.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: From<String>,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Ok(Some(T::from(s))),
    }
}
