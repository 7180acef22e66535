//! Publish-time normalization
//!
//! News sites print publish times in their own locale format. Everything we
//! persist uses the canonical `YYYY-MM-DD HH:MM:SS` form instead.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Canonical timestamp format for persisted publish times
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Traditional Chinese date/time as printed by Taiwanese news sites,
/// e.g. `2023年5月1日 13:45`
pub const ZH_TW_FORMAT: &str = "%Y年%m月%d日 %H:%M";

/// Publish-time text that does not match the source's locale format
#[derive(Debug, Error)]
#[error("cannot parse publish time '{input}' with format '{format}'")]
pub struct TimeFormatError {
    pub input: String,
    pub format: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Converts a locale-specific time string into the canonical form
///
/// Leading and trailing whitespace is ignored. Formats without a seconds
/// field produce `:00` seconds.
///
/// # Example
///
/// ```
/// use presswire::extract::{normalize_time, ZH_TW_FORMAT};
///
/// let canonical = normalize_time("2023年5月1日 13:45", ZH_TW_FORMAT).unwrap();
/// assert_eq!(canonical, "2023-05-01 13:45:00");
/// ```
pub fn normalize_time(input: &str, format: &str) -> Result<String, TimeFormatError> {
    let parsed =
        NaiveDateTime::parse_from_str(input.trim(), format).map_err(|source| TimeFormatError {
            input: input.to_string(),
            format: format.to_string(),
            source,
        })?;

    Ok(parsed.format(CANONICAL_FORMAT).to_string())
}
