use crate::config::types::{Config, CrawlerConfig, SourceConfig, StorageConfig};
use crate::extract::profile_for;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates the source section: the code must name a known site profile
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    if config.code.trim().is_empty() {
        return Err(ConfigError::Validation(
            "source code cannot be empty".to_string(),
        ));
    }

    if profile_for(&config.code).is_none() {
        return Err(ConfigError::Validation(format!(
            "no site profile for source code '{}'",
            config.code
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.min_delay_secs > config.max_delay_secs {
        return Err(ConfigError::Validation(format!(
            "min_delay_secs ({}) must not exceed max_delay_secs ({})",
            config.min_delay_secs, config.max_delay_secs
        )));
    }

    if config.max_error_count < 1 {
        return Err(ConfigError::Validation(format!(
            "max_error_count must be >= 1, got {}",
            config.max_error_count
        )));
    }

    if config.batch_limit == Some(0) {
        return Err(ConfigError::Validation(
            "batch_limit must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_source_config() {
        let known = SourceConfig {
            code: "cnt".to_string(),
            name: None,
        };
        assert!(validate_source_config(&known).is_ok());

        let unknown = SourceConfig {
            code: "nope".to_string(),
            name: None,
        };
        assert!(validate_source_config(&unknown).is_err());

        let blank = SourceConfig {
            code: "  ".to_string(),
            name: None,
        };
        assert!(validate_source_config(&blank).is_err());
    }

    #[test]
    fn test_validate_crawler_config() {
        assert!(validate_crawler_config(&CrawlerConfig::default()).is_ok());

        let zero_timeout = CrawlerConfig {
            timeout_secs: 0,
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&zero_timeout).is_err());

        let equal_bounds = CrawlerConfig {
            min_delay_secs: 4,
            max_delay_secs: 4,
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&equal_bounds).is_ok());

        let zero_limit = CrawlerConfig {
            batch_limit: Some(0),
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&zero_limit).is_err());
    }
}
