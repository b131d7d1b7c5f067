use crate::config::types::{Config, StoreConfig, TrackerConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_store_config(&config.store)?;
    validate_tracker_config(&config.tracker)?;
    Ok(())
}

/// Validates store connection configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    parse_address(&config.address)?;

    if config.database < 0 {
        return Err(ConfigError::Validation(format!(
            "database must be >= 0, got {}",
            config.database
        )));
    }

    validate_namespace(&config.namespace)?;

    Ok(())
}

/// Validates the namespace prefix
///
/// The prefix is spliced into every key and into the glob patterns used by
/// the bulk clear, so characters that Redis glob matching treats specially
/// are rejected outright.
fn validate_namespace(namespace: &str) -> Result<(), ConfigError> {
    if namespace.is_empty() {
        return Err(ConfigError::Validation(
            "namespace cannot be empty".to_string(),
        ));
    }

    if namespace
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '*' | '?' | '[' | ']' | ':'))
    {
        return Err(ConfigError::Validation(format!(
            "namespace must not contain whitespace, ':', or glob characters, got '{}'",
            namespace
        )));
    }

    Ok(())
}

/// Upper bound on the visit window: one year, comfortably inside the
/// store's signed-millisecond TTL range.
const MAX_VISIT_WINDOW_SECONDS: u64 = 60 * 60 * 24 * 366;

/// Validates visit tracking configuration
fn validate_tracker_config(config: &TrackerConfig) -> Result<(), ConfigError> {
    if config.visit_window_seconds < 1 || config.visit_window_seconds > MAX_VISIT_WINDOW_SECONDS {
        return Err(ConfigError::Validation(format!(
            "visit-window-seconds must be between 1 and {}, got {}",
            MAX_VISIT_WINDOW_SECONDS, config.visit_window_seconds
        )));
    }

    if config.visit_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "visit-limit must be >= 1, got {}",
            config.visit_limit
        )));
    }

    if config.cookie_lock_shards < 1 || config.cookie_lock_shards > 1024 {
        return Err(ConfigError::Validation(format!(
            "cookie-lock-shards must be between 1 and 1024, got {}",
            config.cookie_lock_shards
        )));
    }

    Ok(())
}

/// Parses a "host:port" store address, defaulting the port to 6379
///
/// # Arguments
///
/// * `address` - The address string from the configuration
///
/// # Returns
///
/// * `Ok((host, port))` - The split host and port
/// * `Err(ConfigError)` - The address is empty or the port is not a number
pub fn parse_address(address: &str) -> Result<(String, u16), ConfigError> {
    if address.is_empty() {
        return Err(ConfigError::InvalidAddress(
            "address cannot be empty".to_string(),
        ));
    }

    match address.rsplit_once(':') {
        Some((host, port)) => {
            if host.is_empty() {
                return Err(ConfigError::InvalidAddress(format!(
                    "missing host in '{}'",
                    address
                )));
            }
            let port: u16 = port.parse().map_err(|_| {
                ConfigError::InvalidAddress(format!("invalid port in '{}'", address))
            })?;
            Ok((host.to_string(), port))
        }
        None => Ok((address.to_string(), 6379)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            store: StoreConfig {
                address: "127.0.0.1:6379".to_string(),
                password: None,
                database: 0,
                namespace: "crawl".to_string(),
            },
            tracker: TrackerConfig {
                visit_window_seconds: 1800,
                visit_limit: 12,
                cookie_lock_shards: 16,
            },
        }
    }

    #[test]
    fn test_valid_config() {
        let config = create_test_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let mut config = create_test_config();
        config.store.namespace = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_glob_characters_in_namespace_rejected() {
        for bad in ["crawl*", "craw?l", "a[b]", "a:b", "a b"] {
            let mut config = create_test_config();
            config.store.namespace = bad.to_string();
            assert!(validate(&config).is_err(), "accepted '{}'", bad);
        }
    }

    #[test]
    fn test_negative_database_rejected() {
        let mut config = create_test_config();
        config.store.database = -1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_visit_window_rejected() {
        let mut config = create_test_config();
        config.tracker.visit_window_seconds = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_oversized_visit_window_rejected() {
        let mut config = create_test_config();
        config.tracker.visit_window_seconds = MAX_VISIT_WINDOW_SECONDS;
        assert!(validate(&config).is_ok());

        config.tracker.visit_window_seconds = MAX_VISIT_WINDOW_SECONDS + 1;
        assert!(validate(&config).is_err());

        config.tracker.visit_window_seconds = u64::MAX;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_visit_limit_rejected() {
        let mut config = create_test_config();
        config.tracker.visit_limit = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_lock_shards_rejected() {
        let mut config = create_test_config();
        config.tracker.cookie_lock_shards = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_parse_address_with_port() {
        let (host, port) = parse_address("redis.internal:6380").unwrap();
        assert_eq!(host, "redis.internal");
        assert_eq!(port, 6380);
    }

    #[test]
    fn test_parse_address_without_port() {
        let (host, port) = parse_address("redis.internal").unwrap();
        assert_eq!(host, "redis.internal");
        assert_eq!(port, 6379);
    }

    #[test]
    fn test_parse_address_invalid_port() {
        assert!(parse_address("host:notaport").is_err());
        assert!(parse_address("host:99999").is_err());
    }

    #[test]
    fn test_parse_address_empty() {
        assert!(parse_address("").is_err());
        assert!(parse_address(":6379").is_err());
    }
}
