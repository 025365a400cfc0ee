use std::env;

use anyhow::{Context, Result};

/// The configuration surface of spec §6.5: every recognized option,
/// its default, and the uppercased environment variable that
/// overrides it. `api-service`, `worker-service`, and
/// `id-interner-service` each load one of these and read only the
/// fields relevant to their own wiring.
#[derive(Debug, Clone)]
pub struct AllezonConfig {
    pub port: u16,
    pub log_level: String,
    pub kafka_addresses: Vec<String>,
    pub kafka_num_partitions: i32,
    pub kafka_replication_factor: i32,
    pub db_profiles_addresses: Vec<String>,
    pub db_aggregates_addresses: Vec<String>,
    pub id_getter_address: String,
    pub kafka_null_client: bool,
    pub db_profiles_null_client: bool,
    pub db_aggregates_null_client: bool,
    pub id_getter_null_client: bool,
}

impl Default for AllezonConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            log_level: "info".to_string(),
            kafka_addresses: Vec::new(),
            kafka_num_partitions: 1,
            kafka_replication_factor: 1,
            db_profiles_addresses: Vec::new(),
            db_aggregates_addresses: Vec::new(),
            id_getter_address: String::new(),
            kafka_null_client: false,
            db_profiles_null_client: false,
            db_aggregates_null_client: false,
            id_getter_null_client: false,
        }
    }
}

impl AllezonConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            port: u16_from_env("PORT", defaults.port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            kafka_addresses: addresses_from_env("KAFKA_ADDRESSES", defaults.kafka_addresses),
            kafka_num_partitions: i32_from_env("KAFKA_NUM_PARTITIONS", defaults.kafka_num_partitions)?,
            kafka_replication_factor: i32_from_env("KAFKA_REPLICATION_FACTOR", defaults.kafka_replication_factor)?,
            db_profiles_addresses: addresses_from_env("DB_PROFILES_ADDRESSES", defaults.db_profiles_addresses),
            db_aggregates_addresses: addresses_from_env("DB_AGGREGATES_ADDRESSES", defaults.db_aggregates_addresses),
            id_getter_address: env::var("ID_GETTER_ADDRESS").unwrap_or(defaults.id_getter_address),
            kafka_null_client: bool_from_env("KAFKA_NULL_CLIENT", defaults.kafka_null_client)?,
            db_profiles_null_client: bool_from_env("DB_PROFILES_NULL_CLIENT", defaults.db_profiles_null_client)?,
            db_aggregates_null_client: bool_from_env("DB_AGGREGATES_NULL_CLIENT", defaults.db_aggregates_null_client)?,
            id_getter_null_client: bool_from_env("ID_GETTER_NULL_CLIENT", defaults.id_getter_null_client)?,
        })
    }
}

fn bool_from_env(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(value) => value
            .parse::<bool>()
            .with_context(|| format!("{name} must be true or false, got {value:?}")),
        Err(_) => Ok(default),
    }
}

fn u16_from_env(name: &str, default: u16) -> Result<u16> {
    match env::var(name) {
        Ok(value) => value.parse::<u16>().with_context(|| format!("{name} must be a u16, got {value:?}")),
        Err(_) => Ok(default),
    }
}

fn i32_from_env(name: &str, default: i32) -> Result<i32> {
    match env::var(name) {
        Ok(value) => value.parse::<i32>().with_context(|| format!("{name} must be an i32, got {value:?}")),
        Err(_) => Ok(default),
    }
}

fn addresses_from_env(name: &str, default: Vec<String>) -> Vec<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
        }
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let config = AllezonConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert!(config.kafka_addresses.is_empty());
        assert_eq!(config.kafka_num_partitions, 1);
        assert_eq!(config.kafka_replication_factor, 1);
        assert!(!config.kafka_null_client);
    }

    #[test]
    fn addresses_from_env_splits_and_trims() {
        let addrs = addresses_from_env("ALLEZON_CONFIG_TEST_ADDRS_UNSET", vec!["fallback".to_string()]);
        assert_eq!(addrs, vec!["fallback".to_string()]);
    }
}
