//! Service factory
//!
//! Builds the [`KvService`] from configuration: the admission controller
//! from [`AdmissionSettings`](crate::config::AdmissionSettings) and one of the
//! store backends from [`StoreConfig`].
//!
//! # Store Types
//!
//! ## Memory Store
//! - One map behind one read-write lock
//! - Best for: Low concurrency or small data sets
//!
//! ## Sharded Store
//! - Keys hashed across independently locked shards
//! - Best for: Many concurrent clients touching different keys

use crate::config::{Config, StoreConfig, StoreType};
use kvgate::{AdmissionController, KvService, KvStore, MemoryStore, ShardedStore};

/// Create the store backend selected by `config`
pub fn create_store(config: &StoreConfig) -> Box<dyn KvStore> {
    match config.store_type {
        StoreType::Memory => Box::new(MemoryStore::with_capacity(config.capacity)),
        StoreType::Sharded => Box::new(
            ShardedStore::builder()
                .capacity(config.capacity)
                .shard_count(config.shards)
                .build(),
        ),
    }
}

/// Create the admission-controlled service described by `config`
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env_and_args()?;
/// let service = Arc::new(create_service(&config));
/// ```
pub fn create_service(config: &Config) -> KvService {
    let admission = AdmissionController::new(config.admission.into());
    KvService::with_controller(admission, create_store(&config.store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdmissionSettings, HttpConfig};
    use kvgate::KvError;
    use serde_json::json;

    fn config(store_type: StoreType, max_per_window: i64) -> Config {
        Config {
            http: HttpConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            admission: AdmissionSettings {
                max_per_window,
                window_ms: 1000,
            },
            store: StoreConfig {
                store_type,
                capacity: 100,
                shards: 4,
            },
            enable_list: false,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_each_store_type_serves_requests() {
        for store_type in [StoreType::Memory, StoreType::Sharded] {
            let service = create_service(&config(store_type, 0));
            service.create(Some(&json!("k")), Some(json!(1))).unwrap();
            assert_eq!(service.get("k").unwrap(), json!(1));
            assert_eq!(service.len(), 1);
        }
    }

    #[test]
    fn test_admission_settings_are_applied() {
        let service = create_service(&config(StoreType::Sharded, 2));
        assert!(service.admission().config().is_enabled());
        assert_eq!(service.get("a"), Err(KvError::NotFound));
        assert_eq!(service.get("b"), Err(KvError::NotFound));
        assert_eq!(service.get("c"), Err(KvError::TooManyRequests));
    }
}
