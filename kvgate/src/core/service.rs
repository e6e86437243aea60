//! Request-level key-value operations
//!
//! [`KvService`] owns an [`AdmissionController`] and a [`KvStore`] and
//! exposes one method per client operation. Each method consults the
//! controller first; a rejection returns [`KvError::TooManyRequests`]
//! before input is validated or the store is touched.

use super::KvError;
use super::admission::{AdmissionConfig, AdmissionController};
use super::clock::{Clock, SystemClock};
use super::key::{KeyError, normalize_key};
use super::store::{KeyValueRecord, KvStore};
use serde_json::Value;

/// Admission-controlled key-value service
///
/// # Example
///
/// ```
/// use kvgate::{AdmissionConfig, KvService, ShardedStore};
/// use serde_json::json;
///
/// let service = KvService::new(AdmissionConfig::per_second(100), ShardedStore::new());
///
/// let record = service.create(Some(&json!("a")), Some(json!({"x": 1}))).unwrap();
/// assert_eq!(record.key, "a");
/// assert_eq!(service.get("a").unwrap(), json!({"x": 1}));
///
/// service.update("a", Some(json!(2))).unwrap();
/// service.delete("a").unwrap();
/// assert!(service.get("a").is_err());
/// ```
pub struct KvService<C: Clock = SystemClock> {
    admission: AdmissionController<C>,
    store: Box<dyn KvStore>,
}

impl KvService<SystemClock> {
    /// Create a service with a wall-clock admission controller
    pub fn new(config: AdmissionConfig, store: impl KvStore + 'static) -> Self {
        Self::with_controller(AdmissionController::new(config), Box::new(store))
    }
}

impl<C: Clock> KvService<C> {
    pub fn with_controller(admission: AdmissionController<C>, store: Box<dyn KvStore>) -> Self {
        KvService { admission, store }
    }

    pub fn admission(&self) -> &AdmissionController<C> {
        &self.admission
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Consult the admission controller for one request
    pub fn admit(&self) -> Result<(), KvError> {
        if self.admission.check() {
            Ok(())
        } else {
            Err(KvError::TooManyRequests)
        }
    }

    /// Error for a request whose input could not be parsed
    ///
    /// The request still counts as an attempt: if admission control
    /// rejects it, that rejection wins over the parse failure.
    pub fn refuse_malformed(&self, reason: &str) -> KvError {
        match self.admit() {
            Err(rejected) => rejected,
            Ok(()) => KvError::BadRequest(reason.to_string()),
        }
    }

    /// Create a new record
    ///
    /// Both fields are validated before uniqueness. A `null` value counts as
    /// missing.
    ///
    /// # Errors
    ///
    /// - [`KvError::TooManyRequests`]: rejected by admission control
    /// - [`KvError::BadRequest`]: `key` and/or `value` missing, or a non-scalar key
    /// - [`KvError::Conflict`]: the key already exists
    pub fn create(
        &self,
        key: Option<&Value>,
        value: Option<Value>,
    ) -> Result<KeyValueRecord, KvError> {
        self.admit()?;

        let key = match key.map(normalize_key).transpose() {
            Ok(key) => key.flatten(),
            Err(KeyError::NotScalar) => {
                return Err(KvError::BadRequest(
                    "'key' must be a string, number or boolean".to_string(),
                ));
            }
        };
        let value = value.filter(|v| !v.is_null());

        let (key, value) = match (key, value) {
            (Some(key), Some(value)) => (key, value),
            (None, Some(_)) => return Err(KvError::missing(&["key"])),
            (Some(_), None) => return Err(KvError::missing(&["value"])),
            (None, None) => return Err(KvError::missing(&["key", "value"])),
        };

        if !self.store.insert_if_absent(&key, value.clone()) {
            return Err(KvError::Conflict);
        }

        Ok(KeyValueRecord { key, value })
    }

    /// Replace the value of an existing record
    ///
    /// # Errors
    ///
    /// - [`KvError::TooManyRequests`]: rejected by admission control
    /// - [`KvError::BadRequest`]: `value` missing
    /// - [`KvError::NotFound`]: no record with this key
    pub fn update(&self, key: &str, value: Option<Value>) -> Result<KeyValueRecord, KvError> {
        self.admit()?;

        let value = value
            .filter(|v| !v.is_null())
            .ok_or_else(|| KvError::missing(&["value"]))?;

        if !self.store.replace_if_present(key, value.clone()) {
            return Err(KvError::NotFound);
        }

        Ok(KeyValueRecord::new(key, value))
    }

    /// Fetch the value stored under `key`
    pub fn get(&self, key: &str) -> Result<Value, KvError> {
        self.admit()?;
        self.store.get(key).ok_or(KvError::NotFound)
    }

    /// Remove the record stored under `key`
    pub fn delete(&self, key: &str) -> Result<(), KvError> {
        self.admit()?;
        if self.store.remove(key) {
            Ok(())
        } else {
            Err(KvError::NotFound)
        }
    }

    /// Every stored record, sorted by key
    pub fn list(&self) -> Result<Vec<KeyValueRecord>, KvError> {
        self.admit()?;
        let mut records = self.store.records();
        records.sort_unstable_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }
}
