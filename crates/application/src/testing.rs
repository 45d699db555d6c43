//! In-memory port implementations for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use flowdeck_domain::suite::{SuiteValidation, TestSuiteDocument, TestSuiteFormData, WizardState};

use crate::ports::{Clock, ConversionError, KeyValueStore, ParseFailure, StorageError, SuiteConverter};

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Stores a raw value, bypassing the typed helpers.
    pub fn seed(&self, key: &str, value: Value) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    /// Makes every following `set` fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.snapshot(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.seed(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Converter over JSON text, which is also valid YAML.
pub struct JsonSuiteConverter;

impl JsonSuiteConverter {
    fn parse(text: &str) -> Result<TestSuiteDocument, ConversionError> {
        serde_json::from_str(text).map_err(|e| {
            ConversionError::Parse(ParseFailure {
                message: e.to_string(),
                line: Some(e.line()),
                column: Some(e.column()),
            })
        })
    }

    fn dump(doc: &TestSuiteDocument) -> Result<String, ConversionError> {
        serde_json::to_string_pretty(doc).map_err(|e| ConversionError::Serialize(e.to_string()))
    }
}

impl SuiteConverter for JsonSuiteConverter {
    fn wizard_to_yaml(&self, wizard: &WizardState) -> Result<String, ConversionError> {
        Self::dump(&wizard.to_document())
    }

    fn yaml_to_wizard(&self, yaml: &str) -> Result<WizardState, ConversionError> {
        Self::parse(yaml).map(|doc| WizardState::from_document(&doc))
    }

    fn form_to_yaml(&self, form: &TestSuiteFormData) -> Result<String, ConversionError> {
        Self::dump(&form.to_document())
    }

    fn yaml_to_form(&self, yaml: &str) -> Result<TestSuiteFormData, ConversionError> {
        Self::parse(yaml).map(|doc| TestSuiteFormData::from_document(&doc))
    }

    fn validate(&self, yaml: &str) -> SuiteValidation {
        match Self::parse(yaml) {
            Ok(doc) => doc.validate(),
            Err(e) => SuiteValidation::failed(e.to_string()),
        }
    }
}
