//! Persistence contracts for the reference pattern and display parameters.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use campana_analysis::{DisplayParams, Pattern};
use thiserror::Error;

/// Errors from store operations.
///
/// Only genuine I/O failures surface as errors; absent or corrupt stored
/// data decodes as the default value instead (the analyzer must never be
/// taken down by bad persisted state).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the backing file
    #[error("failed to read store '{path}': {source}")]
    Read {
        /// Path of the store file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the backing file
    #[error("failed to write store '{path}': {source}")]
    Write {
        /// Path of the store file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode a value
    #[error("failed to encode store value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Round-trip store for the reference pattern.
pub trait PatternStore {
    /// Load the persisted pattern; empty when nothing (valid) is stored.
    fn load(&self) -> Result<Pattern, StoreError>;
    /// Persist the pattern, replacing any previous value.
    fn save(&mut self, pattern: &Pattern) -> Result<(), StoreError>;
}

/// Round-trip store for display clipping parameters.
pub trait DisplayParamsStore {
    /// Load the persisted parameters; defaults when nothing (valid) is
    /// stored.
    fn load_display_params(&self) -> Result<DisplayParams, StoreError>;
    /// Persist the parameters.
    fn save_display_params(&mut self, params: &DisplayParams) -> Result<(), StoreError>;
}

/// JSON-file-backed store.
///
/// The pattern and the display parameters live in separate files derived
/// from one base path (`<base>` and `<base>.display.json`).
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    pattern_path: PathBuf,
    display_path: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `pattern_path`.
    pub fn new(pattern_path: impl Into<PathBuf>) -> Self {
        let pattern_path = pattern_path.into();
        let display_path = pattern_path.with_extension("display.json");
        Self {
            pattern_path,
            display_path,
        }
    }

    /// Path of the pattern file.
    pub fn pattern_path(&self) -> &Path {
        &self.pattern_path
    }

    fn read_or_default<T: Default + serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<T, StoreError> {
        if !path.exists() {
            return Ok(T::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        match serde_json::from_str(&content) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "corrupt store, using default");
                Ok(T::default())
            }
        }
    }

    fn write<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string(value)?;
        std::fs::write(path, content).map_err(|e| StoreError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl PatternStore for JsonFileStore {
    fn load(&self) -> Result<Pattern, StoreError> {
        Self::read_or_default(&self.pattern_path)
    }

    fn save(&mut self, pattern: &Pattern) -> Result<(), StoreError> {
        Self::write(&self.pattern_path, pattern)
    }
}

impl DisplayParamsStore for JsonFileStore {
    fn load_display_params(&self) -> Result<DisplayParams, StoreError> {
        Self::read_or_default(&self.display_path)
    }

    fn save_display_params(&mut self, params: &DisplayParams) -> Result<(), StoreError> {
        Self::write(&self.display_path, params)
    }
}

/// In-memory store, shared behind an `Arc` so tests and composition roots
/// can inspect what the analyzer persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pattern: Arc<Mutex<Pattern>>,
    display: Arc<Mutex<DisplayParams>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a reference pattern.
    pub fn with_pattern(pattern: Pattern) -> Self {
        let store = Self::new();
        *store.pattern.lock().unwrap() = pattern;
        store
    }

    /// Snapshot of the currently persisted pattern.
    pub fn pattern(&self) -> Pattern {
        self.pattern.lock().unwrap().clone()
    }

    /// Snapshot of the currently persisted display parameters.
    pub fn display_params(&self) -> DisplayParams {
        *self.display.lock().unwrap()
    }
}

impl PatternStore for MemoryStore {
    fn load(&self) -> Result<Pattern, StoreError> {
        Ok(self.pattern.lock().unwrap().clone())
    }

    fn save(&mut self, pattern: &Pattern) -> Result<(), StoreError> {
        *self.pattern.lock().unwrap() = pattern.clone();
        Ok(())
    }
}

impl DisplayParamsStore for MemoryStore {
    fn load_display_params(&self) -> Result<DisplayParams, StoreError> {
        Ok(*self.display.lock().unwrap())
    }

    fn save_display_params(&mut self, params: &DisplayParams) -> Result<(), StoreError> {
        *self.display.lock().unwrap() = *params;
        Ok(())
    }
}
