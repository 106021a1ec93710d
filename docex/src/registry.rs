//! Schema definitions and the registry they are looked up in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while building a [`SchemaRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A schema file or directory could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A schema file is not valid JSON.
    #[error("Failed to parse {path}: {source}")]
    Json {
        /// Path being parsed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A schema document is not a JSON object.
    #[error("Schema must be a JSON object")]
    NotAnObject,

    /// A schema has no string `$id`.
    #[error("Schema has no string `$id`")]
    MissingId,

    /// Two schemas share the same `$id`.
    #[error("Duplicate schema `$id`: {0}")]
    DuplicateId(String),
}

/// A JSON-Schema-style validation document with an identifier and a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    document: Value,
}

impl Schema {
    /// Wraps a validation document. Only JSON objects are accepted.
    pub fn new(document: Value) -> Result<Self, RegistryError> {
        if document.is_object() {
            Ok(Self { document })
        } else {
            Err(RegistryError::NotAnObject)
        }
    }

    /// The declared `$id`, if it is a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.document.get("$id").and_then(Value::as_str)
    }

    /// The declared `version`, which may be any JSON value.
    #[must_use]
    pub fn version(&self) -> Option<&Value> {
        self.document.get("version")
    }

    /// The full validation document.
    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.document
    }
}

/// Read-only mapping from schema identifier to schema, keyed by each schema's `$id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from schemas, keying each by its `$id`.
    pub fn from_schemas<I>(schemas: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Schema>,
    {
        let mut registry = Self::new();
        for schema in schemas {
            registry.insert(schema)?;
        }
        Ok(registry)
    }

    /// Loads every `*.json` file directly inside `dir`, in file-name order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let dir = dir.as_ref();
        let io_err = |source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            let raw = std::fs::read_to_string(&path).map_err(|source| RegistryError::Io {
                path: path.clone(),
                source,
            })?;
            let document: Value =
                serde_json::from_str(&raw).map_err(|source| RegistryError::Json {
                    path: path.clone(),
                    source,
                })?;
            registry.insert(Schema::new(document)?)?;
            tracing::debug!(path = %path.display(), "Loaded schema");
        }

        tracing::info!(dir = %dir.display(), count = registry.len(), "Schema registry loaded");
        Ok(registry)
    }

    /// Adds a schema under its `$id`.
    pub fn insert(&mut self, schema: Schema) -> Result<(), RegistryError> {
        let id = schema.id().ok_or(RegistryError::MissingId)?.to_string();
        if self.schemas.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        self.schemas.insert(id, schema);
        Ok(())
    }

    /// Looks up a schema by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Schema> {
        self.schemas.get(id)
    }

    /// Returns `true` if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.schemas.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Iterates `(id, schema)` pairs, sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(id, schema)| (id.as_str(), schema))
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` when no schema is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn w2() -> Schema {
        Schema::new(json!({"$id": "w2", "version": "1.0", "type": "object"})).unwrap()
    }

    #[test]
    fn test_schema_accessors() {
        let schema = w2();
        assert_eq!(schema.id(), Some("w2"));
        assert_eq!(schema.version(), Some(&json!("1.0")));

        let anonymous = Schema::new(json!({"type": "object"})).unwrap();
        assert_eq!(anonymous.id(), None);
        assert_eq!(anonymous.version(), None);
    }

    #[test]
    fn test_schema_must_be_object() {
        assert!(matches!(
            Schema::new(json!(["not", "a", "schema"])),
            Err(RegistryError::NotAnObject)
        ));
    }

    #[test]
    fn test_insert_rejects_missing_and_duplicate_ids() {
        let mut registry = SchemaRegistry::new();
        registry.insert(w2()).unwrap();

        assert!(matches!(
            registry.insert(w2()),
            Err(RegistryError::DuplicateId(id)) if id == "w2"
        ));
        assert!(matches!(
            registry.insert(Schema::new(json!({"$id": 7})).unwrap()),
            Err(RegistryError::MissingId)
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_load_dir_keys_by_id_and_skips_other_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("b.json"),
            r#"{"$id": "w2", "version": "1.0", "type": "object"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.json"),
            r#"{"$id": "1040", "version": 2, "type": "object"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();

        let registry = SchemaRegistry::load_dir(dir.path()).unwrap();
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, ["1040", "w2"]);
        assert_eq!(registry.get("1040").unwrap().version(), Some(&json!(2)));
        for (id, schema) in registry.iter() {
            assert_eq!(schema.id(), Some(id));
        }
    }

    #[test]
    fn test_load_dir_reports_bad_json_path() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "{ nope").unwrap();

        match SchemaRegistry::load_dir(dir.path()) {
            Err(RegistryError::Json { path, .. }) => assert_eq!(path, bad),
            other => panic!("expected JSON error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_dir_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            SchemaRegistry::load_dir(&missing),
            Err(RegistryError::Io { .. })
        ));
    }
}
