//! Launch configuration stores.
//!
//! A store holds named attributes in a working copy; nothing reaches the committed
//! configuration until [`ConfigStore::save`] is called.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::PersistenceError;

/// A single launch configuration attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AttributeValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
    Set(BTreeSet<String>),
}

impl AttributeValue {
    fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Text(_) => "text",
            AttributeValue::List(_) => "list",
            AttributeValue::Set(_) => "set",
        }
    }
}

/// Storage collaborator for launch configuration attributes.
pub trait ConfigStore {
    /// Read an attribute from the working copy.
    fn get(&self, name: &str) -> Result<Option<AttributeValue>, PersistenceError>;

    /// Write an attribute to the working copy.
    fn set(&mut self, name: &str, value: AttributeValue);

    /// Commit the working copy.
    fn save(&mut self) -> Result<(), PersistenceError>;

    fn get_bool(&self, name: &str, default: bool) -> Result<bool, PersistenceError> {
        match self.get(name)? {
            None => Ok(default),
            Some(AttributeValue::Bool(value)) => Ok(value),
            Some(other) => Err(mismatch(name, "bool", &other)),
        }
    }

    fn get_text(&self, name: &str, default: &str) -> Result<String, PersistenceError> {
        match self.get(name)? {
            None => Ok(default.to_owned()),
            Some(AttributeValue::Text(value)) => Ok(value),
            Some(other) => Err(mismatch(name, "text", &other)),
        }
    }

    /// Ordered string list; a missing attribute reads as empty.
    fn get_list(&self, name: &str) -> Result<Vec<String>, PersistenceError> {
        match self.get(name)? {
            None => Ok(Vec::new()),
            Some(AttributeValue::List(values)) => Ok(values),
            Some(other) => Err(mismatch(name, "list", &other)),
        }
    }

    /// String set; lists are accepted and deduplicated, a missing attribute reads as empty.
    fn get_set(&self, name: &str) -> Result<BTreeSet<String>, PersistenceError> {
        match self.get(name)? {
            None => Ok(BTreeSet::new()),
            Some(AttributeValue::Set(values)) => Ok(values),
            Some(AttributeValue::List(values)) => Ok(values.into_iter().collect()),
            Some(other) => Err(mismatch(name, "set", &other)),
        }
    }
}

fn mismatch(name: &str, expected: &'static str, found: &AttributeValue) -> PersistenceError {
    PersistenceError::TypeMismatch {
        name: name.to_owned(),
        expected,
        found: found.kind(),
    }
}

/// In-memory store with separate working and committed attribute maps.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    working: BTreeMap<String, AttributeValue>,
    committed: BTreeMap<String, AttributeValue>,
    fail_reads: bool,
    fail_saves: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an attribute as already committed.
    pub fn with_attribute(mut self, name: &str, value: AttributeValue) -> Self {
        self.working.insert(name.to_owned(), value.clone());
        self.committed.insert(name.to_owned(), value);
        self
    }

    /// Make every subsequent `save` fail.
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Make every subsequent `get` fail.
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn committed(&self, name: &str) -> Option<&AttributeValue> {
        self.committed.get(name)
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Drop uncommitted changes, as closing an editor without saving would.
    pub fn revert(&mut self) {
        self.working = self.committed.clone();
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<AttributeValue>, PersistenceError> {
        if self.fail_reads {
            return Err(PersistenceError::Unavailable(format!(
                "cannot read attribute `{name}`"
            )));
        }
        Ok(self.working.get(name).cloned())
    }

    fn set(&mut self, name: &str, value: AttributeValue) {
        self.working.insert(name.to_owned(), value);
    }

    fn save(&mut self) -> Result<(), PersistenceError> {
        if self.fail_saves {
            return Err(PersistenceError::Unavailable("save rejected".into()));
        }
        self.committed = self.working.clone();
        self.saves += 1;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LaunchFile {
    #[serde(default)]
    attributes: BTreeMap<String, AttributeValue>,
}

/// Launch configuration persisted as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    working: BTreeMap<String, AttributeValue>,
}

impl JsonFileStore {
    /// Open the configuration at `path`; a missing file yields an empty configuration.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!(
                path = %path.display(),
                "launch configuration not found, starting empty"
            );
            return Ok(Self {
                path,
                working: BTreeMap::new(),
            });
        }

        let data = fs::read_to_string(&path).map_err(|source| PersistenceError::Read {
            path: path.clone(),
            source,
        })?;
        let file: LaunchFile =
            serde_json::from_str(&data).map_err(|source| PersistenceError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            working: file.attributes,
        })
    }

    /// Location of the launch configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self, name: &str) -> Result<Option<AttributeValue>, PersistenceError> {
        Ok(self.working.get(name).cloned())
    }

    fn set(&mut self, name: &str, value: AttributeValue) {
        self.working.insert(name.to_owned(), value);
    }

    /// Write the whole document next to the target and rename it into place.
    fn save(&mut self) -> Result<(), PersistenceError> {
        let write_err = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let file = LaunchFile {
            attributes: self.working.clone(),
        };
        let data = serde_json::to_string_pretty(&file).map_err(PersistenceError::Serialize)?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        fs::write(&staging, data).map_err(write_err)?;
        fs::rename(&staging, &self.path).map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), "launch configuration saved");
        Ok(())
    }
}
