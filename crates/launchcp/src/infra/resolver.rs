//! Default classpath resolution.

use crate::domain::errors::ResolutionError;
use crate::domain::model::ClasspathEntry;
use crate::infra::store::ConfigStore;

/// Computes the classpath a launch would use without user edits, and owns the memento format
/// custom entries are stored in.
pub trait ClasspathResolver {
    fn compute_default_classpath(
        &self,
        store: &dyn ConfigStore,
    ) -> Result<Vec<ClasspathEntry>, ResolutionError>;

    fn encode(&self, entry: &ClasspathEntry) -> Result<String, ResolutionError> {
        serde_json::to_string(entry).map_err(|source| ResolutionError::Encode {
            id: entry.id().clone(),
            source,
        })
    }

    fn decode(&self, memento: &str) -> Result<ClasspathEntry, ResolutionError> {
        serde_json::from_str(memento).map_err(|source| ResolutionError::InvalidMemento {
            memento: memento.to_owned(),
            source,
        })
    }
}

/// Reads the default classpath from a list attribute of entry descriptors.
#[derive(Debug, Clone)]
pub struct AttributeResolver {
    attribute: String,
}

impl AttributeResolver {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl ClasspathResolver for AttributeResolver {
    fn compute_default_classpath(
        &self,
        store: &dyn ConfigStore,
    ) -> Result<Vec<ClasspathEntry>, ResolutionError> {
        let mementos = store.get_list(&self.attribute)?;
        let entries = mementos
            .iter()
            .map(|memento| self.decode(memento))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            attribute = %self.attribute,
            roots = entries.len(),
            "resolved default classpath"
        );
        Ok(entries)
    }
}
