//! Tracking which classpath entries are enabled for a launch.

use std::collections::BTreeSet;

use crate::domain::errors::{DomainError, PersistenceError};
use crate::domain::model::{ClasspathEntry, ClasspathSnapshot, EntryId, EntryTree};
use crate::infra::store::{AttributeValue, ConfigStore};

/// Entries the user has unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionSet {
    /// Nothing excluded; every entry is enabled.
    #[default]
    AllEnabled,
    /// The listed identifiers are excluded. Never empty.
    Exclusions(BTreeSet<EntryId>),
}

impl SelectionSet {
    pub fn from_ids(ids: impl IntoIterator<Item = EntryId>) -> Self {
        let ids: BTreeSet<EntryId> = ids.into_iter().collect();
        if ids.is_empty() {
            SelectionSet::AllEnabled
        } else {
            SelectionSet::Exclusions(ids)
        }
    }

    pub fn is_all_enabled(&self) -> bool {
        matches!(self, SelectionSet::AllEnabled)
    }

    pub fn is_excluded(&self, id: &EntryId) -> bool {
        match self {
            SelectionSet::AllEnabled => false,
            SelectionSet::Exclusions(ids) => ids.contains(id),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SelectionSet::AllEnabled => 0,
            SelectionSet::Exclusions(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Excluded identifiers in sorted order.
    pub fn excluded(&self) -> impl Iterator<Item = &EntryId> {
        match self {
            SelectionSet::AllEnabled => None,
            SelectionSet::Exclusions(ids) => Some(ids.iter()),
        }
        .into_iter()
        .flatten()
    }

    fn exclude(&mut self, id: EntryId) {
        match self {
            SelectionSet::AllEnabled => *self = SelectionSet::Exclusions(BTreeSet::from([id])),
            SelectionSet::Exclusions(ids) => {
                ids.insert(id);
            }
        }
    }

    fn include(&mut self, id: &EntryId) {
        if let SelectionSet::Exclusions(ids) = self {
            ids.remove(id);
            if ids.is_empty() {
                *self = SelectionSet::AllEnabled;
            }
        }
    }

    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::Set(self.excluded().map(|id| id.as_str().to_owned()).collect())
    }
}

/// Selection state for one classpath segment, written through to a store attribute.
#[derive(Debug, Clone)]
pub struct SelectionModel {
    selection: SelectionSet,
    attribute: String,
}

impl SelectionModel {
    /// Create a model with every entry enabled.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            selection: SelectionSet::AllEnabled,
            attribute: attribute.into(),
        }
    }

    /// Load the excluded identifiers from `store`.
    ///
    /// An unreadable attribute is logged and treated as "everything enabled".
    pub fn load(store: &dyn ConfigStore, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        let selection = match store.get_set(&attribute) {
            Ok(ids) => SelectionSet::from_ids(ids.into_iter().map(EntryId::from)),
            Err(err) => {
                tracing::warn!(%attribute, error = %err, "unable to read unchecked entries");
                SelectionSet::AllEnabled
            }
        };
        Self {
            selection,
            attribute,
        }
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// `false` iff the identifier itself is unchecked; ancestors are not consulted.
    pub fn is_enabled(&self, id: &EntryId) -> bool {
        !self.selection.is_excluded(id)
    }

    /// Check or uncheck `id` and its whole subtree, then write the selection through to `store`.
    ///
    /// A failed write is logged and ignored; the in-memory selection keeps the change.
    pub fn toggle<S: ConfigStore + ?Sized>(
        &mut self,
        tree: &EntryTree,
        id: &EntryId,
        enabled: bool,
        store: &mut S,
    ) -> Result<(), DomainError> {
        let entry = tree
            .find(id)
            .ok_or_else(|| DomainError::UnknownEntry(id.clone()))?;

        let affected = entry.subtree_ids();
        for affected_id in &affected {
            if enabled {
                self.selection.include(affected_id);
            } else {
                self.selection.exclude(affected_id.clone());
            }
        }
        tracing::debug!(
            entry = %entry.id(),
            enabled,
            affected = affected.len(),
            "classpath entry toggled"
        );

        if let Err(err) = self.persist(store) {
            tracing::error!(
                attribute = %self.attribute,
                error = %err,
                "failed to persist unchecked entries"
            );
        }
        Ok(())
    }

    /// Flatten `tree` into the enabled classpath.
    ///
    /// A disabled entry prunes its subtree even when descendants are individually enabled.
    pub fn compute_enabled_classpath(&self, tree: &EntryTree) -> ClasspathSnapshot {
        let mut entries = Vec::new();
        for root in tree.roots() {
            self.collect_enabled(root, &mut entries);
        }
        ClasspathSnapshot::new(entries)
    }

    fn collect_enabled(&self, entry: &ClasspathEntry, out: &mut Vec<ClasspathEntry>) {
        if !self.is_enabled(entry.id()) {
            return;
        }
        out.push(entry.shallow());
        for child in entry.children() {
            self.collect_enabled(child, out);
        }
    }

    /// Drop every identifier of `entry`'s subtree without persisting.
    pub fn forget(&mut self, entry: &ClasspathEntry) {
        for id in entry.subtree_ids() {
            self.selection.include(&id);
        }
    }

    pub fn clear(&mut self) {
        self.selection = SelectionSet::AllEnabled;
    }

    /// Write the selection to the working copy without committing.
    pub fn write<S: ConfigStore + ?Sized>(&self, store: &mut S) {
        store.set(&self.attribute, self.selection.to_attribute());
    }

    /// Write the selection and commit the store.
    pub fn persist<S: ConfigStore + ?Sized>(&self, store: &mut S) -> Result<(), PersistenceError> {
        self.write(store);
        store.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::infra::store::MemoryStore;

    const ATTR: &str = "launchcp.user.unchecked";

    fn id(raw: &str) -> EntryId {
        EntryId::from(raw)
    }

    // A(archive), B(project, children = [C(archive), D(archive)])
    fn sample_tree() -> EntryTree {
        EntryTree::new([
            ClasspathEntry::archive("/lib/a.jar"),
            ClasspathEntry::project("b").with_children([
                ClasspathEntry::archive("/lib/c.jar"),
                ClasspathEntry::archive("/lib/d.jar"),
            ]),
        ])
    }

    fn enabled_ids(model: &SelectionModel, tree: &EntryTree) -> Vec<String> {
        model
            .compute_enabled_classpath(tree)
            .ids()
            .into_iter()
            .map(|id| id.to_string())
            .collect()
    }

    fn excluded_ids(model: &SelectionModel) -> Vec<String> {
        model.selection().excluded().map(|id| id.to_string()).collect()
    }

    #[test]
    fn empty_selection_enables_everything() {
        let tree = sample_tree();
        let model = SelectionModel::new(ATTR);
        assert!(model.selection().is_all_enabled());
        assert_eq!(
            enabled_ids(&model, &tree),
            ["archive:/lib/a.jar", "project:b", "archive:/lib/c.jar", "archive:/lib/d.jar"]
        );
    }

    #[test]
    fn disabling_parent_excludes_subtree() {
        let tree = sample_tree();
        let mut store = MemoryStore::new();
        let mut model = SelectionModel::new(ATTR);

        model.toggle(&tree, &id("project:b"), false, &mut store).unwrap();

        assert_eq!(
            excluded_ids(&model),
            ["archive:/lib/c.jar", "archive:/lib/d.jar", "project:b"]
        );
        assert!(!model.is_enabled(&id("project:b")));
        assert!(!model.is_enabled(&id("archive:/lib/c.jar")));
        assert!(!model.is_enabled(&id("archive:/lib/d.jar")));
        assert_eq!(enabled_ids(&model, &tree), ["archive:/lib/a.jar"]);
    }

    #[test]
    fn enabling_child_under_disabled_parent_stays_pruned() {
        let tree = sample_tree();
        let mut store = MemoryStore::new();
        let mut model = SelectionModel::new(ATTR);

        model.toggle(&tree, &id("project:b"), false, &mut store).unwrap();
        model.toggle(&tree, &id("archive:/lib/c.jar"), true, &mut store).unwrap();

        assert_eq!(excluded_ids(&model), ["archive:/lib/d.jar", "project:b"]);
        assert!(model.is_enabled(&id("archive:/lib/c.jar")));
        assert_eq!(enabled_ids(&model, &tree), ["archive:/lib/a.jar"]);
    }

    #[test]
    fn re_enabling_parent_restores_subtree() {
        let tree = sample_tree();
        let mut store = MemoryStore::new();
        let mut model = SelectionModel::new(ATTR);

        model.toggle(&tree, &id("project:b"), false, &mut store).unwrap();
        model.toggle(&tree, &id("project:b"), true, &mut store).unwrap();

        assert!(model.selection().is_all_enabled());
        assert_eq!(enabled_ids(&model, &tree).len(), 4);
    }

    #[test]
    fn re_enabling_parent_overrides_interleaved_child_toggle() {
        let tree = sample_tree();
        let mut store = MemoryStore::new();
        let mut model = SelectionModel::new(ATTR);

        model.toggle(&tree, &id("archive:/lib/d.jar"), false, &mut store).unwrap();
        model.toggle(&tree, &id("project:b"), false, &mut store).unwrap();
        model.toggle(&tree, &id("archive:/lib/c.jar"), true, &mut store).unwrap();
        model.toggle(&tree, &id("project:b"), true, &mut store).unwrap();

        // Enabling a parent re-enables the whole subtree, including D which was off before.
        assert!(model.selection().is_all_enabled());
        assert!(model.is_enabled(&id("archive:/lib/d.jar")));
    }

    #[test]
    fn toggle_writes_through_to_store() {
        let tree = sample_tree();
        let mut store = MemoryStore::new();
        let mut model = SelectionModel::new(ATTR);

        model.toggle(&tree, &id("archive:/lib/a.jar"), false, &mut store).unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(
            store.committed(ATTR),
            Some(&AttributeValue::Set(BTreeSet::from(["archive:/lib/a.jar".to_owned()])))
        );
    }

    #[test]
    fn failed_write_keeps_in_memory_change() {
        let tree = sample_tree();
        let mut store = MemoryStore::new();
        store.fail_saves(true);
        let mut model = SelectionModel::new(ATTR);

        model.toggle(&tree, &id("project:b"), false, &mut store).unwrap();

        assert!(store.committed(ATTR).is_none());
        assert_eq!(enabled_ids(&model, &tree), ["archive:/lib/a.jar"]);
    }

    #[test]
    fn unknown_entry_is_rejected_without_mutation() {
        let tree = sample_tree();
        let mut store = MemoryStore::new();
        let mut model = SelectionModel::new(ATTR);

        let err = model
            .toggle(&tree, &id("archive:/lib/zzz.jar"), false, &mut store)
            .unwrap_err();

        assert!(matches!(err, DomainError::UnknownEntry(_)));
        assert!(model.selection().is_all_enabled());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn persisted_selection_reloads_to_same_partition() {
        let tree = sample_tree();
        let mut store = MemoryStore::new();
        let mut model = SelectionModel::new(ATTR);
        model.toggle(&tree, &id("project:b"), false, &mut store).unwrap();
        model.toggle(&tree, &id("archive:/lib/c.jar"), true, &mut store).unwrap();

        store.revert();
        let reloaded = SelectionModel::load(&store, ATTR);

        assert_eq!(reloaded.selection(), model.selection());
        for entry in tree.flatten().entries() {
            assert_eq!(reloaded.is_enabled(entry.id()), model.is_enabled(entry.id()));
        }
    }

    #[test]
    fn unreadable_store_loads_all_enabled() {
        let mut store = MemoryStore::new()
            .with_attribute(ATTR, AttributeValue::Set(BTreeSet::from(["project:b".to_owned()])));
        store.fail_reads(true);
        let model = SelectionModel::load(&store, ATTR);
        assert!(model.selection().is_all_enabled());
    }

    #[test]
    fn forget_drops_subtree_ids() {
        let tree = sample_tree();
        let mut store = MemoryStore::new();
        let mut model = SelectionModel::new(ATTR);
        model.toggle(&tree, &id("project:b"), false, &mut store).unwrap();
        model.toggle(&tree, &id("archive:/lib/a.jar"), false, &mut store).unwrap();

        model.forget(&tree.roots()[1]);

        assert_eq!(excluded_ids(&model), ["archive:/lib/a.jar"]);
    }
}
