//! Editing session for one classpath segment of a launch configuration.

use crate::app::compare::{self, ClasspathMode};
use crate::app::selection::{SelectionModel, SelectionSet};
use crate::app::validate;
use crate::domain::errors::{DomainError, ResolutionError, SessionError, ValidationError};
use crate::domain::model::{ClasspathEntry, ClasspathSnapshot, EntryId, EntryTree, Segment};
use crate::infra::config::AttributeNames;
use crate::infra::resolver::ClasspathResolver;
use crate::infra::store::{AttributeValue, ConfigStore};
use crate::infra::workspace::Workspace;

/// Observer notified whenever the selection or the custom entries change.
pub trait EntriesListener {
    fn entries_changed(&mut self, segment: Segment);
}

impl<F: FnMut(Segment)> EntriesListener for F {
    fn entries_changed(&mut self, segment: Segment) {
        self(segment)
    }
}

/// Owns the entry tree, selection, custom entries, and mode of one segment.
///
/// Toggles and restore-defaults are written through to the store immediately. Custom entry
/// edits and mode changes stay in memory until [`ClasspathSession::apply`]; dropping the session
/// discards them.
pub struct ClasspathSession<S, R> {
    segment: Segment,
    attributes: AttributeNames,
    project_attribute: String,
    store: S,
    resolver: R,
    defaults: Vec<ClasspathEntry>,
    custom: Vec<ClasspathEntry>,
    tree: EntryTree,
    selection: SelectionModel,
    mode: ClasspathMode,
    dirty: bool,
    resolution_error: Option<String>,
    validation_error: Option<String>,
    listeners: Vec<Box<dyn EntriesListener>>,
}

impl<S: ConfigStore, R: ClasspathResolver> ClasspathSession<S, R> {
    /// Build a session and initialize it from the store.
    pub fn load(
        segment: Segment,
        attributes: AttributeNames,
        project_attribute: impl Into<String>,
        store: S,
        resolver: R,
    ) -> Self {
        let selection = SelectionModel::new(attributes.excluded.clone());
        let mut session = Self {
            segment,
            attributes,
            project_attribute: project_attribute.into(),
            store,
            resolver,
            defaults: Vec::new(),
            custom: Vec::new(),
            tree: EntryTree::default(),
            selection,
            mode: ClasspathMode::Default,
            dirty: false,
            resolution_error: None,
            validation_error: None,
            listeners: Vec::new(),
        };
        session.refresh();
        session
    }

    /// Rebuild everything from the store and the resolver.
    pub fn refresh(&mut self) {
        self.resolution_error = None;
        self.validation_error = None;

        self.mode = match self.store.get_bool(&self.attributes.use_default, true) {
            Ok(flag) => ClasspathMode::from_flag(flag),
            Err(err) => {
                tracing::warn!(error = %err, "unable to read classpath mode, assuming default");
                ClasspathMode::Default
            }
        };
        self.selection = SelectionModel::load(&self.store, self.attributes.excluded.clone());

        self.custom = match self.load_custom() {
            Ok(entries) => entries,
            Err(err) => {
                self.report(&err);
                Vec::new()
            }
        };
        self.defaults = match self.resolver.compute_default_classpath(&self.store) {
            Ok(entries) => entries,
            Err(err) => {
                self.report(&err);
                Vec::new()
            }
        };

        self.rebuild_tree();
        self.dirty = false;
        tracing::debug!(
            segment = %self.segment,
            mode = self.mode.label(),
            defaults = self.defaults.len(),
            custom = self.custom.len(),
            "classpath session refreshed"
        );
    }

    /// Called when the editor becomes visible again.
    ///
    /// A default-mode session re-tracks the resolver; if the result no longer matches the
    /// default classpath the session switches to custom mode. A custom-mode session keeps its
    /// tree and only drops the last validation result.
    pub fn activated(&mut self) {
        if self.mode != ClasspathMode::Default {
            self.validation_error = None;
            return;
        }

        // Unsaved state would be lost by reloading from the store.
        if !self.dirty {
            self.refresh();
        }
        let next = self.mode.on_activation(self.is_default_classpath());
        if next != self.mode {
            tracing::info!(
                segment = %self.segment,
                "classpath differs from default, switching to custom"
            );
            self.mode = next;
            self.dirty = true;
            self.notify();
        }
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn mode(&self) -> ClasspathMode {
        self.mode
    }

    pub fn tree(&self) -> &EntryTree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionSet {
        self.selection.selection()
    }

    pub fn custom_entries(&self) -> &[ClasspathEntry] {
        &self.custom
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Register an observer for entry changes.
    pub fn subscribe(&mut self, listener: impl EntriesListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn is_enabled(&self, id: &EntryId) -> bool {
        self.selection.is_enabled(id)
    }

    /// Check or uncheck an entry and its subtree.
    pub fn toggle(&mut self, id: &EntryId, enabled: bool) -> Result<(), SessionError> {
        self.selection.toggle(&self.tree, id, enabled, &mut self.store)?;
        self.user_edit();
        Ok(())
    }

    /// Append a custom root entry. Returns `false` when an entry with the same identity exists.
    pub fn add_entry(&mut self, entry: ClasspathEntry) -> bool {
        if self.tree.contains(entry.id()) {
            tracing::debug!(entry = %entry.id(), "entry already on the classpath");
            return false;
        }
        tracing::debug!(entry = %entry.id(), segment = %self.segment, "custom entry added");
        self.custom.push(entry);
        self.rebuild_tree();
        self.user_edit();
        true
    }

    /// Remove a custom root entry. Entries from the default classpath can only be disabled.
    pub fn remove_entry(&mut self, id: &EntryId) -> Result<ClasspathEntry, SessionError> {
        let Some(position) = self.custom.iter().position(|entry| entry.id() == id) else {
            let err = if self.tree.contains(id) {
                DomainError::NotRemovable(id.clone())
            } else {
                DomainError::UnknownEntry(id.clone())
            };
            return Err(err.into());
        };

        let removed = self.custom.remove(position);
        self.selection.forget(&removed);
        self.rebuild_tree();
        self.user_edit();
        tracing::debug!(entry = %removed.id(), segment = %self.segment, "custom entry removed");
        Ok(removed)
    }

    /// Drop all exclusions and custom entries and go back to tracking the default classpath.
    pub fn restore_defaults(&mut self) {
        self.selection.clear();
        self.custom.clear();
        self.mode = self.mode.on_restore();
        self.resolution_error = None;
        match self.resolver.compute_default_classpath(&self.store) {
            Ok(entries) => self.defaults = entries,
            Err(err) => self.report(&err),
        }
        self.rebuild_tree();

        let persisted = self
            .write_state()
            .and_then(|()| self.store.save().map_err(SessionError::from));
        match persisted {
            Ok(()) => self.dirty = false,
            Err(err) => {
                tracing::error!(
                    segment = %self.segment,
                    error = %err,
                    "failed to persist restored defaults"
                );
                self.dirty = true;
            }
        }
        tracing::info!(segment = %self.segment, "classpath restored to defaults");
        self.notify();
    }

    /// The flattened classpath the launch would use.
    pub fn enabled_classpath(&self) -> ClasspathSnapshot {
        self.selection.compute_enabled_classpath(&self.tree)
    }

    /// Compare the enabled classpath with a freshly resolved default.
    pub fn is_default_classpath(&self) -> bool {
        match self.resolver.compute_default_classpath(&self.store) {
            Ok(defaults) => {
                compare::is_default(&self.enabled_classpath(), &EntryTree::new(defaults).flatten())
            }
            Err(err) => {
                tracing::warn!(error = %err, "cannot resolve default classpath for comparison");
                false
            }
        }
    }

    /// Validate the launch project and enabled entries, updating the error message.
    pub fn validate(&mut self, workspace: &dyn Workspace) -> Result<(), ValidationError> {
        self.validation_error = None;
        let project = match self.store.get_text(&self.project_attribute, "") {
            Ok(name) => name,
            Err(err) => {
                tracing::warn!(error = %err, "unable to read launch project name");
                String::new()
            }
        };

        let result =
            validate::validate_launch(Some(project.as_str()), &self.enabled_classpath(), workspace);
        if let Err(err) = &result {
            self.validation_error = Some(err.to_string());
        }
        result
    }

    /// Message blocking apply, resolution problems first.
    pub fn error_message(&self) -> Option<&str> {
        self.resolution_error
            .as_deref()
            .or(self.validation_error.as_deref())
    }

    pub fn can_apply(&self) -> bool {
        self.error_message().is_none()
    }

    /// Write custom entries, mode, and selection, then commit the store.
    pub fn apply(&mut self) -> Result<(), SessionError> {
        if let Some(message) = self.error_message() {
            return Err(SessionError::Blocked(message.to_owned()));
        }
        if !self.dirty {
            return Ok(());
        }

        self.write_state()?;
        self.store.save()?;

        self.dirty = false;
        tracing::info!(segment = %self.segment, mode = self.mode.label(), "classpath applied");
        Ok(())
    }

    /// Stage custom mementos, mode flag, and selection in the store's working copy.
    fn write_state(&mut self) -> Result<(), SessionError> {
        let mementos = self
            .custom
            .iter()
            .map(|entry| self.resolver.encode(entry))
            .collect::<Result<Vec<_>, _>>()?;
        self.store
            .set(&self.attributes.custom, AttributeValue::List(mementos));
        self.store.set(
            &self.attributes.use_default,
            AttributeValue::Bool(self.mode.as_flag()),
        );
        self.selection.write(&mut self.store);
        Ok(())
    }

    fn load_custom(&self) -> Result<Vec<ClasspathEntry>, ResolutionError> {
        self.store
            .get_list(&self.attributes.custom)?
            .iter()
            .map(|memento| self.resolver.decode(memento))
            .collect()
    }

    fn rebuild_tree(&mut self) {
        self.tree = EntryTree::new(self.defaults.iter().chain(&self.custom).cloned());
    }

    fn user_edit(&mut self) {
        self.mode = self.mode.on_user_edit();
        self.dirty = true;
        self.notify();
    }

    fn report(&mut self, err: &ResolutionError) {
        let message = error_chain(err);
        tracing::error!(segment = %self.segment, error = %message, "classpath resolution failed");
        self.resolution_error = Some(message);
    }

    fn notify(&mut self) {
        let segment = self.segment;
        for listener in &mut self.listeners {
            listener.entries_changed(segment);
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
