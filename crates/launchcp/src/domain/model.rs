//! Domain models for classpath entries, entry trees, and flattened snapshots.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// The kind of location a classpath entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Archive,
    Folder,
    Project,
    Variable,
    Container,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Archive => "archive",
            EntryKind::Folder => "folder",
            EntryKind::Project => "project",
            EntryKind::Variable => "variable",
            EntryKind::Container => "container",
        }
    }

    fn is_filesystem(self) -> bool {
        matches!(self, EntryKind::Archive | EntryKind::Folder)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "archive" | "jar" => Ok(EntryKind::Archive),
            "folder" | "dir" => Ok(EntryKind::Folder),
            "project" => Ok(EntryKind::Project),
            "variable" | "var" => Ok(EntryKind::Variable),
            "container" => Ok(EntryKind::Container),
            other => Err(DomainError::UnknownKind(other.to_owned())),
        }
    }
}

/// Stable identifier of a classpath entry, `"<kind>:<location>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Independently configured parts of a launch classpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Bootstrap,
    User,
}

impl Segment {
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Bootstrap => "bootstrap",
            Segment::User => "user",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the classpath tree.
///
/// The identifier is derived once from the kind and the canonical location, so two entries
/// naming the same archive through different spellings (`/lib/./a.jar`, `/lib/a.jar/`) compare
/// equal by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntryDescriptor", into = "EntryDescriptor")]
pub struct ClasspathEntry {
    id: EntryId,
    kind: EntryKind,
    location: String,
    children: Vec<ClasspathEntry>,
}

impl ClasspathEntry {
    pub fn new(kind: EntryKind, location: impl AsRef<str>) -> Self {
        let location = canonical_location(kind, location.as_ref());
        Self {
            id: EntryId(format!("{kind}:{location}")),
            kind,
            location,
            children: Vec::new(),
        }
    }

    pub fn archive(path: impl AsRef<str>) -> Self {
        Self::new(EntryKind::Archive, path)
    }

    pub fn folder(path: impl AsRef<str>) -> Self {
        Self::new(EntryKind::Folder, path)
    }

    pub fn project(name: impl AsRef<str>) -> Self {
        Self::new(EntryKind::Project, name)
    }

    pub fn variable(name: impl AsRef<str>) -> Self {
        Self::new(EntryKind::Variable, name)
    }

    pub fn container(path: impl AsRef<str>) -> Self {
        Self::new(EntryKind::Container, path)
    }

    /// Replace the children of this entry, keeping their declared order.
    pub fn with_children(mut self, children: impl IntoIterator<Item = ClasspathEntry>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Filesystem path for archive and folder entries.
    pub fn path(&self) -> Option<&Path> {
        self.kind
            .is_filesystem()
            .then(|| Path::new(self.location.as_str()))
    }

    /// Referenced project name for project entries.
    pub fn project_name(&self) -> Option<&str> {
        (self.kind == EntryKind::Project).then_some(self.location.as_str())
    }

    pub fn children(&self) -> &[ClasspathEntry] {
        &self.children
    }

    /// Copy of this entry without its subtree.
    pub fn shallow(&self) -> Self {
        Self {
            id: self.id.clone(),
            kind: self.kind,
            location: self.location.clone(),
            children: Vec::new(),
        }
    }

    /// Visit this entry and every descendant, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ClasspathEntry)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Identifiers of this entry and all descendants in pre-order.
    pub fn subtree_ids(&self) -> Vec<EntryId> {
        let mut ids = Vec::new();
        self.walk(&mut |entry| ids.push(entry.id.clone()));
        ids
    }

    fn find(&self, id: &EntryId) -> Option<&ClasspathEntry> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id.as_str())
    }
}

/// Serialized form of a [`ClasspathEntry`]; the identifier is recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryDescriptor {
    kind: EntryKind,
    location: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<ClasspathEntry>,
}

impl From<EntryDescriptor> for ClasspathEntry {
    fn from(value: EntryDescriptor) -> Self {
        ClasspathEntry::new(value.kind, value.location).with_children(value.children)
    }
}

impl From<ClasspathEntry> for EntryDescriptor {
    fn from(value: ClasspathEntry) -> Self {
        Self {
            kind: value.kind,
            location: value.location,
            children: value.children,
        }
    }
}

/// Ordered forest of classpath entries for one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryTree {
    roots: Vec<ClasspathEntry>,
}

impl EntryTree {
    pub fn new(roots: impl IntoIterator<Item = ClasspathEntry>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    pub fn roots(&self) -> &[ClasspathEntry] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Locate an entry anywhere in the tree.
    pub fn find(&self, id: &EntryId) -> Option<&ClasspathEntry> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.find(id).is_some()
    }

    /// Every entry in tree order, ignoring any selection state.
    pub fn flatten(&self) -> ClasspathSnapshot {
        let mut entries = Vec::new();
        for root in &self.roots {
            root.walk(&mut |entry| entries.push(entry.shallow()));
        }
        ClasspathSnapshot::new(entries)
    }
}

/// Flattened, ordered classpath derived from a tree and a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClasspathSnapshot {
    entries: Vec<ClasspathEntry>,
}

impl ClasspathSnapshot {
    pub fn new(entries: Vec<ClasspathEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<&EntryId> {
        self.entries.iter().map(ClasspathEntry::id).collect()
    }

    /// Join entry locations with a platform classpath separator.
    pub fn join(&self, separator: &str) -> String {
        self.entries
            .iter()
            .map(ClasspathEntry::location)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl<'a> IntoIterator for &'a ClasspathSnapshot {
    type Item = &'a ClasspathEntry;
    type IntoIter = std::slice::Iter<'a, ClasspathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn canonical_location(kind: EntryKind, raw: &str) -> String {
    let trimmed = raw.trim();
    if kind.is_filesystem() {
        normalize_path(trimmed)
    } else {
        trimmed.trim_end_matches('/').to_owned()
    }
}

/// Lexical normalization only; the path is never touched on disk.
fn normalize_path(raw: &str) -> String {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in Path::new(raw).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect::<PathBuf>().display().to_string()
}
