//! Default-versus-custom classpath comparison.

use crate::domain::model::ClasspathSnapshot;

/// Whether `snapshot` is exactly the default classpath.
///
/// Order matters: class loading takes the first match, so a reordered classpath is a custom one.
pub fn is_default(snapshot: &ClasspathSnapshot, default: &ClasspathSnapshot) -> bool {
    snapshot.len() == default.len()
        && snapshot
            .entries()
            .iter()
            .zip(default.entries())
            .all(|(current, expected)| current.id() == expected.id())
}

/// Whether a segment follows the resolver or keeps a frozen, user-edited classpath.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClasspathMode {
    #[default]
    Default,
    Custom,
}

impl ClasspathMode {
    /// Map the stored "use default classpath" flag.
    pub fn from_flag(use_default: bool) -> Self {
        if use_default {
            ClasspathMode::Default
        } else {
            ClasspathMode::Custom
        }
    }

    pub fn as_flag(self) -> bool {
        self == ClasspathMode::Default
    }

    /// Any toggle, add, or remove freezes the classpath.
    pub fn on_user_edit(self) -> Self {
        ClasspathMode::Custom
    }

    /// Re-check a default-mode classpath when the editor is activated.
    pub fn on_activation(self, matches_default: bool) -> Self {
        match (self, matches_default) {
            (ClasspathMode::Default, false) => ClasspathMode::Custom,
            (mode, _) => mode,
        }
    }

    pub fn on_restore(self) -> Self {
        ClasspathMode::Default
    }

    pub fn label(self) -> &'static str {
        match self {
            ClasspathMode::Default => "default",
            ClasspathMode::Custom => "custom",
        }
    }
}
