//! Checks run before a classpath may be applied.

use crate::domain::errors::ValidationError;
use crate::domain::model::{ClasspathSnapshot, EntryKind};
use crate::infra::workspace::{ProjectState, Workspace};

/// Reject names a workspace cannot hold as a project.
pub fn validate_project_name(name: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidProjectName {
        name: name.to_owned(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("name is blank"));
    }
    if name != name.trim() {
        return Err(invalid("name has leading or trailing whitespace"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name is a relative path segment"));
    }
    if name.contains(['/', '\\', ':']) {
        return Err(invalid("name contains a path separator"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("name contains control characters"));
    }
    Ok(())
}

/// Validate the launch project and every enabled entry.
///
/// The first problem found is returned; `project` is checked before the entries.
pub fn validate_launch(
    project: Option<&str>,
    enabled: &ClasspathSnapshot,
    workspace: &dyn Workspace,
) -> Result<(), ValidationError> {
    if let Some(name) = project.filter(|name| !name.is_empty()) {
        validate_project_name(name)?;
        match workspace.project_state(name) {
            ProjectState::Missing => return Err(ValidationError::ProjectNotFound(name.to_owned())),
            ProjectState::Closed => return Err(ValidationError::ProjectClosed(name.to_owned())),
            ProjectState::Open => {}
        }
    }

    for entry in enabled {
        match entry.kind() {
            EntryKind::Archive => {
                if !entry.path().is_some_and(|path| path.is_absolute()) {
                    return Err(ValidationError::RelativeArchive(entry.location().to_owned()));
                }
            }
            EntryKind::Project => {
                if workspace.project_state(entry.location()) != ProjectState::Open {
                    return Err(ValidationError::InaccessibleProject(
                        entry.location().to_owned(),
                    ));
                }
            }
            EntryKind::Folder | EntryKind::Variable | EntryKind::Container => {}
        }
    }
    Ok(())
}
