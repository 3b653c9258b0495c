//! Plain-text rendering of a classpath tree and its selection.

use crate::app::selection::SelectionSet;
use crate::app::session::ClasspathSession;
use crate::domain::model::{ClasspathEntry, EntryTree};
use crate::infra::resolver::ClasspathResolver;
use crate::infra::store::ConfigStore;

const ENABLED: &str = "[x]";
const DISABLED: &str = "[ ]";
/// Checked, but hidden by a disabled ancestor.
const SHADOWED: &str = "[~]";

/// One line per entry, children indented under their parent.
pub fn render_tree(tree: &EntryTree, selection: &SelectionSet) -> String {
    if tree.is_empty() {
        return "(no entries)\n".to_owned();
    }
    let mut out = String::new();
    for root in tree.roots() {
        render_entry(root, selection, 0, true, &mut out);
    }
    out
}

fn render_entry(
    entry: &ClasspathEntry,
    selection: &SelectionSet,
    depth: usize,
    ancestors_enabled: bool,
    out: &mut String,
) {
    let checked = !selection.is_excluded(entry.id());
    let marker = match (checked, ancestors_enabled) {
        (false, _) => DISABLED,
        (true, true) => ENABLED,
        (true, false) => SHADOWED,
    };
    out.push_str(&format!("{:indent$}{marker} {}\n", "", entry.id(), indent = depth * 2));
    for child in entry.children() {
        render_entry(child, selection, depth + 1, checked && ancestors_enabled, out);
    }
}

/// Header with segment and mode, the tree, and any blocking error.
pub fn render_session<S: ConfigStore, R: ClasspathResolver>(
    session: &ClasspathSession<S, R>,
) -> String {
    let mut out = format!(
        "{} classpath ({})\n",
        session.segment(),
        session.mode().label()
    );
    out.push_str(&render_tree(session.tree(), session.selection()));
    if let Some(message) = session.error_message() {
        out.push_str(&format!("error: {message}\n"));
    }
    out
}
