//! Command line interface.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::app::render;
use crate::app::session::ClasspathSession;
use crate::domain::model::{ClasspathEntry, EntryId, EntryKind, Segment};
use crate::infra::config::Config;
use crate::infra::resolver::AttributeResolver;
use crate::infra::store::JsonFileStore;
use crate::infra::workspace::ProjectTable;

#[derive(Debug, Parser)]
#[command(
    name = "launchcp",
    author,
    version,
    about = "Inspect and edit the classpath of a launch configuration",
    long_about = None
)]
pub struct Cli {
    /// Launch configuration file (defaults to `launch.file` from the config)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Classpath segment to operate on
    #[arg(short, long, value_enum, global = true, default_value_t = SegmentArg::User)]
    pub segment: SegmentArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SegmentArg {
    User,
    Bootstrap,
}

impl From<SegmentArg> for Segment {
    fn from(value: SegmentArg) -> Self {
        match value {
            SegmentArg::User => Segment::User,
            SegmentArg::Bootstrap => Segment::Bootstrap,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the classpath tree with each entry's selection state
    Show,
    /// Print the enabled classpath, in order
    Classpath {
        /// Separator between entries (platform path separator by default)
        #[arg(long)]
        separator: Option<String>,
    },
    /// Uncheck an entry and everything below it
    Disable { id: String },
    /// Check an entry and everything below it
    Enable { id: String },
    /// Add a custom entry (archive, folder, project, variable, container)
    Add { kind: String, location: String },
    /// Remove a custom entry
    Remove { id: String },
    /// Drop all edits and track the default classpath again
    Restore,
    /// Check the launch project and enabled entries
    Validate,
    /// Generate shell completions
    Completions { shell: Shell },
}

/// Parse arguments, load configuration, and run the requested command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    crate::infra::logging::init(&config.launch.log_level);
    let stdout = std::io::stdout();
    execute(cli, &config, &mut stdout.lock())
}

type Session = ClasspathSession<JsonFileStore, AttributeResolver>;

pub fn execute(cli: Cli, config: &Config, out: &mut impl Write) -> Result<()> {
    let Cli {
        file,
        segment,
        command,
    } = cli;
    let segment = Segment::from(segment);
    let open = || open_session(file.clone(), segment, config);

    match command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "launchcp", out);
        }
        Commands::Show => {
            let mut session = open()?;
            session.activated();
            write!(out, "{}", render::render_session(&session))?;
        }
        Commands::Classpath { separator } => {
            let mut session = open()?;
            session.activated();
            if let Some(message) = session.error_message() {
                bail!("{message}");
            }
            let separator = separator.unwrap_or_else(|| default_separator().to_owned());
            writeln!(out, "{}", session.enabled_classpath().join(&separator))?;
        }
        Commands::Disable { id } => {
            let mut session = open()?;
            let id = EntryId::from(id);
            session.toggle(&id, false)?;
            session.apply()?;
            writeln!(out, "disabled {id}")?;
        }
        Commands::Enable { id } => {
            let mut session = open()?;
            let id = EntryId::from(id);
            session.toggle(&id, true)?;
            session.apply()?;
            writeln!(out, "enabled {id}")?;
        }
        Commands::Add { kind, location } => {
            let mut session = open()?;
            let kind: EntryKind = kind.parse()?;
            let entry = ClasspathEntry::new(kind, location);
            let id = entry.id().clone();
            if session.add_entry(entry) {
                session.apply()?;
                writeln!(out, "added {id}")?;
            } else {
                writeln!(out, "{id} is already on the classpath")?;
            }
        }
        Commands::Remove { id } => {
            let mut session = open()?;
            let removed = session.remove_entry(&EntryId::from(id))?;
            session.apply()?;
            writeln!(out, "removed {}", removed.id())?;
        }
        Commands::Restore => {
            let mut session = open()?;
            session.restore_defaults();
            session.apply()?;
            writeln!(out, "{segment} classpath restored to defaults")?;
        }
        Commands::Validate => {
            let mut session = open()?;
            let workspace = ProjectTable::from_config(config);
            session.validate(&workspace)?;
            if let Some(message) = session.error_message() {
                bail!("{message}");
            }
            writeln!(out, "{segment} classpath is valid")?;
        }
    }
    Ok(())
}

fn open_session(file: Option<PathBuf>, segment: Segment, config: &Config) -> Result<Session> {
    let path = file.unwrap_or_else(|| PathBuf::from(&config.launch.file));
    let store = JsonFileStore::open(&path)
        .with_context(|| format!("failed to open launch configuration {}", path.display()))?;
    let attributes = config.segments.attributes(segment);
    let resolver = AttributeResolver::new(attributes.defaults.clone());
    let session = ClasspathSession::load(
        segment,
        attributes,
        config.launch.project_attribute.clone(),
        store,
        resolver,
    );
    tracing::debug!(path = %path.display(), %segment, "launch configuration loaded");
    Ok(session)
}

fn default_separator() -> &'static str {
    if cfg!(windows) { ";" } else { ":" }
}
