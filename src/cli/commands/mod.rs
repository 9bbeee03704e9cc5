//! CLI flag definitions and pipeline dispatch.
//!
//! Steps run in a fixed order, whatever order the flags were given in:
//! filter, then either the interactive shell or
//! delete → rename → order → modify → set → format → picture →
//! strip-lyrics → sort → list.
//!
//! The steps themselves live in submodules:
//! - `edit`: tag rewriting and cleanup
//! - `organize`: file renaming, sorting and ordering

mod edit;
mod organize;

use clap::Parser;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{self, Config};
use crate::console::{Console, Terminal};
use crate::filter;
use crate::library;
use crate::metadata::{LoftyStore, TagStore};
use crate::model::TagName;
use crate::presets::Preset;
use crate::scanner::{self, Expansion};
use crate::shell::Shell;

/// flac-manager CLI
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Batch-edit audio file tags: filter, preview, confirm, apply",
    long_about = None
)]
pub struct Cli {
    /// Audio file(s) or folder(s) containing audio files
    #[arg(required = true, value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,

    /// Expand folder inputs one level
    #[arg(short, long, conflicts_with = "recursive")]
    pub directory: bool,

    /// Expand folder inputs fully
    #[arg(short, long)]
    pub recursive: bool,

    /// Print a table of the collection
    #[arg(short, long)]
    pub list: bool,

    /// Rename files to "<track> - <title>.<ext>"
    #[arg(long)]
    pub rename: bool,

    /// Move files into DEST/<artist>/<album>/ (default from config, else the current folder)
    #[arg(long, value_name = "DEST", num_args = 0..=1)]
    pub sort: Option<Option<PathBuf>>,

    /// Regex search and replace in the tags given by --tags ($1 inserts a group)
    #[arg(long, num_args = 2, value_names = ["PATTERN", "REPLACEMENT"])]
    pub modify: Option<Vec<String>>,

    /// Target tags for --modify, comma separated (asked for when missing)
    #[arg(short, long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Set TAG to VALUE on every file (empty VALUE clears it)
    #[arg(long, num_args = 2, value_names = ["TAG", "VALUE"])]
    pub set: Option<Vec<String>>,

    /// Embed IMAGE (jpg, jpeg, png) as front cover
    #[arg(long, value_name = "IMAGE")]
    pub picture: Option<PathBuf>,

    /// Keep only files whose TAG (comma separated list allowed) matches PATTERN
    #[arg(long, num_args = 2, value_names = ["TAG", "PATTERN"])]
    pub filter: Option<Vec<String>>,

    /// Order the collection by track number
    #[arg(long)]
    pub order: bool,

    /// Delete all tags
    #[arg(long)]
    pub delete: bool,

    /// Remove lyrics tags
    #[arg(long)]
    pub strip_lyrics: bool,

    /// Run formatting presets (all of them when none are named)
    #[arg(long, value_enum, value_delimiter = ',', num_args = 0.., value_name = "PRESET")]
    pub format: Option<Vec<Preset>>,

    /// Start the interactive shell
    #[arg(short, long)]
    pub interactive: bool,

    /// Apply changes without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Configuration file
    #[arg(long, env = "FLAC_MANAGER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn expansion(&self) -> Expansion {
        if self.recursive {
            Expansion::Recursive
        } else if self.directory {
            Expansion::Shallow
        } else {
            Expansion::FilesOnly
        }
    }
}

/// Run the CLI against the real filesystem and terminal.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = config::load(cli.config.as_deref());
    let store = LoftyStore::new();
    let mut console = Terminal;
    execute(cli, &config, &store, &mut console)
}

/// Load the collection and run every requested step.
pub fn execute(
    cli: &Cli,
    config: &Config,
    store: &dyn TagStore,
    console: &mut dyn Console,
) -> anyhow::Result<()> {
    let assume_yes = cli.yes || config.modify.assume_yes;

    let paths = scanner::collect_paths(
        &cli.inputs,
        cli.expansion(),
        &config.discovery.extensions,
        console,
    );
    let mut files = library::load(&paths, store, console)?;
    info!(files = files.len(), "Collection ready");

    if let Some([tags, pattern]) = cli.filter.as_deref() {
        let tags = filter::resolve_tags(TagName::parse_list(tags)?, console)?;
        let pattern = Regex::new(pattern)?;
        files = filter::retain(files, &pattern, &tags, console);
        if files.is_empty() {
            debug!("Filter left nothing to work on");
            return Ok(());
        }
    }

    if cli.interactive {
        Shell::new(files, store, config, assume_yes).run(console)?;
        return Ok(());
    }

    if cli.delete {
        edit::cmd_delete(&mut files, store, console);
    }
    if cli.rename {
        organize::cmd_rename(&mut files, console);
    }
    if cli.order {
        organize::cmd_order(&mut files, console);
    }
    if let Some([pattern, replacement]) = cli.modify.as_deref() {
        edit::cmd_modify(
            &mut files,
            pattern,
            replacement,
            cli.tags.as_deref(),
            store,
            console,
            assume_yes,
        )?;
    }
    if let Some([tag, value]) = cli.set.as_deref() {
        edit::cmd_set(&mut files, tag, value, store, console, assume_yes)?;
    }
    if let Some(presets) = &cli.format {
        edit::cmd_format(&mut files, presets, store, console, assume_yes)?;
    }
    if let Some(image) = &cli.picture {
        edit::cmd_picture(&mut files, image, store, console)?;
    }
    if cli.strip_lyrics {
        edit::cmd_strip_lyrics(&mut files, store, console);
    }
    if let Some(destination) = &cli.sort {
        organize::cmd_sort(&mut files, destination.as_deref(), config, console)?;
    }
    if cli.list {
        library::list(&files, console);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::TagRecord;
    use crate::test_utils::{MemoryStore, ScriptedConsole};
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("flac-manager").chain(args.iter().copied())).unwrap()
    }

    fn record(title: &str, track: &str) -> TagRecord {
        TagRecord {
            title: vec![title.to_string()],
            track_number: vec![track.to_string()],
            ..TagRecord::default()
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_file("/music/01.flac", record("Intro", "1"))
            .with_file("/music/02.flac", record("Intro (Reprise)", "2"))
            .with_file("/music/03.flac", record("Outro", "3"))
    }

    const INPUTS: [&str; 3] = ["/music/01.flac", "/music/02.flac", "/music/03.flac"];

    #[test]
    fn test_parse_flags() {
        let cli = parse(&[
            "a.flac", "-r", "-l", "--modify", "^(.*)$", "$1!", "-t", "title,artist", "-y",
        ]);
        assert_eq!(cli.inputs, vec![PathBuf::from("a.flac")]);
        assert_eq!(cli.expansion(), Expansion::Recursive);
        assert!(cli.list && cli.yes);
        assert_eq!(
            cli.modify,
            Some(vec!["^(.*)$".to_string(), "$1!".to_string()])
        );
        assert_eq!(cli.tags.as_deref(), Some("title,artist"));
    }

    #[test]
    fn test_parse_optional_values() {
        let cli = parse(&["a.flac", "--sort", "--format"]);
        assert_eq!(cli.sort, Some(None));
        assert_eq!(cli.format, Some(vec![]));

        let cli = parse(&["a.flac", "--sort", "/lib", "--format", "zero-pad,title-case"]);
        assert_eq!(cli.sort, Some(Some(PathBuf::from("/lib"))));
        assert_eq!(cli.format, Some(vec![Preset::ZeroPad, Preset::TitleCase]));

        let cli = parse(&["a.flac"]);
        assert_eq!(cli.sort, None);
        assert_eq!(cli.format, None);
        assert_eq!(cli.expansion(), Expansion::FilesOnly);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Cli::try_parse_from(["flac-manager"]).is_err());
        assert!(Cli::try_parse_from(["flac-manager", "a.flac", "-d", "-r"]).is_err());
        assert!(Cli::try_parse_from(["flac-manager", "a.flac", "--format", "shout"]).is_err());
        assert!(Cli::try_parse_from(["flac-manager", "a.flac", "--modify", "only-one"]).is_err());
    }

    #[test]
    fn test_filter_then_set() {
        let store = store();
        let mut console = ScriptedConsole::new();
        let mut args = INPUTS.to_vec();
        args.extend(["--filter", "title", "^Intro$", "--set", "genre", "House", "-y"]);

        execute(&parse(&args), &Config::default(), &store, &mut console).unwrap();

        assert_eq!(store.persist_count(), 1);
        let stored = store.stored("/music/01.flac").unwrap();
        assert_eq!(stored.first(TagName::Genre), Some("House"));
        assert!(console.questions().is_empty());
    }

    #[test]
    fn test_empty_filter_stops_pipeline() {
        let store = store();
        let mut console = ScriptedConsole::new();
        let mut args = INPUTS.to_vec();
        args.extend(["--filter", "title", "^Nothing$", "--set", "genre", "House", "-y", "-l"]);

        execute(&parse(&args), &Config::default(), &store, &mut console).unwrap();

        assert_eq!(store.persist_count(), 0);
        assert_eq!(console.warnings().len(), 1);
        assert!(!console.lines().iter().any(|l| l.ends_with("file(s)")));
    }

    #[test]
    fn test_modify_asks_for_confirmation() {
        let store = store();
        let mut console = ScriptedConsole::new().with_confirmations([false]);
        let mut args = INPUTS.to_vec();
        args.extend(["--modify", "Intro", "Opening", "-t", "title"]);

        execute(&parse(&args), &Config::default(), &store, &mut console).unwrap();

        assert_eq!(console.questions().len(), 1);
        assert_eq!(store.persist_count(), 0);
    }

    #[test]
    fn test_config_assume_yes() {
        let store = store();
        let mut console = ScriptedConsole::new();
        let mut config = Config::default();
        config.modify.assume_yes = true;
        let mut args = INPUTS.to_vec();
        args.extend(["--format", "zero-pad"]);

        execute(&parse(&args), &config, &store, &mut console).unwrap();

        assert_eq!(store.persist_count(), 3);
        assert_eq!(
            store.stored("/music/03.flac").unwrap().first(TagName::TrackNumber),
            Some("03")
        );
    }

    #[test]
    fn test_unknown_tag_fails() {
        let store = store();
        let mut console = ScriptedConsole::new();
        let mut args = INPUTS.to_vec();
        args.extend(["--set", "composer", "Bach", "-y"]);

        let err = execute(&parse(&args), &Config::default(), &store, &mut console).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnknownTag(_))));
        assert_eq!(store.persist_count(), 0);
    }

    #[test]
    fn test_nothing_readable_fails() {
        let store = MemoryStore::new();
        let mut console = ScriptedConsole::new();

        let err = execute(&parse(&["/music/x.flac"]), &Config::default(), &store, &mut console)
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyCollection)));
    }

    #[test]
    fn test_rename_then_sort_uses_configured_destination() {
        let temp = tempdir().unwrap();
        let incoming = temp.path().join("incoming");
        let library = temp.path().join("library");
        fs::create_dir_all(&incoming).unwrap();
        let source = incoming.join("track01.flac");
        fs::write(&source, b"audio").unwrap();

        let store = MemoryStore::new().with_file(
            &source,
            TagRecord {
                artist: vec!["Daft Punk".into()],
                album: vec!["Discovery".into()],
                ..record("One More Time", "1")
            },
        );
        let mut config = Config::default();
        config.organize.destination = Some(library.clone());
        let mut console = ScriptedConsole::new();

        let cli = parse(&[source.to_str().unwrap(), "--rename", "--sort"]);
        execute(&cli, &config, &store, &mut console).unwrap();

        let expected = library
            .join("Daft Punk")
            .join("Discovery")
            .join("1 - One More Time.flac");
        assert!(expected.exists());
        assert!(!source.exists());
    }

    #[test]
    fn test_directory_inputs_need_a_flag() {
        let temp = tempdir().unwrap();
        let track = temp.path().join("a.flac");
        fs::write(&track, b"audio").unwrap();
        let store = MemoryStore::new().with_file(&track, TagRecord::default());

        let mut console = ScriptedConsole::new();
        let cli = parse(&[temp.path().to_str().unwrap()]);
        assert!(execute(&cli, &Config::default(), &store, &mut console).is_err());
        assert_eq!(console.warnings().len(), 1);

        let mut console = ScriptedConsole::new();
        let cli = parse(&[temp.path().to_str().unwrap(), "-d", "-l"]);
        execute(&cli, &Config::default(), &store, &mut console).unwrap();
        assert!(console.lines().iter().any(|l| l == "1 file(s)"));
    }

    #[test]
    fn test_interactive_takes_over() {
        let store = store();
        let mut console = ScriptedConsole::new().with_answers(["list", "quit"]);
        let mut args = INPUTS.to_vec();
        args.extend(["-i", "--delete"]);

        execute(&parse(&args), &Config::default(), &store, &mut console).unwrap();

        // --delete is not run when the shell takes over
        assert_eq!(store.erase_count(), 0);
        assert!(console.lines().iter().any(|l| l == "3 file(s)"));
    }
}
