//! Interactive command loop.
//!
//! Prompts for a command, asks for its arguments, runs it against the
//! working collection and loops until `exit`/`quit` or end of input.
//! Failures of a single command are reported and the loop continues.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use clap::ValueEnum;

use crate::config::Config;
use crate::console::Console;
use crate::cover;
use crate::error::{Error, Result};
use crate::filter;
use crate::library;
use crate::metadata::{self, TagStore};
use crate::model::{AudioFile, TagName};
use crate::modify::{self, Replacement, Rewrite};
use crate::organizer;
use crate::presets::{self, Preset};

const PROMPT: &str = "flac-manager";

/// Shell commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Filter,
    Modify,
    Set,
    Format,
    Rename,
    Sort,
    Order,
    Picture,
    Lyrics,
    Delete,
    Help,
    Exit,
}

impl Command {
    pub const ALL: [Command; 13] = [
        Command::List,
        Command::Filter,
        Command::Modify,
        Command::Set,
        Command::Format,
        Command::Rename,
        Command::Sort,
        Command::Order,
        Command::Picture,
        Command::Lyrics,
        Command::Delete,
        Command::Help,
        Command::Exit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Filter => "filter",
            Command::Modify => "modify",
            Command::Set => "set",
            Command::Format => "format",
            Command::Rename => "rename",
            Command::Sort => "sort",
            Command::Order => "order",
            Command::Picture => "picture",
            Command::Lyrics => "lyrics",
            Command::Delete => "delete",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Command::List => "show the working collection",
            Command::Filter => "narrow the collection by a tag pattern",
            Command::Modify => "regex search and replace in tags",
            Command::Set => "set one tag on every file",
            Command::Format => "run formatting presets",
            Command::Rename => "rename files to \"<track> - <title>\"",
            Command::Sort => "move files into <artist>/<album>/ folders",
            Command::Order => "order the collection by track number",
            Command::Picture => "embed a front cover image",
            Command::Lyrics => "remove lyrics tags",
            Command::Delete => "delete all tags",
            Command::Help => "show this help",
            Command::Exit => "leave the shell (also: quit)",
        }
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "quit" {
            return Ok(Command::Exit);
        }
        Command::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or(s)
    }
}

/// Shell state: the working collection and the services commands use.
pub struct Shell<'a> {
    files: Vec<AudioFile>,
    store: &'a dyn TagStore,
    config: &'a Config,
    assume_yes: bool,
}

impl<'a> Shell<'a> {
    pub fn new(
        files: Vec<AudioFile>,
        store: &'a dyn TagStore,
        config: &'a Config,
        assume_yes: bool,
    ) -> Self {
        Self {
            files,
            store,
            config,
            assume_yes,
        }
    }

    pub fn files(&self) -> &[AudioFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<AudioFile> {
        self.files
    }

    /// Run until `exit`/`quit` or until the console has no more input.
    pub fn run(&mut self, console: &mut dyn Console) -> Result<()> {
        console.info(&format!(
            "{} file(s) loaded. Type 'help' for commands.",
            self.files.len()
        ));

        loop {
            let input = match console.ask(PROMPT) {
                Ok(input) => input,
                Err(Error::Prompt(reason)) => {
                    debug!(%reason, "Input closed, leaving shell");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            let command = match input.parse::<Command>() {
                Ok(command) => command,
                Err(unknown) => {
                    console.warn(&format!(
                        "Unknown command '{}'. Type 'help' for a list of commands.",
                        unknown
                    ));
                    continue;
                }
            };

            if command == Command::Exit {
                return Ok(());
            }

            match self.dispatch(command, console) {
                Ok(()) => {}
                Err(Error::Prompt(reason)) => {
                    debug!(%reason, "Input closed, leaving shell");
                    return Ok(());
                }
                Err(e) => console.error(&e.to_string()),
            }
        }
    }

    fn dispatch(&mut self, command: Command, console: &mut dyn Console) -> Result<()> {
        debug!(command = command.name(), files = self.files.len(), "Shell command");

        match command {
            Command::List => library::list(&self.files, console),
            Command::Filter => self.filter(console)?,
            Command::Modify => {
                let tags = ask_tags(console)?;
                let pattern = console.ask("Pattern")?;
                let replacement = console.ask("Replacement ($1 inserts a group)")?;
                let rewrite = Rewrite::new(&pattern, Replacement::Template(replacement), tags)?;
                modify::run(&mut self.files, &rewrite, self.store, console, self.assume_yes)?;
            }
            Command::Set => {
                let tag: TagName = console.ask("Tag")?.parse()?;
                let value = console.ask("Value (empty clears the tag)")?;
                let rewrite = Rewrite::set(tag, &value)?;
                modify::run(&mut self.files, &rewrite, self.store, console, self.assume_yes)?;
            }
            Command::Format => {
                let answer = console.ask("Presets (comma separated, empty for all)")?;
                let Some(chosen) = parse_presets(&answer, console) else {
                    return Ok(());
                };
                presets::run(&chosen, &mut self.files, self.store, console, self.assume_yes)?;
            }
            Command::Rename => {
                organizer::rename_by_tags(&mut self.files, console);
            }
            Command::Sort => {
                let answer = console.ask("Destination (empty for default)")?;
                let explicit = (!answer.trim().is_empty()).then(|| PathBuf::from(answer.trim()));
                let base = organizer::sort_base(
                    explicit.as_deref(),
                    self.config.organize.destination.as_deref(),
                )?;
                organizer::sort_into_folders(&mut self.files, &base, console);
            }
            Command::Order => {
                organizer::order_by_track(&mut self.files, console);
                library::list(&self.files, console);
            }
            Command::Picture => {
                let image = console.ask("Image path")?;
                cover::add_picture(&mut self.files, Path::new(image.trim()), self.store, console)?;
            }
            Command::Lyrics => {
                metadata::strip_lyrics(&mut self.files, self.store, console);
            }
            Command::Delete => {
                let question = format!("Delete ALL tags from {} file(s)?", self.files.len());
                if self.assume_yes || console.confirm(&question)? {
                    metadata::delete_all(&mut self.files, self.store, console);
                } else {
                    console.info("Aborted, no files were modified.");
                }
            }
            Command::Help => help(console),
            Command::Exit => {}
        }

        Ok(())
    }

    /// Narrow the working collection. A filter matching nothing empties it,
    /// as it does on the command line.
    fn filter(&mut self, console: &mut dyn Console) -> Result<()> {
        let tags = ask_tags(console)?;
        let pattern = Regex::new(&console.ask("Pattern")?)?;

        let files = std::mem::take(&mut self.files);
        self.files = filter::retain(files, &pattern, &tags, console);
        Ok(())
    }
}

fn ask_tags(console: &mut dyn Console) -> Result<Vec<TagName>> {
    let answer = console.ask("Tags (comma separated, empty to choose)")?;
    let tags = TagName::parse_list(&answer)?;
    filter::resolve_tags(tags, console)
}

fn parse_presets(answer: &str, console: &mut dyn Console) -> Option<Vec<Preset>> {
    let mut chosen = Vec::new();
    for name in answer.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match Preset::from_str(name, true) {
            Ok(preset) => chosen.push(preset),
            Err(_) => {
                let known: Vec<String> = Preset::ALL
                    .iter()
                    .filter_map(|p| p.to_possible_value())
                    .map(|v| v.get_name().to_string())
                    .collect();
                console.error(&format!(
                    "Unknown preset '{}' (expected one of: {})",
                    name,
                    known.join(", ")
                ));
                return None;
            }
        }
    }

    if chosen.is_empty() {
        chosen = Preset::ALL.to_vec();
    }
    Some(chosen)
}

fn help(console: &mut dyn Console) {
    console.info("Commands:");
    for command in Command::ALL {
        console.info(&format!("  {:<8} {}", command.name(), command.summary()));
    }
}
