//! Canned formatting rewrites.
//!
//! Each preset is a pre-built [`Rewrite`] run through the regular modify
//! pipeline, so every preset shows its preview and asks for confirmation
//! (unless the run was started with `--yes`).

use clap::ValueEnum;
use regex::Captures;

use crate::console::Console;
use crate::error::Result;
use crate::metadata::TagStore;
use crate::model::{AudioFile, TagName};
use crate::modify::{self, Outcome, Replacement, Rewrite, Scope};

/// Formatting presets, in the order they run when all are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Keep only the first artist/genre entry
    Collapse,
    /// Capitalise Each Word of titles, artists and albums
    TitleCase,
    /// Remove "(...)" from titles
    StripParens,
    /// Remove characters not allowed in file names
    StripIllegal,
    /// Zero-pad single digit track numbers ("5" -> "05")
    ZeroPad,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Collapse,
        Preset::TitleCase,
        Preset::StripParens,
        Preset::StripIllegal,
        Preset::ZeroPad,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Preset::Collapse => "collapse multi-valued artist/genre",
            Preset::TitleCase => "title-case words",
            Preset::StripParens => "strip parenthetical text",
            Preset::StripIllegal => "strip characters illegal in file names",
            Preset::ZeroPad => "zero-pad track numbers",
        }
    }

    pub fn rewrite(self) -> Result<Rewrite> {
        match self {
            // Sees all entries at once, so later ones can be dropped
            Preset::Collapse => Ok(Rewrite::new(
                r"^([^;]*?)\s*;.*$",
                Replacement::Template("$1".into()),
                vec![TagName::Artist, TagName::Genre],
            )?
            .with_scope(Scope::Joined)),
            Preset::TitleCase => Rewrite::new(
                r"\b(\w)([\w']*)",
                Replacement::Transform(Box::new(title_case_word)),
                vec![TagName::Title, TagName::Artist, TagName::Album],
            ),
            Preset::StripParens => Rewrite::new(
                r"\s*\([^)]*\)",
                Replacement::Literal(String::new()),
                vec![TagName::Title],
            ),
            Preset::StripIllegal => Rewrite::new(
                r#"[<>:"/\\|?*]"#,
                Replacement::Literal(String::new()),
                vec![TagName::Title, TagName::Artist, TagName::Album],
            ),
            Preset::ZeroPad => Rewrite::new(
                r"^(\d)(/\d+)?$",
                Replacement::Template("0${1}${2}".into()),
                vec![TagName::TrackNumber],
            ),
        }
    }
}

fn title_case_word(caps: &Captures<'_>) -> String {
    format!("{}{}", caps[1].to_uppercase(), caps[2].to_lowercase())
}

/// Run `presets` one after another, each with its own preview/confirm cycle.
pub fn run(
    presets: &[Preset],
    files: &mut [AudioFile],
    store: &dyn TagStore,
    console: &mut dyn Console,
    assume_yes: bool,
) -> Result<Vec<(Preset, Outcome)>> {
    let mut outcomes = Vec::with_capacity(presets.len());

    for &preset in presets {
        console.info(&format!("== {} ==", preset.label()));
        let rewrite = preset.rewrite()?;
        let outcome = modify::run(files, &rewrite, store, console, assume_yes)?;
        outcomes.push((preset, outcome));
    }

    Ok(outcomes)
}
