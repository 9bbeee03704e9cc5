//! User-facing output and prompts.
//!
//! Every operation receives a `&mut dyn Console` instead of printing to a
//! global stdout, so tests can script answers and inspect what the user
//! would have seen. Diagnostics still go through `tracing`; the console is
//! only for messages meant for the person at the keyboard.

use dialoguer::{Confirm, Input, MultiSelect};

use crate::error::Result;

/// Output and prompt interface passed to each operation.
pub trait Console {
    /// Regular output (tables, previews, progress lines).
    fn info(&mut self, message: &str);

    /// Something was skipped or looks off, but the run continues.
    fn warn(&mut self, message: &str);

    /// A per-file or per-operation failure.
    fn error(&mut self, message: &str);

    /// Yes/no question, defaulting to "no".
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Free-text answer (may be empty).
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Pick any number of `options`; returns their indices.
    fn choose_many(&mut self, question: &str, options: &[&str]) -> Result<Vec<usize>>;
}

/// Console backed by the process's terminal.
#[derive(Debug, Default)]
pub struct Terminal;

impl Console for Terminal {
    fn info(&mut self, message: &str) {
        println!("{}", message);
    }

    fn warn(&mut self, message: &str) {
        eprintln!("Warning: {}", message);
    }

    fn error(&mut self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()?)
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        Ok(Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()?)
    }

    fn choose_many(&mut self, question: &str, options: &[&str]) -> Result<Vec<usize>> {
        Ok(MultiSelect::new()
            .with_prompt(question)
            .items(options)
            .interact()?)
    }
}
