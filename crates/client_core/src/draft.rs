//! Editable input and its check state.
//!
//! Validation is advisory until something triggers it: an explicit validate,
//! a file load or the sample. Before that the draft is unchecked, which is
//! neither valid nor invalid, and it cannot be submitted.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use shared::{domain::StudentRecord, error::ValidationError};

use crate::{sample::sample_text, validation::validate};

pub const VALID_MESSAGE: &str = "Valid student data format";
pub const SAMPLE_LOADED_MESSAGE: &str = "Sample data loaded";

#[derive(Debug, Clone, PartialEq)]
pub enum CheckState {
    Unchecked,
    Valid(StudentRecord),
    Invalid(ValidationError),
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Typed,
    File(PathBuf),
    Sample,
}

#[derive(Debug, Clone)]
pub struct InputDraft {
    text: String,
    source: InputSource,
    interacted: bool,
    check: CheckState,
}

impl Default for InputDraft {
    fn default() -> Self {
        Self {
            text: String::new(),
            source: InputSource::Typed,
            interacted: false,
            check: CheckState::Unchecked,
        }
    }
}

impl InputDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    pub fn check(&self) -> &CheckState {
        &self.check
    }

    /// Valid or invalid, as opposed to unchecked or unreadable.
    pub fn is_checked(&self) -> bool {
        matches!(self.check, CheckState::Valid(_) | CheckState::Invalid(_))
    }

    pub fn record(&self) -> Option<&StudentRecord> {
        match &self.check {
            CheckState::Valid(record) => Some(record),
            _ => None,
        }
    }

    /// Typing. Revalidates only once the operator has asked for checking.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.source = InputSource::Typed;
        if self.interacted {
            self.run_check();
        } else {
            self.check = CheckState::Unchecked;
        }
    }

    /// Pasting never triggers the first check by itself.
    pub fn paste(&mut self, text: impl Into<String>) {
        self.edit(text);
    }

    pub fn validate(&mut self) -> &CheckState {
        self.interacted = true;
        self.run_check();
        &self.check
    }

    pub fn load_file(&mut self, path: &Path) -> Result<&CheckState> {
        self.interacted = true;
        self.source = InputSource::File(path.to_path_buf());
        match fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))
        {
            Ok(text) => {
                self.text = match text.strip_prefix('\u{FEFF}') {
                    Some(stripped) => stripped.to_string(),
                    None => text,
                };
                self.run_check();
                Ok(&self.check)
            }
            Err(err) => {
                self.check = CheckState::Unreadable(format!("Error reading file: {err:#}"));
                Err(err)
            }
        }
    }

    pub fn load_sample(&mut self) -> &CheckState {
        self.interacted = true;
        self.text = sample_text();
        self.source = InputSource::Sample;
        self.run_check();
        &self.check
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The inline message shown next to the input, if any.
    pub fn message(&self) -> Option<String> {
        match &self.check {
            CheckState::Unchecked => None,
            CheckState::Valid(_) if self.source == InputSource::Sample => {
                Some(SAMPLE_LOADED_MESSAGE.to_string())
            }
            CheckState::Valid(_) => Some(VALID_MESSAGE.to_string()),
            CheckState::Invalid(err) => Some(err.to_string()),
            CheckState::Unreadable(message) => Some(message.clone()),
        }
    }

    fn run_check(&mut self) {
        self.check = match validate(&self.text) {
            Ok(record) => CheckState::Valid(record),
            Err(err) => CheckState::Invalid(err),
        };
    }
}

#[cfg(test)]
#[path = "tests/draft_tests.rs"]
mod tests;
