//! Error types shared by the model pipeline.
//!
//! Soft failures (a configured target missing from the loaded model) are logged
//! and never show up here. Everything in [`GirError`] is a hard failure: the
//! configuration asked for something that cannot be satisfied, and the run must
//! stop once all such failures have been collected.

use std::fmt;
use std::path::PathBuf;

use itertools::Itertools;

use crate::gir::NodeKind;

/// A hard (run-ending) failure of the model pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GirError {
    #[error("GIR type {gir_type:?} missing version")]
    UnversionedType { gir_type: String },

    #[error("GIR type {gir_type:?} is {found}, expected {expected}")]
    WrongKind {
        gir_type: String,
        expected: &'static str,
        found: NodeKind,
    },

    #[error("GIR type {gir_type:?} has no callable")]
    CallableNotFound { gir_type: String },

    #[error("cannot find parameter {parameter} for {gir_type}")]
    ParameterNotFound { gir_type: String, parameter: String },

    #[error("GIR signal type {selector:?} invalid")]
    InvalidSignalSelector { selector: String },

    #[error("invalid filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: &'static str },

    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid parameter direction {0:?}")]
    InvalidDirection(String),

    #[error("namespace {namespace} is loaded twice ({first} and {second})")]
    DuplicateNamespace {
        namespace: String,
        first: String,
        second: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("repository document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse configuration {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, GirError>;

/// All hard failures collected over one pipeline run.
#[derive(Debug, Default)]
pub struct Errors(pub Vec<GirError>);

impl Errors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, err: GirError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GirError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was collected, the whole list otherwise.
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, Errors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<GirError> for Errors {
    fn from(err: GirError) -> Self {
        Self(vec![err])
    }
}

impl Extend<GirError> for Errors {
    fn extend<T: IntoIterator<Item = GirError>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s):\n{}",
            self.0.len(),
            self.0.iter().map(|e| format!("  - {e}")).join("\n")
        )
    }
}

impl std::error::Error for Errors {}
