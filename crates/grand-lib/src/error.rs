//! Error types for grand-average plotting.

use std::path::PathBuf;
use thiserror::Error;

/// Every way an invocation can fail. All of them are fatal to the invocation.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Malformed override list or bounds pair
    #[error("{0}")]
    ArgumentShape(String),

    /// Override key outside the recognised set
    #[error("unrecognised option '{0}' (expected one of xlim, ylim, electrode, ci, type, name)")]
    UnknownOption(String),

    /// Time bounds outside the recorded range
    #[error("xlim [{min}, {max}] is outside the recorded time range {lo} to {hi} ms")]
    OutOfRange { min: f64, max: f64, lo: f64, hi: f64 },

    /// Two options that cannot be combined
    #[error("{0}")]
    MutuallyExclusive(String),

    /// Value outside an option's domain
    #[error("invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Requested view type was never computed upstream
    #[error("{file}no {view} found; run the upstream {view} extraction first")]
    MissingPrerequisite { view: &'static str, file: String },

    /// Several named instances and none selected
    #[error("several {view} instances found ({available}); select one with the 'name' option")]
    Ambiguous { view: &'static str, available: String },

    /// Named instance does not exist
    #[error("{file}{view} '{name}' not found")]
    NotFound {
        view: &'static str,
        name: String,
        file: String,
    },

    /// Electrode label missing from a participant's channel list
    #[error("electrode '{electrode}' not found in {}", .path.display())]
    ElectrodeNotFound { electrode: String, path: PathBuf },

    /// Participant channel count differs from the first participant's
    #[error("{} has {actual} channels, expected {expected}", .path.display())]
    ChannelCountMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// Participant time axis differs from the first participant's
    #[error("time axis of {} does not match the rest of the group", .path.display())]
    TimeAxisMismatch { path: PathBuf },

    /// Recording contents inconsistent with themselves
    #[error("{}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    /// No participant recordings to average
    #[error("no recordings found in {}", .dir.display())]
    EmptyGroup { dir: PathBuf },

    /// Store failure while opening a recording
    #[error("failed to open {}: {reason:#}", .path.display())]
    Io { path: PathBuf, reason: anyhow::Error },

    /// Drawing backend failure
    #[error("rendering failed: {0:#}")]
    Render(anyhow::Error),
}

impl PlotError {
    pub(crate) fn not_found(
        view: &'static str,
        name: &str,
        path: Option<&std::path::Path>,
    ) -> Self {
        Self::NotFound {
            view,
            name: name.to_string(),
            file: file_prefix(path),
        }
    }

    pub(crate) fn missing(view: &'static str, path: Option<&std::path::Path>) -> Self {
        Self::MissingPrerequisite {
            view,
            file: file_prefix(path),
        }
    }
}

fn file_prefix(path: Option<&std::path::Path>) -> String {
    path.map(|p| format!("{}: ", p.display())).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, PlotError>;
