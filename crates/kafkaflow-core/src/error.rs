//! Error taxonomy shared by every kafkaflow layer
//!
//! All user-facing failures are expressed as [`KafkaflowError`]. The kind
//! only decides which typed detail entries are attached; every kind shares
//! the same shape and goes through the same [`crate::ErrorHandler`] path.

use std::fmt;
use thiserror::Error;

/// Urgency of an error, governing presentation and exit behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which subsystem an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    General,
    Configuration,
    Authentication,
    Validation,
    Network,
    Resource,
    Command,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::General => "general",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Validation => "validation",
            ErrorKind::Network => "network",
            ErrorKind::Resource => "resource",
            ErrorKind::Command => "command",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, presentable failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct KafkaflowError {
    pub kind: ErrorKind,
    pub message: String,
    pub severity: Severity,
    /// Optional machine-readable code
    pub code: Option<i32>,
    /// Insertion-ordered key/value pairs shown under "Details"
    pub details: Vec<(String, String)>,
    pub help_text: Option<String>,
    /// Process exit status requested when this error is handled
    pub exit_code: Option<i32>,
}

impl KafkaflowError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity: Severity::Error,
            code: None,
            details: Vec::new(),
            help_text: None,
            exit_code: None,
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::General, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Validation errors always name the offending field
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message).with_detail("field", field)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn resource(
        message: impl Into<String>,
        resource_type: Option<&str>,
        resource_id: Option<&str>,
    ) -> Self {
        let mut error = Self::new(ErrorKind::Resource, message);
        if let Some(resource_type) = resource_type {
            error = error.with_detail("resource_type", resource_type);
        }
        if let Some(resource_id) = resource_id {
            error = error.with_detail("resource_id", resource_id);
        }
        error
    }

    pub fn command(message: impl Into<String>, command: Option<&str>) -> Self {
        let error = Self::new(ErrorKind::Command, message);
        match command {
            Some(command) => error.with_detail("command", command),
            None => error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Sets a detail entry. An existing key keeps its position.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.details.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.details.push((key, value)),
        }
        self
    }

    pub fn with_help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Field named by a validation error
    pub fn field(&self) -> Option<&str> {
        self.detail("field")
    }
}
