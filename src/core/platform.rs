//! Platform registry seam — where declaration text becomes a [`ParseResult`].
//!
//! Parsing itself is not done in this crate.  A [`PlatformRegistry`] lists the
//! target platforms it knows and parses source text against one of them; the
//! only implementation shipped is [`super::host::HostRegistry`], which talks to
//! an external type host process.

use std::fmt;

use thiserror::Error;

use super::types::ParseResult;

/// Platform selected on first launch when nothing else is configured.
pub const DEFAULT_PLATFORM: &str = "windows-x86_64";

/// A target platform, identified by name (e.g. `linux-x86_64`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformRef(String);

impl PlatformRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for PlatformRef {
    fn default() -> Self {
        Self::new(DEFAULT_PLATFORM)
    }
}

impl fmt::Display for PlatformRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 1-based line/column of a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

/// The declarations could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: Option<SourcePosition>,
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("no type host configured (set `host_command` or pass --host)")]
    NoHost,
    #[error("unknown platform `{0}`")]
    UnknownPlatform(String),
    #[error("failed to run type host `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("type host exited with {status}: {stderr}")]
    HostFailed { status: String, stderr: String },
    #[error("malformed reply from type host: {0}")]
    Reply(#[from] serde_json::Error),
}

impl PlatformError {
    /// The syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

/// Enumerates platforms and parses declarations against them.
pub trait PlatformRegistry {
    fn list_platforms(&self) -> Result<Vec<PlatformRef>, PlatformError>;

    fn parse_types_from_source(
        &self,
        platform: &PlatformRef,
        source: &str,
    ) -> Result<ParseResult, PlatformError>;
}

/// Find `name` among the registry's platforms.
pub fn resolve_platform(
    registry: &dyn PlatformRegistry,
    name: &str,
) -> Result<PlatformRef, PlatformError> {
    registry
        .list_platforms()?
        .into_iter()
        .find(|p| p.name() == name)
        .ok_or_else(|| PlatformError::UnknownPlatform(name.to_string()))
}
