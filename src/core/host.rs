//! External type host — a [`PlatformRegistry`] backed by a helper process.
//!
//! The host is any program that understands two subcommands:
//!
//! * `HOST platforms` prints a JSON array of platform names.
//! * `HOST parse --platform NAME` reads declaration source on stdin and prints
//!   either `{"ok": <ParseResult>}` or
//!   `{"error": {"message": "...", "line": 3, "column": 7}}`.
//!
//! Calls are synchronous.  A slow host stalls the caller for as long as it
//! takes to answer.

use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::time::Instant;

use serde::Deserialize;

use super::platform::{
    PlatformError, PlatformRef, PlatformRegistry, SourcePosition, SyntaxError,
};
use super::types::ParseResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum HostReply {
    Ok(ParseResult),
    Error(WireSyntaxError),
}

#[derive(Debug, Deserialize)]
struct WireSyntaxError {
    message: String,
    line: Option<usize>,
    column: Option<usize>,
}

impl From<WireSyntaxError> for SyntaxError {
    fn from(w: WireSyntaxError) -> Self {
        let position = w.line.map(|line| SourcePosition {
            line,
            column: w.column.unwrap_or(1),
        });
        SyntaxError {
            message: w.message,
            position,
        }
    }
}

/// Decode a `parse` reply.
pub fn decode_parse_reply(bytes: &[u8]) -> Result<ParseResult, PlatformError> {
    match serde_json::from_slice::<HostReply>(bytes)? {
        HostReply::Ok(result) => Ok(result),
        HostReply::Error(e) => Err(PlatformError::Syntax(e.into())),
    }
}

/// Decode a `platforms` reply.
pub fn decode_platforms_reply(bytes: &[u8]) -> Result<Vec<PlatformRef>, PlatformError> {
    let names: Vec<String> = serde_json::from_slice(bytes)?;
    Ok(names.into_iter().map(PlatformRef::new).collect())
}

/// Registry that shells out to a type host program.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    program: Option<String>,
    args: Vec<String>,
}

impl HostRegistry {
    /// `program` of `None` yields a registry whose every call fails with
    /// [`PlatformError::NoHost`].
    pub fn new(program: Option<String>, args: Vec<String>) -> Self {
        Self { program, args }
    }

    pub fn is_configured(&self) -> bool {
        self.program.is_some()
    }

    fn run(&self, extra: &[&str], stdin: Option<&str>) -> Result<Output, PlatformError> {
        let program = self.program.as_deref().ok_or(PlatformError::NoHost)?;
        let spawn_err = |source| PlatformError::Spawn {
            program: program.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(&self.args)
            .args(extra)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // Feed stdin from a separate thread so a host that starts writing
        // before it has read everything cannot deadlock against us.
        let writer = match (stdin, child.stdin.take()) {
            (Some(text), Some(mut pipe)) => {
                let text = text.to_owned();
                Some(std::thread::spawn(move || pipe.write_all(text.as_bytes())))
            }
            _ => None,
        };

        let output = child.wait_with_output().map_err(spawn_err)?;
        if let Some(handle) = writer {
            // A host that exits without reading stdin closes the pipe under
            // us; its reply (or exit status) is what matters.
            if let Ok(Err(e)) = handle.join() {
                tracing::debug!("type host stdin write failed: {e}");
            }
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) && !output.status.success() {
            return Err(PlatformError::HostFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl PlatformRegistry for HostRegistry {
    fn list_platforms(&self) -> Result<Vec<PlatformRef>, PlatformError> {
        let output = self.run(&["platforms"], None)?;
        decode_platforms_reply(&output.stdout)
    }

    fn parse_types_from_source(
        &self,
        platform: &PlatformRef,
        source: &str,
    ) -> Result<ParseResult, PlatformError> {
        let t0 = Instant::now();
        let output = self.run(&["parse", "--platform", platform.name()], Some(source))?;
        let result = decode_parse_reply(&output.stdout);
        tracing::debug!(
            "type host parse: {:.2?} platform={} bytes={} ok={}",
            t0.elapsed(),
            platform,
            source.len(),
            result.is_ok()
        );
        result
    }
}
