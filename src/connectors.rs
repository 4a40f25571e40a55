//! Connector registry for package-metadata backends and external tools.
//!
//! This module centralizes how a backend name maps to the metadata source
//! (flat catalog snapshot vs per-manifest ownership scan) and how external
//! query tools are described and invoked. Resolver code never builds command
//! lines itself; it receives a [`CommandSpec`] from here so deployments can
//! swap `apt-cache`, `rpm` or `dpkg` for site-specific tools via
//! configuration.
//!
//! Every invocation is blocking and has no timeout: a hung external query
//! hangs the helper.

use anyhow::{Context, Result, bail};
use std::env;
use std::env::VarError;
use std::ffi::{OsStr, OsString};
use std::process::{Command, Output, Stdio};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// Single text snapshot of the catalog, one `name - description` per line.
    #[default]
    Flat,
    /// Directory of repository manifests queried for owned paths.
    Manifest,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Flat => "flat",
            Backend::Manifest => "manifest",
        }
    }

    /// Whether owner lookups can match on owned file names.
    pub fn tracks_ownership(&self) -> bool {
        matches!(self, Backend::Manifest)
    }
}

impl TryFrom<&str> for Backend {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "flat" => Ok(Backend::Flat),
            "manifest" => Ok(Backend::Manifest),
            other => bail!(
                "Unknown backend: {other} (expected one of: {})",
                allowed_backend_names().join(", ")
            ),
        }
    }
}

pub fn allowed_backend_names() -> Vec<&'static str> {
    [Backend::Flat, Backend::Manifest]
        .iter()
        .map(Backend::as_str)
        .collect()
}

/// An external program plus its fixed leading arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a whitespace separated command line (no shell quoting).
    pub fn parse(raw: &str) -> Result<Self> {
        let mut words = raw.split_whitespace();
        let Some(program) = words.next() else {
            bail!("command line must not be empty");
        };
        Ok(Self::new(program, words))
    }

    pub fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    fn command_with(&self, extra: &[&OsStr]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).args(extra);
        command
    }

    /// Run to completion, capturing stdout; stderr is discarded.
    pub fn output(&self, extra: &[&OsStr]) -> Result<Output> {
        debug!(command = %self.display(), "running external query");
        self.command_with(extra)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute {}", self.display()))
    }

    /// Run and return stdout, failing on a non-zero exit status.
    pub fn stdout(&self, extra: &[&OsStr]) -> Result<String> {
        let output = self.output(extra)?;
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            bail!("{} returned non-zero exit code {code}", self.display());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run with all output discarded and report whether it exited zero.
    pub fn succeeds(&self, extra: &[&OsStr]) -> Result<bool> {
        debug!(command = %self.display(), "running external check");
        let status = self
            .command_with(extra)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Failed to execute {}", self.display()))?;
        Ok(status.success())
    }
}

/// Read an environment variable, treating empty values as unset.
pub fn env_non_empty(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        Ok(_) => None,
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(os)) => Some(os.to_string_lossy().into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parse_and_strings_round_trip() {
        let flat = Backend::try_from("flat").expect("flat parses");
        assert_eq!(flat.as_str(), "flat");
        assert!(!flat.tracks_ownership());
        let manifest = Backend::try_from("manifest").expect("manifest parses");
        assert!(manifest.tracks_ownership());
        assert!(Backend::try_from("rpmdb").is_err());
        assert_eq!(allowed_backend_names(), vec!["flat", "manifest"]);
    }

    #[test]
    fn command_spec_parses_words() {
        let spec = CommandSpec::parse("apt-cache  search .").unwrap();
        assert_eq!(spec.program, OsString::from("apt-cache"));
        assert_eq!(spec.args, vec![OsString::from("search"), OsString::from(".")]);
        assert_eq!(spec.display(), "apt-cache search .");
        assert!(CommandSpec::parse("   ").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn stdout_and_status_follow_exit_codes() {
        let echo = CommandSpec::new("sh", ["-c", "echo hello"]);
        assert_eq!(echo.stdout(&[]).unwrap(), "hello\n");
        let fail = CommandSpec::new("sh", ["-c", "exit 3"]);
        assert!(fail.stdout(&[]).is_err());
        assert!(!fail.succeeds(&[]).unwrap());
        let missing = CommandSpec::new("/nonexistent/tool", Vec::<&str>::new());
        assert!(missing.output(&[]).is_err());
    }
}
