//! Message lookup.
//!
//! Every user-facing phrase is an opaque key (its English source text)
//! passed through a [`Translator`]. The real gettext machinery lives outside
//! this crate; a JSON object of `key → translation` can be supplied instead.
//! Keys with no translation are printed as-is.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MSG_AUTOCORRECT: &str = "Auto-correcting '%s' to '%s' and executing:";
pub const MSG_DID_YOU_MEAN: &str = "Did you mean";
pub const MSG_NOT_FOUND: &str = "Command not found";
pub const MSG_PERHAPS: &str = "Perhaps you were looking for:";
pub const MSG_TRY: &str = "Try: %s";
pub const MSG_INSTALL_WITH: &str = "Install it with:";
pub const MSG_INSTALLED_AT: &str = "is installed at";
pub const MSG_NOT_ON_PATH: &str = "but is not on your PATH";
pub const MSG_PACKAGE_INSTALLED: &str =
    "Package %s is installed but does not expose this command on your PATH";
pub const MSG_TOO_LONG: &str = "Input command too long";
pub const MSG_EXEC_FAILED: &str = "exec failed";

pub trait Translator {
    fn tr<'a>(&'a self, key: &'a str) -> Cow<'a, str>;
}

/// Returns every key unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Untranslated;

impl Translator for Untranslated {
    fn tr<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(key)
    }
}

/// Translations loaded from a flat JSON object.
#[derive(Clone, Debug, Default)]
pub struct MessageCatalog {
    messages: BTreeMap<String, String>,
}

impl MessageCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading message catalog {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("parsing message catalog {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data)?;
        let Value::Object(entries) = value else {
            bail!("message catalog must be a JSON object");
        };
        let mut messages = BTreeMap::new();
        for (key, value) in entries {
            match value {
                Value::String(text) => {
                    messages.insert(key, text);
                }
                other => bail!("translation for '{key}' must be a string, got {other}"),
            }
        }
        Ok(Self { messages })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Translator for MessageCatalog {
    fn tr<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        match self.messages.get(key) {
            Some(text) if !text.is_empty() => Cow::Borrowed(text.as_str()),
            _ => Cow::Borrowed(key),
        }
    }
}

/// Substitute `%s` placeholders in order, C `printf` style.
///
/// Missing arguments leave the placeholder empty; extra arguments are ignored.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("%s") {
        out.push_str(&rest[..pos]);
        if let Some(arg) = args.next() {
            out.push_str(arg);
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
