//! Keyboard-layout transliteration.
//!
//! Users who forget to switch from the Russian (JCUKEN) layout type Latin
//! command names as Cyrillic text: `ды` instead of `ls`. The table below maps
//! each Cyrillic key to the Latin character printed on the same physical key
//! of a QWERTY keyboard. Lookup is exact; anything not in the table is
//! copied through according to [`UnmappedPolicy`].

use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::ffi::OsStringExt;

/// Upper bound on the transliterated output, in bytes; equal to the input
/// cap, so accepted input is never truncated.
pub const MAX_OUTPUT_LEN: usize = crate::MAX_INPUT_LEN;

/// Positional Cyrillic → Latin mapping (Russian JCUKEN over US QWERTY).
#[rustfmt::skip]
pub const RU_TO_EN: &[(&str, u8)] = &[
    ("а", b'f'), ("б", b','), ("в", b'd'), ("г", b'u'), ("д", b'l'), ("е", b't'),
    ("ё", b'`'), ("ж", b';'), ("з", b'p'), ("и", b'b'), ("й", b'q'), ("к", b'r'),
    ("л", b'k'), ("м", b'v'), ("н", b'y'), ("о", b'j'), ("п", b'g'), ("р", b'h'),
    ("с", b'c'), ("т", b'n'), ("у", b'e'), ("ф", b'a'), ("х", b'['), ("ц", b'w'),
    ("ч", b'x'), ("ш", b'i'), ("щ", b'o'), ("ъ", b']'), ("ы", b's'), ("ь", b'm'),
    ("э", b'\''), ("ю", b'.'), ("я", b'z'),
    ("А", b'F'), ("Б", b'<'), ("В", b'D'), ("Г", b'U'), ("Д", b'L'), ("Е", b'T'),
    ("Ё", b'~'), ("Ж", b':'), ("З", b'P'), ("И", b'B'), ("Й", b'Q'), ("К", b'R'),
    ("Л", b'K'), ("М", b'V'), ("Н", b'Y'), ("О", b'J'), ("П", b'G'), ("Р", b'H'),
    ("С", b'C'), ("Т", b'N'), ("У", b'E'), ("Ф", b'A'), ("Х", b'{'), ("Ц", b'W'),
    ("Ч", b'X'), ("Ш", b'I'), ("Щ", b'O'), ("Ъ", b'}'), ("Ы", b'S'), ("Ь", b'M'),
    ("Э", b'"'), ("Ю", b'>'), ("Я", b'Z'),
];

/// What to emit for a multi-byte character that has no table entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnmappedPolicy {
    /// Copy the whole encoded character.
    #[default]
    Passthrough,
    /// Copy only the leading encoded byte. This is lossy and can produce
    /// output that is no longer valid UTF-8; it exists for byte-for-byte
    /// compatibility with older helpers that behaved this way.
    FirstByte,
}

impl UnmappedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnmappedPolicy::Passthrough => "passthrough",
            UnmappedPolicy::FirstByte => "first-byte",
        }
    }
}

impl TryFrom<&str> for UnmappedPolicy {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "passthrough" => Ok(UnmappedPolicy::Passthrough),
            "first-byte" => Ok(UnmappedPolicy::FirstByte),
            other => anyhow::bail!("Unknown layout policy: {other}"),
        }
    }
}

/// Encoded length of a UTF-8 sequence, judged from its leading byte.
///
/// Stray continuation bytes and invalid leads count as one byte so the walk
/// always makes progress.
pub fn utf8_char_len(lead: u8) -> usize {
    if lead & 0x80 == 0 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

/// Look up the Latin key for one encoded character.
pub fn lookup(encoded: &[u8]) -> Option<u8> {
    RU_TO_EN
        .iter()
        .find(|(source, _)| source.as_bytes() == encoded)
        .map(|(_, target)| *target)
}

/// Transliterate with the default [`UnmappedPolicy::Passthrough`] policy.
pub fn transliterate(input: &str) -> OsString {
    transliterate_with(input, UnmappedPolicy::default())
}

pub fn transliterate_with(input: &str, policy: UnmappedPolicy) -> OsString {
    bytes_to_os(transliterate_bytes(input.as_bytes(), policy))
}

/// Byte-level transliteration; never fails and never emits more than
/// [`MAX_OUTPUT_LEN`] bytes.
pub fn transliterate_bytes(input: &[u8], policy: UnmappedPolicy) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len().min(MAX_OUTPUT_LEN));
    let mut i = 0;
    while i < input.len() && out.len() < MAX_OUTPUT_LEN {
        let len = utf8_char_len(input[i]).min(input.len() - i);
        let encoded = &input[i..i + len];
        i += len;

        if len == 1 {
            out.push(encoded[0]);
            continue;
        }
        if let Some(target) = lookup(encoded) {
            out.push(target);
            continue;
        }
        match policy {
            UnmappedPolicy::FirstByte => out.push(encoded[0]),
            UnmappedPolicy::Passthrough => {
                // A character that does not fit is dropped whole.
                if out.len() + len > MAX_OUTPUT_LEN {
                    break;
                }
                out.extend_from_slice(encoded);
            }
        }
    }
    out
}

#[cfg(unix)]
fn bytes_to_os(bytes: Vec<u8>) -> OsString {
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn bytes_to_os(bytes: Vec<u8>) -> OsString {
    OsString::from(String::from_utf8_lossy(&bytes).into_owned())
}
