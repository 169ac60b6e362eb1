//! Turns raw technical names (folders, executables, ROM stems) into search
//! terms.
//!
//! The steps run in a fixed order and each one depends on the previous:
//!
//! 1. strip trailing build/platform suffix tokens (`-x64`, `_DX12`, `.gog`)
//! 2. strip trailing `(YYYY)` year tags
//! 3. split camelCase (`HollowKnight` -> `Hollow Knight`)
//! 4. split ALLCAPS runs from a Titlecase word (`XMLParser` -> `XML Parser`)
//! 5. `_`, `-` and `.` become spaces
//! 6. collapse whitespace and trim
//!
//! Steps 1 and 2 repeat until nothing more matches so the output is a fixed
//! point: `normalize(normalize(x)) == normalize(x)`.

use regex::Regex;
use std::sync::OnceLock;

/// Trailing tokens that describe a build rather than a title.
pub const BUILD_SUFFIXES: &[&str] = &[
    "x86_64", "x64", "x86", "amd64", "arm64", "win64", "win32", "linux", "64bit", "32bit",
    "dx9", "dx10", "dx11", "dx12", "d3d11", "d3d12", "vulkan", "vk", "opengl", "gl",
    "shipping", "release", "retail", "debug", "steam", "gog", "epic", "goty", "portable",
];

fn suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let mut tokens: Vec<&str> = BUILD_SUFFIXES.to_vec();
        // Longest first so `x86_64` wins over `x86`.
        tokens.sort_by_key(|t| std::cmp::Reverse(t.len()));
        let alternation = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)[-_.](?:{})[-_.\s]*$", alternation)).unwrap()
    })
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:[\s_.\-]*\(\d{4}\))+[\s_.\-]*$").unwrap())
}

fn camel_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z])([A-Z])").unwrap())
}

fn acronym_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap())
}

/// Removes every trailing build suffix and year tag.
fn strip_trailing_tags(raw: &str) -> String {
    let mut s = raw.to_string();
    loop {
        let stripped = suffix_regex().replace(&s, "");
        let stripped = year_regex().replace(&stripped, "").into_owned();
        if stripped == s {
            return s;
        }
        s = stripped;
    }
}

/// Cleans a raw technical name into a search string.
pub fn normalize(raw: &str) -> String {
    let s = strip_trailing_tags(raw);
    let s = camel_regex().replace_all(&s, "$1 $2");
    let s = acronym_regex().replace_all(&s, "$1 $2");
    let s = s.replace(['_', '-', '.'], " ");
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalizes the first letter of every word and lowercases the rest.
///
/// A "word" starts at any letter not preceded by another letter, so
/// `portal 2` becomes `Portal 2` and `DOOM` becomes `Doom`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
