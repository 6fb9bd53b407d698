//! Header and message parsing for `git show --pretty=medium` output.
//!
//! Parsing never fails: missing or malformed fields come back as empty
//! strings and undecodable bytes are replaced with `?`.

use std::sync::OnceLock;

use regex::bytes::Regex;

/// Fields recovered from one commit's patch text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitMetadata {
    pub author: String,
    pub date: String,
    pub subject: String,
    /// Raw, possibly abbreviated, token from the last "reverts" marker
    pub reverts: Option<String>,
}

fn author_email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?-u)^.*<(.+@.+)>$").expect("valid author regex"))
}

fn revert_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?-u:\b)reverts\s+(?:commit\s+)?([0-9a-f]{4,64})(?-u:\b)")
            .expect("valid revert regex")
    })
}

/// Extract author, date, subject and revert marker from a patch.
pub fn extract(patch: &[u8]) -> CommitMetadata {
    let mut lines = patch.split(|&b| b == b'\n').map(trim_line_end);

    let mut author: &[u8] = b"";
    let mut date: &[u8] = b"";

    // Header runs up to the first blank line
    for line in lines.by_ref() {
        if line.trim_ascii().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix(b"Author:") {
            author = value.trim_ascii();
        } else if let Some(value) = line.strip_prefix(b"Date:") {
            date = value.trim_ascii();
        }
    }

    // Message lines are indented by four spaces; the diff starts at the
    // first non-blank line without that indent
    let mut subject: Option<&[u8]> = None;
    let mut reverts = None;
    for line in lines {
        let Some(text) = line.strip_prefix(b"    ") else {
            if line.trim_ascii().is_empty() {
                continue;
            }
            break;
        };
        if subject.is_none() && !text.trim_ascii().is_empty() {
            subject = Some(text.trim_ascii());
        }
        if let Some(token) = find_revert_token(text) {
            reverts = Some(token);
        }
    }

    CommitMetadata {
        author: author_display(author),
        date: normalize_date(&decode_lossy(date)),
        subject: decode_lossy(subject.unwrap_or_default()),
        reverts,
    }
}

/// Prefer the email between angle brackets, else the raw author field
fn author_display(author: &[u8]) -> String {
    let value = author_email_regex()
        .captures(author)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_bytes())
        .unwrap_or(author);
    decode_lossy(value)
}

/// Drop a trailing `+hhmm`/`-hhmm` offset from a git date
pub fn normalize_date(date: &str) -> String {
    let date = date.trim();
    match date.rsplit_once(' ') {
        Some((rest, offset)) if is_utc_offset(offset) => rest.trim_end().to_string(),
        _ => date.to_string(),
    }
}

fn is_utc_offset(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 5
        && matches!(bytes[0], b'+' | b'-')
        && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// Last "reverts [commit] <hash>" token on a message line
fn find_revert_token(text: &[u8]) -> Option<String> {
    revert_regex()
        .captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| decode_lossy(m.as_bytes()))
}

/// UTF-8 decode that never fails; invalid sequences become `?`
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\u{FFFD}', "?")
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
