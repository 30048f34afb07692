//! Event filename derivation and sanitization.
//!
//! An event file is named `event-<id>.txt`, where `<id>` is the first match
//! of the configured task pattern in the video path, or the video's file
//! stem. Ids that are already filesystem-safe are used verbatim so existing
//! event files keep matching; anything else is transliterated and cleaned.

use std::path::Path;

use deunicode::deunicode;
use regex::Regex;

/// Prefix of every event file name.
pub const EVENT_PREFIX: &str = "event-";

/// Extension of every event file name.
pub const EVENT_EXTENSION: &str = ".txt";

/// Windows reserved device names that cannot be used as filenames.
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters that are invalid in filenames on common filesystems.
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Fallback id when sanitization produces an empty result.
const FALLBACK_ID: &str = "video";

/// Maximum filename length for most filesystems.
const MAX_FILENAME_LENGTH: usize = 255;

/// Longest id that still fits `event-<id>.txt` in a filename.
const MAX_ID_LENGTH: usize = MAX_FILENAME_LENGTH - EVENT_PREFIX.len() - EVENT_EXTENSION.len();

/// Sanitizes a string for use in filenames.
///
/// Applies the following transformations in order:
/// 1. Unicode → ASCII transliteration
/// 2. Whitespace → hyphens
/// 3. Invalid filesystem characters removed
/// 4. Multiple hyphens collapsed to single
/// 5. Leading/trailing dots, spaces, hyphens trimmed
/// 6. Windows reserved names prefixed with `_`
/// 7. Empty results → "video" fallback
pub fn sanitize(input: &str) -> String {
    let ascii = deunicode(input);

    let mut result = String::with_capacity(ascii.len());
    let mut last_was_hyphen = false;

    for c in ascii.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_was_hyphen {
                result.push('-');
                last_was_hyphen = true;
            }
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            result.push(c);
            last_was_hyphen = false;
        }
        // Invalid filesystem characters, brackets and other symbols are dropped
    }

    let trimmed = trim_edges(&result);
    let final_name = handle_reserved_name(&trimmed);
    if final_name.is_empty() {
        FALLBACK_ID.to_string()
    } else {
        final_name
    }
}

/// True if `id` can be used in a filename as it is.
fn is_safe(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LENGTH
        && id.chars().all(|c| c == ' ' || c.is_ascii_graphic())
        && !id.contains(INVALID_CHARS)
        && trim_edges(id) == id
        && handle_reserved_name(id) == id
}

/// Derive the event id for `video`.
///
/// Uses the first match of `task_pattern` anywhere in the path, else the
/// file stem.
pub fn derive_event_id(video: &Path, task_pattern: Option<&Regex>) -> String {
    let matched = task_pattern.and_then(|re| {
        re.find(&video.to_string_lossy())
            .map(|m| m.as_str().to_string())
    });
    let raw = matched.unwrap_or_else(|| {
        video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    if is_safe(&raw) {
        raw
    } else {
        truncate_to_length(&sanitize(&raw), MAX_ID_LENGTH)
    }
}

/// True if `video` matches `task_pattern`.
pub fn matches_task(video: &Path, task_pattern: &Regex) -> bool {
    task_pattern.is_match(&video.to_string_lossy())
}

/// `event-<id>.txt`
pub fn event_filename(id: &str) -> String {
    format!("{}{}{}", EVENT_PREFIX, id, EVENT_EXTENSION)
}

/// True for names of the form `event-*.txt`.
pub fn is_event_filename(name: &str) -> bool {
    name.len() > EVENT_PREFIX.len() + EVENT_EXTENSION.len()
        && name.starts_with(EVENT_PREFIX)
        && name.ends_with(EVENT_EXTENSION)
}

/// Trims leading and trailing dots, spaces, and hyphens.
fn trim_edges(s: &str) -> String {
    s.trim_matches(|c| c == '.' || c == ' ' || c == '-')
        .to_string()
}

/// Truncates a string to the specified length.
fn truncate_to_length(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Checks if a name is a Windows reserved name and prefixes it if so.
///
/// Handles both exact matches (CON) and names with extensions (CON.txt).
fn handle_reserved_name(name: &str) -> String {
    let base_name = match name.find('.') {
        Some(pos) => &name[..pos],
        None => name,
    };
    let upper = base_name.to_uppercase();
    if WINDOWS_RESERVED.contains(&upper.as_str()) {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}
