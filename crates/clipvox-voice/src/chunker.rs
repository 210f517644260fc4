//! Byte-bounded text chunking
//!
//! Cloud TTS providers cap each request by UTF-8 bytes, not characters.
//! [`chunk_text`] packs whole paragraphs into chunks under that cap and only
//! cuts inside a paragraph when the paragraph alone is too large, always on a
//! character boundary.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::error::{Result, VoiceError};

/// Two or more newlines, allowing `\r` and blanks on the empty lines between them
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n[ \t\r]*\n(?:[ \t\r]*\n)*").expect("paragraph break pattern is valid")
});

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Split `text` into ordered, trimmed, non-empty chunks of at most `byte_limit` UTF-8 bytes.
///
/// Paragraphs are packed greedily, joined by a blank line. A paragraph longer
/// than the limit is sliced on character boundaries. If one character is
/// wider than the limit on its own (only possible for limits below 4 bytes),
/// it is emitted as a chunk by itself so the output stays valid UTF-8.
pub fn chunk_text(text: &str, byte_limit: usize) -> Result<Vec<String>> {
    if byte_limit == 0 {
        return Err(VoiceError::InvalidInput(
            "chunk byte limit must be positive".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    let paragraphs = PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty());

    for paragraph in paragraphs {
        if paragraph.len() > byte_limit {
            flush(&mut current, &mut chunks);
            slice_paragraph(paragraph, byte_limit, &mut chunks);
            continue;
        }

        let joined_len = if current.is_empty() {
            paragraph.len()
        } else {
            current.len() + PARAGRAPH_SEPARATOR.len() + paragraph.len()
        };

        if joined_len > byte_limit {
            flush(&mut current, &mut chunks);
        }
        if !current.is_empty() {
            current.push_str(PARAGRAPH_SEPARATOR);
        }
        current.push_str(paragraph);
    }

    flush(&mut current, &mut chunks);
    Ok(chunks)
}

fn flush(current: &mut String, chunks: &mut Vec<String>) {
    if !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
}

/// Cut an oversized paragraph into windows that each end just before the
/// first character that would push the window past `byte_limit`.
fn slice_paragraph(paragraph: &str, byte_limit: usize, chunks: &mut Vec<String>) {
    let mut rest = paragraph;

    while !rest.is_empty() {
        let mut end = 0;
        for (idx, ch) in rest.char_indices() {
            let next = idx + ch.len_utf8();
            if next > byte_limit {
                break;
            }
            end = next;
        }

        if end == 0 {
            // First character alone is wider than the limit.
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
            warn!(
                "Character of {} bytes exceeds chunk limit of {} bytes; emitting it alone",
                end, byte_limit
            );
        }

        let (window, tail) = rest.split_at(end);
        let window = window.trim();
        if !window.is_empty() {
            chunks.push(window.to_string());
        }
        rest = tail.trim_start();
    }
}
