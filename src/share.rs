//! # Share Links
//!
//! Notes travel in the URL query as `?notes=<URI-encoded JSON array>`. The
//! query of the page location is replaced wholesale, never merged, and any
//! fragment is dropped.
//!
//! [`notes_from_link`] fails closed: any undecodable payload is logged and
//! treated as "no notes". [`decode_notes`] is the strict variant.
//!
//! ```rust
//! use pianoroll::share::{notes_from_link, share_link};
//! use pianoroll::Note;
//!
//! let notes = vec![Note::new(60, 0.0, 0.5, 0)];
//! let link = share_link("https://example.org/roll?tab=1#top", &notes).unwrap();
//! assert!(link.starts_with("https://example.org/roll?notes=%5B%7B%22pitch%22%3A60"));
//! assert_eq!(notes_from_link(&link), notes);
//! assert!(notes_from_link("https://example.org/roll?notes=%5Bnope").is_empty());
//! ```

use crate::error::RollError;
use crate::note::Note;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Query parameter carrying the notes
pub const NOTES_PARAM: &str = "notes";

/// Bytes `encodeURIComponent` escapes
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `location` with its query replaced by the encoded notes
pub fn share_link(location: &str, notes: &[Note]) -> Result<String, RollError> {
    let json = serde_json::to_string(notes).map_err(|e| RollError::ShareLink(e.to_string()))?;
    let base = location
        .find(|c: char| c == '?' || c == '#')
        .map_or(location, |end| &location[..end]);
    Ok(format!(
        "{}?{}={}",
        base,
        NOTES_PARAM,
        utf8_percent_encode(&json, URI_COMPONENT)
    ))
}

/// Notes carried by a link; empty when absent or undecodable
pub fn notes_from_link(url: &str) -> Vec<Note> {
    match decode_notes(url) {
        Ok(notes) => notes,
        Err(e) => {
            log::warn!("Ignoring shared notes: {}", e);
            Vec::new()
        }
    }
}

/// Strictly decode the `notes` parameter. A link without one has no notes.
pub fn decode_notes(url: &str) -> Result<Vec<Note>, RollError> {
    let Some(raw) = query_param(url, NOTES_PARAM) else {
        return Ok(Vec::new());
    };
    let spaced = raw.replace('+', " ");
    let json = percent_decode_str(&spaced)
        .decode_utf8()
        .map_err(|e| RollError::ShareLink(format!("payload is not UTF-8: {}", e)))?;
    let notes: Vec<Note> =
        serde_json::from_str(&json).map_err(|e| RollError::ShareLink(e.to_string()))?;

    if let Some((i, note)) = notes
        .iter()
        .enumerate()
        .find(|(_, n)| !n.is_valid() || n.pitch > 127)
    {
        return Err(RollError::ShareLink(format!(
            "note {} is invalid: pitch {}, {}..{}",
            i, note.pitch, note.start, note.end
        )));
    }
    Ok(notes)
}

/// Raw (still encoded) value of the first `name` parameter in the query
fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let query = url.split_once('?')?.1;
    let query = query.split_once('#').map_or(query, |(q, _)| q);
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}
