//! Metadata document decoder
//!
//! Best-effort scrape rather than a full parse: the document may be
//! truncated or hand-edited, so every `"frequency"` tag is read on its own
//! and cross-checked against the nearest `"byte"` tag around it.

use std::path::Path;

use log::debug;

use super::table::parse_hex_byte;
use super::{non_empty, read_text, ArtifactDecoder, ArtifactKind};
use crate::codec::{self, DecodeParams};
use crate::error::Result;
use crate::sequence::RecoveredSequence;

const FREQUENCY_TAG: &[u8] = b"\"frequency\"";
const BYTE_TAG: &[u8] = b"\"byte\"";

/// How far before a frequency tag to look for its byte tag
const SEARCH_BEFORE: usize = 200;
/// How far after a frequency tag to look for its byte tag
const SEARCH_AFTER: usize = 100;

const CONFIDENCE_CONFIRMED: f64 = 1.0;
const CONFIDENCE_UNCONFIRMED: f64 = 0.8;

#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataDecoder;

impl MetadataDecoder {
    /// Decode a metadata document held in memory
    pub fn decode_str(&self, text: &str, params: &DecodeParams) -> Result<RecoveredSequence> {
        let doc = text.as_bytes();
        let mut seq = RecoveredSequence::new();

        for tag_pos in find_all(doc, FREQUENCY_TAG) {
            let Some(frequency) = value_after_tag(doc, tag_pos + FREQUENCY_TAG.len())
                .and_then(leading_number)
            else {
                debug!("Unparsable frequency at offset {}", tag_pos);
                continue;
            };

            let byte = codec::decode(frequency, params);
            let confidence = match nearest_byte_tag(doc, tag_pos) {
                Some(tagged) if tagged == byte => CONFIDENCE_CONFIRMED,
                Some(tagged) => {
                    debug!(
                        "Byte tag 0x{:02X} disagrees with {:.2} Hz (0x{:02X})",
                        tagged, frequency, byte
                    );
                    CONFIDENCE_UNCONFIRMED
                }
                None => CONFIDENCE_UNCONFIRMED,
            };

            seq.push(byte, frequency, confidence);
        }

        debug!("Metadata document yielded {} samples", seq.len());
        non_empty(seq, ArtifactKind::Metadata)
    }
}

impl ArtifactDecoder for MetadataDecoder {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Metadata
    }

    fn decode(&self, path: &Path, params: &DecodeParams) -> Result<RecoveredSequence> {
        self.decode_str(&read_text(path)?, params)
    }
}

/// Offsets of every occurrence of `needle`
fn find_all<'a>(haystack: &'a [u8], needle: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(move |(_, w)| *w == needle)
        .map(|(i, _)| i)
}

/// The text after `key": `, skipping whitespace around the colon
fn value_after_tag(doc: &[u8], mut pos: usize) -> Option<&[u8]> {
    while pos < doc.len() && doc[pos].is_ascii_whitespace() {
        pos += 1;
    }
    if doc.get(pos) != Some(&b':') {
        return None;
    }
    pos += 1;
    while pos < doc.len() && doc[pos].is_ascii_whitespace() {
        pos += 1;
    }
    Some(&doc[pos..])
}

/// Parse the numeric literal at the start of `text`
fn leading_number(text: &[u8]) -> Option<f64> {
    let end = text
        .iter()
        .position(|&c| !(c.is_ascii_digit() || matches!(c, b'.' | b'-' | b'+' | b'e' | b'E')))
        .unwrap_or(text.len());
    std::str::from_utf8(&text[..end])
        .ok()?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Byte value of the `"byte"` tag closest to the frequency tag at `anchor`
fn nearest_byte_tag(doc: &[u8], anchor: usize) -> Option<u8> {
    let start = anchor.saturating_sub(SEARCH_BEFORE);
    let end = (anchor + SEARCH_AFTER).min(doc.len());
    let window = &doc[start..end];

    find_all(window, BYTE_TAG)
        .filter_map(|offset| {
            let pos = start + offset;
            let value = value_after_tag(doc, pos + BYTE_TAG.len())?;
            Some((pos.abs_diff(anchor), quoted_hex(value)?))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, byte)| byte)
}

/// Parse `"0xHH"` at the start of `text`
fn quoted_hex(text: &[u8]) -> Option<u8> {
    let inner = text.strip_prefix(b"\"")?;
    let close = inner.iter().position(|&c| c == b'"')?;
    parse_hex_byte(std::str::from_utf8(&inner[..close]).ok()?)
}
