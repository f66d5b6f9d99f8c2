//! Minimal contract ABI support.
//!
//! Only what the three oracle contracts need: Keccak-derived function
//! selectors and event topics, call data for zero-argument and
//! single-string-argument entry points, and decoding of a single
//! non-indexed string event parameter.

use anyhow::{Context, Result, bail};
use sha3::{Digest, Keccak256};

/// Word size of the contract ABI.
const WORD: usize = 32;

/// Computes the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Returns the 4-byte function selector for a canonical signature,
/// e.g. `query(string)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Returns the topic-0 hash for a canonical event signature as a
/// 0x-prefixed hex string, e.g. `newDieselPrice(string)`.
pub fn event_topic(signature: &str) -> String {
    format!("0x{}", hex::encode(keccak256(signature.as_bytes())))
}

/// Encodes a call with no arguments: just the selector.
pub fn encode_call(selector: [u8; 4]) -> String {
    format!("0x{}", hex::encode(selector))
}

/// Encodes a call with a single dynamic string argument.
///
/// Layout: selector, then one head word holding the offset of the tail
/// (always 0x20 for a single argument), then the length word, then the
/// UTF-8 bytes padded to a word boundary.
pub fn encode_call_string(selector: [u8; 4], arg: &str) -> String {
    let bytes = arg.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;

    let mut data = Vec::with_capacity(4 + WORD * 2 + padded_len);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&encode_word(WORD as u64));
    data.extend_from_slice(&encode_word(bytes.len() as u64));
    data.extend_from_slice(bytes);
    data.resize(4 + WORD * 2 + padded_len, 0);

    format!("0x{}", hex::encode(data))
}

/// Decodes a log's data field holding a single non-indexed string.
///
/// # Errors
/// Returns an error if the data is not well-formed ABI.
pub fn decode_string(data: &str) -> Result<String> {
    let raw = hex::decode(data.strip_prefix("0x").unwrap_or(data))
        .context("event data is not valid hex")?;

    let offset = decode_word(&raw, 0).context("event data missing offset word")?;
    let len = decode_word(&raw, offset).context("event data missing length word")?;

    let start = offset
        .checked_add(WORD)
        .filter(|s| s.checked_add(len).is_some_and(|end| end <= raw.len()))
        .with_context(|| format!("string of length {len} overruns event data"))?;

    String::from_utf8(raw[start..start + len].to_vec()).context("event string is not UTF-8")
}

fn encode_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

fn decode_word(raw: &[u8], at: usize) -> Result<usize> {
    let Some(word) = raw.get(at..at + WORD) else {
        bail!("data truncated at byte {at}");
    };
    // Values beyond usize never occur in well-formed oracle payloads.
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        bail!("oversized ABI word at byte {at}");
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(tail)).context("ABI word exceeds usize")
}
