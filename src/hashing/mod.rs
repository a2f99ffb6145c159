//! Question fingerprints used as answer-cache keys.
//!
//! A fingerprint is the BLAKE3 digest of the normalized question (trimmed, lower-cased),
//! rendered as 64 lowercase hex characters. Two questions that differ only in surrounding
//! whitespace or letter case share a fingerprint; anything else does not.
//!
//! # Collision Tolerance
//!
//! BLAKE3 gives ~128 bits of collision resistance, so distinct questions sharing a key is
//! not a practical concern. If it ever happened the cache would treat them as the same
//! question; nothing downstream tries to detect it.

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Normalizes a question for keying: trims surrounding whitespace and lower-cases it.
///
/// Interior whitespace is preserved.
#[inline]
pub fn normalize_question(question: &str) -> String {
    question.trim().to_lowercase()
}

/// Returns the raw 32-byte BLAKE3 digest of the normalized question.
#[inline]
pub fn hash_question(question: &str) -> [u8; 32] {
    *blake3::hash(normalize_question(question).as_bytes()).as_bytes()
}

/// Returns the cache key for `question` as a fixed-length hex digest.
#[inline]
pub fn cache_key(question: &str) -> String {
    blake3::hash(normalize_question(question).as_bytes())
        .to_hex()
        .to_string()
}

/// Fingerprints a corpus build from its `(page_number, chunk_index, text)` records, so
/// artifacts written by one build can be told apart from another's.
pub fn hash_corpus<'a, I>(records: I) -> [u8; 32]
where
    I: IntoIterator<Item = (u32, u32, &'a str)>,
{
    let mut hasher = blake3::Hasher::new();
    for (page_number, chunk_index, text) in records {
        hasher.update(&page_number.to_le_bytes());
        hasher.update(&chunk_index.to_le_bytes());
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    *hasher.finalize().as_bytes()
}
