use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Resolves `tokenizer.json` from a model directory, the file itself, or a sibling file.
pub fn tokenizer_file(model_path: &Path) -> io::Result<PathBuf> {
    if model_path.file_name() == Some(OsStr::new("tokenizer.json")) {
        return Ok(model_path.to_path_buf());
    }
    if model_path.is_dir() {
        return Ok(model_path.join("tokenizer.json"));
    }
    model_path
        .parent()
        .map(|dir| dir.join("tokenizer.json"))
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "model path has no parent"))
}

/// Loads a tokenizer as configured in its `tokenizer.json`.
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    let path = tokenizer_file(model_path)?;
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("tokenizer not found: {}", path.display()),
        ));
    }
    Tokenizer::from_file(&path).map_err(io::Error::other)
}

/// Loads a tokenizer for batched model input.
///
/// Sequences (or sequence pairs) longer than `max_len` are truncated and every batch is
/// padded to its longest member, so the attention mask marks the real tokens.
pub fn load_tokenizer_for_batches(model_path: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let mut tokenizer = load_tokenizer(model_path)?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            ..Default::default()
        }))
        .map_err(|e| io::Error::other(format!("failed to configure truncation: {}", e)))?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));

    Ok(tokenizer)
}
