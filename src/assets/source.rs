use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use base64::Engine;

use crate::foundation::error::{MotionError, MotionResult};

/// Where image and font bytes come from.
///
/// `data:` URIs never reach an implementation; [`load_bytes`] decodes them inline.
pub trait AssetSource {
    /// Read the bytes behind a non-`data:` source string.
    fn read(&self, src: &str) -> MotionResult<Vec<u8>>;
}

/// Reads sources as paths relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    /// Resolve sources under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsAssetSource {
    fn read(&self, src: &str) -> MotionResult<Vec<u8>> {
        let rel = normalize_rel_path(src)?;
        let path = self.root.join(&rel);
        let bytes =
            std::fs::read(&path).with_context(|| format!("read asset '{}'", path.display()))?;
        Ok(bytes)
    }
}

/// In-memory source keyed by the exact source string.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `src`.
    pub fn insert(&mut self, src: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(src.into(), bytes);
    }
}

impl AssetSource for MemoryAssetSource {
    fn read(&self, src: &str) -> MotionResult<Vec<u8>> {
        self.entries
            .get(src)
            .cloned()
            .ok_or_else(|| MotionError::asset(format!("no asset registered for '{src}'")))
    }
}

/// Resolve `src` to bytes: `data:` URIs inline, everything else through `source`.
pub fn load_bytes(src: &str, source: &dyn AssetSource) -> MotionResult<Vec<u8>> {
    match src.trim().strip_prefix("data:") {
        Some(rest) => decode_data_uri(rest),
        None => source.read(src),
    }
}

fn decode_data_uri(rest: &str) -> MotionResult<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| MotionError::asset("data URI is missing ','"))?;
    if meta.ends_with(";base64") {
        return base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| MotionError::asset(format!("data URI base64 payload: {e}")));
    }
    Ok(percent_decode(payload))
}

fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(v) = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
        {
            out.push(v);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Normalize and validate a document-relative asset path.
///
/// The result uses `/` separators and drops `.` segments. Absolute paths and parent traversals
/// (`..`) are rejected.
pub(crate) fn normalize_rel_path(source: &str) -> MotionResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MotionError::validation("asset paths must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MotionError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MotionError::validation("asset path must contain a file name"));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
