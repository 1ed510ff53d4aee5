use std::future::Future;
use std::io;
use std::path::PathBuf;

use shared::candidate::Candidate;
use validator::Validate;

use crate::error::LoadError;

/// Where the raw candidate document comes from.
pub trait ByteSource {
    fn read_all(&self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    fn describe(&self) -> String;
}

/// A JSON document on disk, e.g. a bundled `cocktails.json`
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ByteSource for FileSource {
    async fn read_all(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Bytes already in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }
}

impl ByteSource for MemorySource {
    async fn read_all(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} bytes)", self.bytes.len())
    }
}

/// Parses a JSON array of candidates. One bad entry rejects the whole document.
pub fn decode_candidates(bytes: &[u8]) -> Result<Vec<Candidate>, LoadError> {
    let candidates: Vec<Candidate> = serde_json::from_slice(bytes)?;
    validate_candidates(&candidates)?;
    Ok(candidates)
}

pub fn validate_candidates(candidates: &[Candidate]) -> Result<(), LoadError> {
    for candidate in candidates {
        candidate.validate()?;
    }
    Ok(())
}
