// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Temporary on-disk staging for inbound uploads
//!
//! Every upload is written to a request-scoped file under the staging
//! directory before it is decoded. A [`StagedFile`] owns that file: dropping
//! it removes the file, so the staging directory never outlives the request
//! that filled it, whichever way the request ends.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Longest filename hint kept in a staged path
const MAX_HINT_LEN: usize = 64;

/// Hint used when the client sent no usable filename
const DEFAULT_HINT: &str = "upload";

/// Random characters appended after the request id
const RANDOM_SUFFIX_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to create staged file in {}: {source}", .dir.display())]
    Create { dir: PathBuf, source: io::Error },

    #[error("Failed to write staged file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to read staged file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to remove staged file {}: {source}", .path.display())]
    Cleanup { path: PathBuf, source: io::Error },
}

/// Directory that holds staged uploads
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Bind a staging directory without touching the filesystem
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Bind a staging directory, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StagingError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StagingError::Create {
            dir: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to a fresh file named after the request and the hint
    ///
    /// The file is created exclusively, so two requests can never share a
    /// path even when they send the same filename.
    pub fn stage(
        &self,
        request_id: &Uuid,
        filename_hint: &str,
        bytes: &[u8],
    ) -> Result<StagedFile, StagingError> {
        let hint = sanitize_filename(filename_hint);

        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", request_id))
            .suffix(&format!("-{}", hint))
            .rand_bytes(RANDOM_SUFFIX_LEN)
            .tempfile_in(&self.dir)
            .map_err(|source| StagingError::Create {
                dir: self.dir.clone(),
                source,
            })?;

        // On failure `file` is dropped here, which unlinks it.
        if let Err(source) = file.write_all(bytes).and_then(|()| file.flush()) {
            return Err(StagingError::Write {
                path: file.path().to_path_buf(),
                source,
            });
        }

        debug!(
            "Staged {} bytes for request {} at {}",
            bytes.len(),
            request_id,
            file.path().display()
        );

        Ok(StagedFile {
            file,
            size: bytes.len(),
        })
    }

    /// Number of entries currently in the staging directory
    pub fn staged_count(&self) -> io::Result<usize> {
        Ok(fs::read_dir(&self.dir)?.count())
    }
}

/// An upload held on disk for the lifetime of one request
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    size: usize,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, StagingError> {
        fs::read(self.path()).map_err(|source| StagingError::Read {
            path: self.path().to_path_buf(),
            source,
        })
    }

    /// Remove the file now and report whether removal succeeded
    pub fn remove(self) -> Result<(), StagingError> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|source| StagingError::Cleanup { path, source })
    }
}

/// Reduce a client-supplied filename to a safe path component
pub fn sanitize_filename(hint: &str) -> String {
    let name = Path::new(hint)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_HINT_LEN)
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        DEFAULT_HINT.to_string()
    } else {
        cleaned
    }
}
