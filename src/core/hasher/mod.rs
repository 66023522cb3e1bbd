//! # Hasher Module
//!
//! Computes content digests of files with bounded memory.
//!
//! ## How It Works
//! 1. Open the file and read it in fixed-size chunks (4096 bytes by default)
//! 2. Feed each chunk into a running MD5 context
//! 3. After every chunk, hand the chunk length to the caller, which updates
//!    progress and may ask to stop
//!
//! Only one chunk buffer is held at a time, whatever the file size.
//!
//! ## Example
//! ```rust,ignore
//! use dupe_finder::core::hasher::StreamingHasher;
//!
//! let hasher = StreamingHasher::default();
//! let digest = hasher.digest(&path)?;
//! println!("{}", digest);
//! ```

mod digest;

pub use digest::{Digest, ParseDigestError, DIGEST_LEN};

use crate::error::HashError;
use std::fs::File;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::ops::ControlFlow;
use std::path::Path;

/// Default read size for one chunk
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(4096) {
    Some(size) => size,
    None => unreachable!(),
};

/// Streaming MD5 hasher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingHasher {
    chunk_size: NonZeroUsize,
}

impl StreamingHasher {
    /// Create a hasher that reads `chunk_size` bytes at a time
    pub fn new(chunk_size: NonZeroUsize) -> Self {
        Self { chunk_size }
    }

    /// Bytes read per chunk
    pub fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    /// Digest a file without progress reporting
    pub fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        self.digest_with(path, |_| ControlFlow::Continue(()))
    }

    /// Digest a file, calling `on_chunk` with the length of every chunk read
    ///
    /// Returning `ControlFlow::Break` from `on_chunk` stops the read and
    /// yields `HashError::Cancelled`.
    pub fn digest_with<F>(&self, path: &Path, on_chunk: F) -> Result<Digest, HashError>
    where
        F: FnMut(usize) -> ControlFlow<()>,
    {
        let file = File::open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.digest_reader(file, path, on_chunk)
    }

    /// Digest any reader; `path` is only used in errors
    pub fn digest_reader<R, F>(
        &self,
        mut reader: R,
        path: &Path,
        mut on_chunk: F,
    ) -> Result<Digest, HashError>
    where
        R: Read,
        F: FnMut(usize) -> ControlFlow<()>,
    {
        let mut context = md5::Context::new();
        let mut buffer = vec![0u8; self.chunk_size.get()];

        loop {
            let len = read_chunk(&mut reader, &mut buffer).map_err(|source| HashError::Read {
                path: path.to_path_buf(),
                source,
            })?;

            if len == 0 {
                break;
            }

            context.consume(&buffer[..len]);

            if on_chunk(len).is_break() {
                return Err(HashError::Cancelled {
                    path: path.to_path_buf(),
                });
            }

            if len < buffer.len() {
                break;
            }
        }

        Ok(context.compute().into())
    }
}

impl Default for StreamingHasher {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

/// Fill `buffer` unless the reader hits end of file first
///
/// Short reads from the OS are stitched together so chunk boundaries fall at
/// exact multiples of the chunk size.
fn read_chunk<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
