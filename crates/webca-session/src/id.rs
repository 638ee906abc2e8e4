//! Session identifier generation.

use std::io;
use std::sync::Arc;

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Number of random bytes in a session identifier.
pub const ID_BYTES: usize = 16;

/// Source of random bytes for identifiers.
///
/// Returns the number of bytes written into `dest`, like [`io::Read::read`].
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> io::Result<usize>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> io::Result<usize> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(dest.len())
    }
}

/// Generates random UUID-shaped session identifiers.
#[derive(Clone)]
pub struct IdGenerator {
    source: Arc<dyn EntropySource>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_source(OsEntropy)
    }

    pub fn with_source(source: impl EntropySource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Generate a 32-character lowercase hex identifier.
    ///
    /// Fails if the source errors or yields fewer than 16 bytes; there is no
    /// fallback to a weaker generator.
    pub fn generate(&self) -> Result<String> {
        let mut bytes = [0u8; ID_BYTES];
        let n = self
            .source
            .fill(&mut bytes)
            .map_err(|e| Error::Entropy(e.to_string()))?;
        if n != ID_BYTES {
            return Err(Error::Entropy(format!(
                "short read: {n} of {ID_BYTES} bytes"
            )));
        }

        // Version 4 nibble at byte 6 (RFC 4122) and at byte 4, where
        // previously issued identifiers carried it.
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[4] = (bytes[4] & 0x0f) | 0x40;
        // Variant 1 (10xx xxxx).
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        Ok(hex::encode(bytes))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}
