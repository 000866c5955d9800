//! Value Codec Module
//!
//! Reversible gzip transform for binary payloads. The backing `value` column
//! is text, so compressed bytes travel base64-armored.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::cache::CacheValue;
use crate::error::{Result, StoreError};

// == Value Codec ==
/// Gzip codec applied to values flagged `compressed`.
#[derive(Debug, Clone, Copy)]
pub struct ValueCodec {
    level: Compression,
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl ValueCodec {
    /// Creates a codec with gzip level `level` (clamped to 0..=9).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    // == Compress ==
    /// Gzips raw bytes.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder
            .write_all(data)
            .map_err(|e| StoreError::Codec(format!("compression failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| StoreError::Codec(format!("compression failed: {}", e)))
    }

    // == Decompress ==
    /// Reverses [`compress`](Self::compress).
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| StoreError::Codec(format!("malformed compressed value: {}", e)))?;
        Ok(out)
    }

    // == Encode ==
    /// Produces the stored text form of a binary value.
    ///
    /// Only [`CacheValue::Binary`] is accepted.
    pub fn encode(&self, value: &CacheValue) -> Result<String> {
        match value {
            CacheValue::Binary(bytes) => Ok(STANDARD.encode(self.compress(bytes)?)),
            CacheValue::Text(_) => Err(StoreError::UnsupportedValueType(
                "only binary values can be compressed".to_string(),
            )),
        }
    }

    // == Decode ==
    /// Recovers the original bytes from a stored compressed value.
    pub fn decode(&self, stored: &str) -> Result<Vec<u8>> {
        let compressed = STANDARD
            .decode(stored.trim())
            .map_err(|e| StoreError::Codec(format!("stored value is not base64: {}", e)))?;
        self.decompress(&compressed)
    }
}
