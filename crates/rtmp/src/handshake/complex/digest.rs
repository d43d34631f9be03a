//! HMAC-SHA256 digest handling for the complex handshake.
//!
//! Grounded on the algorithm described at
//! <https://blog.csdn.net/win_lin/article/details/13006803> (see the parent
//! module's docs): each 1536 byte handshake packet carries two 764 byte
//! blocks, a "key" block and a "digest" block, in an order chosen by the
//! schema version. Inside the digest block, a 4 byte offset field (summed and
//! reduced modulo the available padding) locates a 32 byte HMAC-SHA256 digest
//! among surrounding random data.

use bytes::Bytes;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::ComplexHandshakeError;
use super::{RTMP_DIGEST_LENGTH, SchemaVersion};
use crate::handshake::RTMP_HANDSHAKE_SIZE;

const BLOCK_LEN: usize = 764;
const HEADER_LEN: usize = 8;

/// Computes and verifies the digest embedded in a handshake packet, and
/// produces fresh ones for outgoing packets.
pub struct DigestProcessor<'a> {
    data: Bytes,
    key: &'a [u8],
}

impl<'a> DigestProcessor<'a> {
    /// Creates a new digest processor over `data`, keyed with `key`.
    pub fn new(data: Bytes, key: &'a [u8]) -> Self {
        Self { data, key }
    }

    fn hmac(&self, data: &[u8]) -> Result<Bytes, ComplexHandshakeError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.key).map_err(|_| ComplexHandshakeError::CannotGenerate)?;
        mac.update(data);
        Ok(Bytes::copy_from_slice(&mac.finalize().into_bytes()))
    }

    /// Byte offset of the digest within a 1536 byte handshake packet, for the
    /// given schema.
    ///
    /// Schema 0 lays the packet out as `time, version, key-block,
    /// digest-block`; schema 1 swaps the two blocks. The digest sits 4 bytes
    /// into its block, offset further by the sum of those 4 bytes modulo the
    /// padding available around the 32 byte digest.
    fn digest_offset(&self, schema: SchemaVersion) -> Result<usize, ComplexHandshakeError> {
        let block_start = match schema {
            SchemaVersion::Schema0 => HEADER_LEN + BLOCK_LEN,
            SchemaVersion::Schema1 => HEADER_LEN,
        };

        let offset_bytes = self
            .data
            .get(block_start..block_start + 4)
            .ok_or(ComplexHandshakeError::NotEnoughData)?;
        let sum: usize = offset_bytes.iter().map(|&b| b as usize).sum();

        Ok(block_start + 4 + sum % (BLOCK_LEN - 4 - RTMP_DIGEST_LENGTH))
    }

    fn without_digest(data: &[u8], digest_offset: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len() - RTMP_DIGEST_LENGTH);
        out.extend_from_slice(&data[..digest_offset]);
        out.extend_from_slice(&data[digest_offset + RTMP_DIGEST_LENGTH..]);
        out
    }

    /// Locates and verifies the digest in `self.data`, trying schema 1 and
    /// then schema 0.
    ///
    /// Returns the 32 byte digest and the schema it was found under.
    pub fn read_digest(&self) -> Result<(Bytes, SchemaVersion), ComplexHandshakeError> {
        if self.data.len() < RTMP_HANDSHAKE_SIZE {
            return Err(ComplexHandshakeError::NotEnoughData);
        }

        for schema in [SchemaVersion::Schema1, SchemaVersion::Schema0] {
            let offset = self.digest_offset(schema)?;
            let Some(digest) = self.data.get(offset..offset + RTMP_DIGEST_LENGTH) else {
                continue;
            };

            let computed = self.hmac(&Self::without_digest(&self.data, offset))?;
            if computed.as_ref() == digest {
                return Ok((Bytes::copy_from_slice(digest), schema));
            }
        }

        Err(ComplexHandshakeError::UnknownSchema)
    }

    /// Generates a digest for `self.data` (which must be exactly
    /// [`RTMP_HANDSHAKE_SIZE`] bytes of freshly-written time, version and
    /// random data) under the given schema, and splits the buffer into the
    /// three parts that need to be written back to back: the bytes before the
    /// digest, the digest itself, and the bytes after it.
    pub fn generate_and_fill_digest(&self, schema: SchemaVersion) -> Result<(Bytes, Bytes, Bytes), ComplexHandshakeError> {
        if self.data.len() != RTMP_HANDSHAKE_SIZE {
            return Err(ComplexHandshakeError::DigestLengthNotCorrect);
        }

        let offset = self.digest_offset(schema)?;
        let digest = self.hmac(&Self::without_digest(&self.data, offset))?;

        Ok((self.data.slice(0..offset), digest, self.data.slice(offset + RTMP_DIGEST_LENGTH..)))
    }

    /// Computes an HMAC-SHA256 of `data` under this processor's key,
    /// optionally excluding the first occurrence of the `exclude` subslice
    /// (used when a digest placeholder is embedded in the data being hashed).
    pub fn make_digest(&self, data: &[u8], exclude: &[u8]) -> Result<Bytes, ComplexHandshakeError> {
        if exclude.is_empty() {
            return self.hmac(data);
        }

        match find_subslice(data, exclude) {
            Some(pos) => {
                let mut spliced = Vec::with_capacity(data.len() - exclude.len());
                spliced.extend_from_slice(&data[..pos]);
                spliced.extend_from_slice(&data[pos + exclude.len()..]);
                self.hmac(&spliced)
            }
            None => self.hmac(data),
        }
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    haystack.windows(needle.len()).position(|w| w == needle)
}
