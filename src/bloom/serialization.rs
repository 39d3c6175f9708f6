// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Persistence codec.
//!
//! Byte layout, all integers little-endian, fixed order:
//!
//! | field            | width            |
//! |------------------|------------------|
//! | `bit_count` (m)  | u64              |
//! | `hash_count` (k) | u32              |
//! | `seed`           | u64              |
//! | bit array        | `ceil(m/8)` bytes|
//! | `inserted_count` | u64              |
//!
//! The bit array length is implied by `bit_count`; a stream shorter than the
//! header promises, or whose fields are internally inconsistent, is rejected
//! as corrupt and produces no filter.

use std::io;
use std::io::Read;
use std::io::Write;

use byteorder::LittleEndian;
use byteorder::ReadBytesExt;

use super::bit_array::BitArray;
use super::builder::MAX_NUM_BITS;
use super::builder::MAX_NUM_HASHES;
use super::builder::MIN_NUM_BITS;
use super::builder::MIN_NUM_HASHES;
use super::filter::BloomFilter;
use crate::error::Error;
use crate::hash::HashFamily;

/// bit_count (u64) + hash_count (u32) + seed (u64).
const HEADER_BYTES: usize = 20;
/// Trailing insert-operation counter (u64).
const TRAILER_BYTES: usize = 8;

impl BloomFilter {
    /// Serializes the filter to a byte vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitsieve::{BloomFilter, BloomFilterBuilder};
    ///
    /// let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();
    /// filter.insert(b"test");
    ///
    /// let bytes = filter.to_bytes();
    /// let restored = BloomFilter::from_bytes(&bytes).unwrap();
    /// assert_eq!(restored, filter);
    /// assert!(restored.contains(b"test"));
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(HEADER_BYTES + self.size_in_bytes() + TRAILER_BYTES);
        bytes.extend_from_slice(&self.bit_count().to_le_bytes());
        bytes.extend_from_slice(&self.hash_count().to_le_bytes());
        bytes.extend_from_slice(&self.seed().to_le_bytes());
        bytes.extend_from_slice(self.bits.as_bytes());
        bytes.extend_from_slice(&self.element_count().to_le_bytes());
        bytes
    }

    /// Writes the complete encoding to `sink` in a single call.
    ///
    /// Either the whole buffer is handed to the sink or the write fails;
    /// callers needing crash atomicity on disk should write to a temporary
    /// file and rename.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the sink; the filter itself cannot fail
    /// to encode.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&self.to_bytes())
    }

    /// Reads a filter from `source`, consuming exactly one encoding.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::error::ErrorKind::CorruptData`] if the stream ends
    /// before the layout is complete, if the encoded sizing fields are out of
    /// range, or if padding bits past the bit count are set. No filter is
    /// produced on failure.
    pub fn read_from<R: Read>(source: &mut R) -> Result<Self, Error> {
        let bit_count = source
            .read_u64::<LittleEndian>()
            .map_err(|e| read_failed("bit_count", e))?;
        let hash_count = source
            .read_u32::<LittleEndian>()
            .map_err(|e| read_failed("hash_count", e))?;
        let seed = source
            .read_u64::<LittleEndian>()
            .map_err(|e| read_failed("seed", e))?;

        if !(MIN_NUM_BITS..=MAX_NUM_BITS).contains(&bit_count) {
            return Err(Error::corrupt_data("encoded bit count is out of range")
                .with_context("bit_count", bit_count));
        }
        if !(MIN_NUM_HASHES..=MAX_NUM_HASHES).contains(&hash_count) {
            return Err(Error::corrupt_data("encoded hash count is out of range")
                .with_context("hash_count", hash_count));
        }

        let mut payload = vec![0u8; bit_count.div_ceil(8) as usize];
        source
            .read_exact(&mut payload)
            .map_err(|e| read_failed("bit_array", e))?;
        let bits = BitArray::from_bytes(bit_count, payload)?;

        let inserted_count = source
            .read_u64::<LittleEndian>()
            .map_err(|e| read_failed("inserted_count", e))?;

        Ok(BloomFilter {
            hashes: HashFamily::new(seed),
            num_hashes: hash_count,
            inserted_count,
            bits,
        })
    }

    /// Deserializes a filter from a byte slice.
    ///
    /// Behaves like [`read_from()`](Self::read_from) and additionally rejects
    /// trailing bytes after the encoding.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::error::ErrorKind::CorruptData`] under the
    /// [`read_from()`](Self::read_from) conditions or when `bytes` is longer
    /// than one encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = io::Cursor::new(bytes);
        let filter = Self::read_from(&mut cursor)?;

        if cursor.position() != bytes.len() as u64 {
            return Err(Error::corrupt_data("trailing bytes after encoded filter")
                .with_context("encoded_len", cursor.position())
                .with_context("buffer_len", bytes.len()));
        }
        Ok(filter)
    }
}

fn read_failed(field: &'static str, source: io::Error) -> Error {
    let message = if source.kind() == io::ErrorKind::UnexpectedEof {
        "serialized filter is truncated"
    } else {
        "failed to read serialized filter"
    };
    Error::corrupt_data(message)
        .with_context("field", field)
        .set_source(source)
}

#[cfg(test)]
mod tests {
    use crate::bloom::BloomFilter;
    use crate::bloom::BloomFilterBuilder;
    use crate::error::ErrorKind;

    #[test]
    fn test_round_trip_preserves_element_count() {
        let mut filter = BloomFilterBuilder::with_size(100, 3).seed(11).build().unwrap();
        filter.insert(b"a");
        filter.insert(b"a");

        let restored = BloomFilter::from_bytes(&filter.to_bytes()).unwrap();
        assert_eq!(restored, filter);
        assert_eq!(restored.element_count(), 2);
    }

    #[test]
    fn test_encoded_length_matches_layout() {
        let filter = BloomFilterBuilder::with_size(12, 2).build().unwrap();
        // 20-byte header, 2 payload bytes for 12 bits, 8-byte trailer.
        assert_eq!(filter.to_bytes().len(), 30);
    }

    #[test]
    fn test_every_truncation_is_rejected() {
        let mut filter = BloomFilterBuilder::with_size(64, 3).build().unwrap();
        filter.insert(b"pear");
        let bytes = filter.to_bytes();

        for cut in 0..bytes.len() {
            let err = BloomFilter::from_bytes(&bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::CorruptData, "prefix of {cut} bytes");
        }
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let filter = BloomFilterBuilder::with_size(64, 3).build().unwrap();
        let mut bytes = filter.to_bytes();
        bytes.push(0);

        let err = BloomFilter::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }
}
