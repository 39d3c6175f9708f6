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

use crate::error::Error;

/// Fixed-capacity bit storage packed into bytes.
///
/// Holds `num_bits` logical bits in `ceil(num_bits / 8)` bytes, all zero by
/// default. Padding bits past `num_bits` in the final byte stay zero; that
/// invariant is enforced when an array is rebuilt from raw bytes so byte-wise
/// equality and bit-wise equality coincide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BitArray {
    num_bits: u64,
    num_bits_set: u64,
    bytes: Vec<u8>,
}

impl BitArray {
    /// Creates an all-zero array of `num_bits` bits.
    pub fn new(num_bits: u64) -> Self {
        debug_assert!(num_bits > 0);
        Self {
            num_bits,
            num_bits_set: 0,
            bytes: vec![0u8; num_bits.div_ceil(8) as usize],
        }
    }

    /// Rebuilds an array from its packed byte representation.
    ///
    /// Fails with [`crate::error::ErrorKind::CorruptData`] if `bytes` is not
    /// exactly `ceil(num_bits / 8)` long or if any padding bit past
    /// `num_bits` is set.
    pub fn from_bytes(num_bits: u64, bytes: Vec<u8>) -> Result<Self, Error> {
        let expected_len = num_bits.div_ceil(8) as usize;
        if bytes.len() != expected_len {
            return Err(Error::corrupt_data("bit array length does not match bit count")
                .with_context("expected_bytes", expected_len)
                .with_context("actual_bytes", bytes.len()));
        }

        let tail_bits = (num_bits % 8) as u32;
        if tail_bits != 0 {
            let padding_mask = !0u8 << tail_bits;
            let last = bytes[expected_len - 1];
            if last & padding_mask != 0 {
                return Err(Error::corrupt_data("padding bits past the bit count are set")
                    .with_context("last_byte", format!("{last:#04x}")));
            }
        }

        let num_bits_set = bytes.iter().map(|byte| u64::from(byte.count_ones())).sum();
        Ok(Self {
            num_bits,
            num_bits_set,
            bytes,
        })
    }

    /// Total number of logical bits.
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    /// Size of the backing storage in bytes.
    pub fn num_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Number of bits currently set to 1.
    pub fn num_bits_set(&self) -> u64 {
        self.num_bits_set
    }

    /// Gets the value of a single bit.
    pub fn get(&self, index: u64) -> bool {
        assert!(index < self.num_bits, "bit index out of range");
        let byte_index = (index / 8) as usize;
        let mask = 1u8 << (index % 8);
        (self.bytes[byte_index] & mask) != 0
    }

    /// Sets a single bit, returning whether it was newly set. Setting an
    /// already-set bit is a no-op.
    pub fn set(&mut self, index: u64) -> bool {
        assert!(index < self.num_bits, "bit index out of range");
        let byte_index = (index / 8) as usize;
        let mask = 1u8 << (index % 8);

        if (self.bytes[byte_index] & mask) != 0 {
            return false;
        }
        self.bytes[byte_index] |= mask;
        self.num_bits_set += 1;
        true
    }

    /// Clears a single bit. Clearing an unset bit is a no-op.
    ///
    /// The filter is insert-only and never clears bits.
    #[allow(dead_code)]
    pub fn clear(&mut self, index: u64) {
        assert!(index < self.num_bits, "bit index out of range");
        let byte_index = (index / 8) as usize;
        let mask = 1u8 << (index % 8);

        if (self.bytes[byte_index] & mask) != 0 {
            self.bytes[byte_index] &= !mask;
            self.num_bits_set -= 1;
        }
    }

    /// The packed byte representation, one bit per slot.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_is_all_zero() {
        let bits = BitArray::new(12);
        assert_eq!(bits.num_bits(), 12);
        assert_eq!(bits.num_bytes(), 2);
        assert_eq!(bits.num_bits_set(), 0);
        for index in 0..12 {
            assert!(!bits.get(index));
        }
    }

    #[test]
    fn test_set_get_clear() {
        let mut bits = BitArray::new(64);

        assert!(bits.set(0));
        assert!(bits.set(63));
        assert!(bits.set(10));
        assert!(!bits.set(10), "setting a set bit reports no change");
        assert_eq!(bits.num_bits_set(), 3);

        assert!(bits.get(0));
        assert!(bits.get(10));
        assert!(bits.get(63));
        assert!(!bits.get(1));

        bits.clear(10);
        assert!(!bits.get(10));
        assert_eq!(bits.num_bits_set(), 2);

        bits.clear(10);
        assert_eq!(bits.num_bits_set(), 2);
    }

    #[test]
    fn test_byte_round_trip() {
        let mut bits = BitArray::new(21);
        bits.set(0);
        bits.set(7);
        bits.set(8);
        bits.set(20);

        let restored = BitArray::from_bytes(21, bits.as_bytes().to_vec()).unwrap();
        assert_eq!(restored, bits);
        assert_eq!(restored.num_bits_set(), 4);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        let err = BitArray::from_bytes(21, vec![0u8; 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);

        let err = BitArray::from_bytes(21, vec![0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }

    #[test]
    fn test_from_bytes_rejects_dirty_padding() {
        // 12 bits occupy one and a half bytes; the top nibble is padding.
        let err = BitArray::from_bytes(12, vec![0x00, 0x10]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);

        let ok = BitArray::from_bytes(12, vec![0xff, 0x0f]).unwrap();
        assert_eq!(ok.num_bits_set(), 12);
    }

    #[test]
    fn test_from_bytes_accepts_byte_aligned_lengths() {
        let bits = BitArray::from_bytes(16, vec![0x80, 0x01]).unwrap();
        assert_eq!(bits.num_bits_set(), 2);
        assert!(bits.get(7));
        assert!(bits.get(8));
    }

    #[test]
    #[should_panic(expected = "bit index out of range")]
    fn test_out_of_range_access_panics() {
        let bits = BitArray::new(8);
        bits.get(8);
    }
}
