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

use super::bit_array::BitArray;
use crate::hash::HashFamily;

/// A Bloom filter for probabilistic set membership testing over raw byte
/// sequences.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// The filter is insert-only: bits are never cleared once set. It is a plain
/// value type with no internal synchronization; concurrent writers need
/// external mutual exclusion, while a populated filter can be queried from
/// many threads at once because [`contains()`](Self::contains) never mutates.
///
/// Use [`BloomFilterBuilder`](super::BloomFilterBuilder) to construct
/// instances.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    /// Hash family derived from the configured seed.
    pub(super) hashes: HashFamily,
    /// Number of derived hash functions (k).
    pub(super) num_hashes: u32,
    /// Count of insert operations, duplicates included.
    pub(super) inserted_count: u64,
    /// Packed bit storage (m bits).
    pub(super) bits: BitArray,
}

impl BloomFilter {
    /// Inserts an item into the filter.
    ///
    /// Sets one bit per derived hash function; setting an already-set bit is
    /// a no-op. After insertion, `contains(item)` always returns `true`.
    /// Never fails: any byte sequence, including the empty one, is a valid
    /// item. Each call bumps [`element_count()`](Self::element_count), even
    /// for repeated inserts of the same item.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitsieve::BloomFilterBuilder;
    ///
    /// let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();
    ///
    /// filter.insert(b"apple");
    /// assert!(filter.contains(b"apple"));
    /// ```
    pub fn insert(&mut self, item: &[u8]) {
        for position in self
            .hashes
            .positions(item, self.num_hashes, self.bits.num_bits())
        {
            self.bits.set(position);
        }
        self.inserted_count += 1;
    }

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: item was **possibly** inserted (or is a false positive)
    /// - `false`: item was **definitely not** inserted
    ///
    /// Checks one bit per derived hash function and answers `false` as soon
    /// as an unset bit is found. A `true` answer for an item that was never
    /// inserted is a false positive, bounded in expectation by the configured
    /// rate while the filter holds at most its designed item count.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitsieve::BloomFilterBuilder;
    ///
    /// let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();
    /// filter.insert(b"apple");
    ///
    /// assert!(filter.contains(b"apple"));
    /// assert!(!filter.contains(b"grape"));
    /// ```
    pub fn contains(&self, item: &[u8]) -> bool {
        if self.is_empty() {
            return false;
        }

        self.hashes
            .positions(item, self.num_hashes, self.bits.num_bits())
            .all(|position| self.bits.get(position))
    }

    /// Tests and inserts an item in a single operation.
    ///
    /// Returns whether the item was possibly already in the set before
    /// insertion. One hashing pass instead of the two a `contains()` then
    /// `insert()` pair would take; the insert half behaves exactly like
    /// [`insert()`](Self::insert), counter bump included.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitsieve::BloomFilterBuilder;
    ///
    /// let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();
    ///
    /// assert!(!filter.contains_and_insert(b"apple"));
    /// assert!(filter.contains_and_insert(b"apple"));
    /// ```
    pub fn contains_and_insert(&mut self, item: &[u8]) -> bool {
        let mut was_present = true;
        for position in self
            .hashes
            .positions(item, self.num_hashes, self.bits.num_bits())
        {
            if self.bits.set(position) {
                was_present = false;
            }
        }
        self.inserted_count += 1;
        was_present
    }

    /// Returns whether no bits are set (no items inserted).
    pub fn is_empty(&self) -> bool {
        self.bits.num_bits_set() == 0
    }

    /// Returns the logical number of bits in the filter (m).
    pub fn bit_count(&self) -> u64 {
        self.bits.num_bits()
    }

    /// Returns the number of derived hash functions (k).
    pub fn hash_count(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u64 {
        self.hashes.seed()
    }

    /// Returns the number of insert operations performed.
    ///
    /// Counts operations, not distinct members: inserting the same item twice
    /// counts twice. The counter survives persistence round trips verbatim
    /// but does not participate in equality.
    pub fn element_count(&self) -> u64 {
        self.inserted_count
    }

    /// Returns the size of the backing storage in bits.
    ///
    /// This is [`bit_count()`](Self::bit_count) rounded up to a byte
    /// boundary.
    pub fn size_in_bits(&self) -> u64 {
        self.bits.num_bytes() as u64 * 8
    }

    /// Returns the size of the backing storage in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.bits.num_bytes()
    }

    /// Returns the number of bits set to 1.
    ///
    /// Useful for monitoring filter saturation.
    pub fn bits_used(&self) -> u64 {
        self.bits.num_bits_set()
    }

    /// Returns the current load factor (fraction of bits set).
    ///
    /// Values near 0.5 indicate the filter is approaching saturation. Values
    /// above 0.5 indicate degraded false positive rates.
    pub fn load_factor(&self) -> f64 {
        self.bits.num_bits_set() as f64 / self.bits.num_bits() as f64
    }

    /// Estimates the current false positive probability as `load_factor^k`,
    /// assuming uniform bit distribution.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powf(f64::from(self.num_hashes))
    }
}

/// Two filters are equal iff bit count, hash count, seed, and every bit of
/// storage match. The insert-operation counter is informational and
/// deliberately excluded, so filters that reached the same bit pattern
/// through different insert histories still compare equal. Persistence
/// round-trip checks rely on this.
impl PartialEq for BloomFilter {
    fn eq(&self, other: &Self) -> bool {
        self.hashes.seed() == other.hashes.seed()
            && self.num_hashes == other.num_hashes
            && self.bits == other.bits
    }
}

impl Eq for BloomFilter {}

#[cfg(test)]
mod tests {
    use crate::bloom::BloomFilterBuilder;

    #[test]
    fn test_insert_and_contains() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();

        assert!(!filter.contains(b"apple"));
        filter.insert(b"apple");
        assert!(filter.contains(b"apple"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_contains_and_insert() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();

        assert!(!filter.contains_and_insert(b"apple"));
        assert!(filter.contains_and_insert(b"apple"));
        assert_eq!(filter.element_count(), 2);
    }

    #[test]
    fn test_element_count_counts_operations() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();

        filter.insert(b"apple");
        filter.insert(b"apple");
        filter.insert(b"pear");
        assert_eq!(filter.element_count(), 3);
    }

    #[test]
    fn test_empty_item_is_insertable() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();

        filter.insert(b"");
        assert!(filter.contains(b""));
        assert_eq!(filter.element_count(), 1);
    }

    #[test]
    fn test_equality_ignores_element_count() {
        let mut once = BloomFilterBuilder::with_size(256, 3).seed(5).build().unwrap();
        let mut twice = BloomFilterBuilder::with_size(256, 3).seed(5).build().unwrap();

        once.insert(b"apple");
        twice.insert(b"apple");
        twice.insert(b"apple");

        assert_eq!(once, twice);
        assert_ne!(once.element_count(), twice.element_count());
    }

    #[test]
    fn test_equality_requires_matching_seed() {
        let a = BloomFilterBuilder::with_size(256, 3).seed(1).build().unwrap();
        let b = BloomFilterBuilder::with_size(256, 3).seed(2).build().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_storage_rounds_up_to_byte_boundary() {
        let filter = BloomFilterBuilder::with_size(12, 2).build().unwrap();
        assert_eq!(filter.bit_count(), 12);
        assert_eq!(filter.size_in_bytes(), 2);
        assert_eq!(filter.size_in_bits(), 16);
    }

    #[test]
    fn test_statistics() {
        let mut filter = BloomFilterBuilder::with_size(1000, 5).build().unwrap();
        assert_eq!(filter.bits_used(), 0);
        assert_eq!(filter.load_factor(), 0.0);

        filter.insert(b"test");
        assert!(filter.bits_used() > 0);
        assert!(filter.bits_used() <= 5);
        assert!(filter.load_factor() > 0.0);
        assert!(filter.estimated_fpp() > 0.0);
    }
}
