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
use super::filter::BloomFilter;
use crate::error::Error;
use crate::hash::HashFamily;

/// Default hash seed used when [`BloomFilterBuilder::seed`] is not called.
pub const DEFAULT_SEED: u64 = 9001;

pub const MIN_NUM_BITS: u64 = 1;
pub const MAX_NUM_BITS: u64 = 1 << 35;
pub const MIN_NUM_HASHES: u32 = 1;
pub const MAX_NUM_HASHES: u32 = 1 << 15;

#[derive(Debug, Clone)]
enum Sizing {
    Accuracy { max_items: u64, fpp: f64 },
    Explicit { num_bits: u64, num_hashes: u32 },
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): specify target items and false
///   positive rate (recommended)
/// - [`with_size()`](Self::with_size): specify exact bit count and hash
///   functions (manual)
///
/// Parameters are validated in [`build()`](Self::build), which fails with
/// [`crate::error::ErrorKind::InvalidParameter`] rather than producing a
/// malformed filter.
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder {
    sizing: Sizing,
    seed: u64,
}

impl BloomFilterBuilder {
    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// Calculates the optimal number of bits and hash functions to achieve
    /// the desired false positive probability for a given number of items.
    /// Inserting far more than `max_items` elements degrades the actual false
    /// positive rate beyond `fpp`; that is a documented property of the
    /// structure, not an error.
    ///
    /// # Arguments
    ///
    /// - `max_items`: maximum expected number of distinct items, at least 1
    /// - `fpp`: target false positive probability, strictly between 0 and 1
    ///
    /// # Examples
    ///
    /// ```
    /// use bitsieve::BloomFilterBuilder;
    ///
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01)
    ///     .seed(42)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(filter.hash_count(), 7);
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Accuracy { max_items, fpp },
            seed: DEFAULT_SEED,
        }
    }

    /// Creates a builder with manual size specification.
    ///
    /// Use this when working with pre-calculated parameters, for example when
    /// rebuilding a filter that must line up with an existing one.
    ///
    /// # Arguments
    ///
    /// - `num_bits`: total number of bits in the filter
    /// - `num_hashes`: number of derived hash functions, at least 1
    ///
    /// # Examples
    ///
    /// ```
    /// use bitsieve::BloomFilterBuilder;
    ///
    /// let filter = BloomFilterBuilder::with_size(10_000, 7).build().unwrap();
    /// assert_eq!(filter.bit_count(), 10_000);
    /// ```
    pub fn with_size(num_bits: u64, num_hashes: u32) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Explicit {
                num_bits,
                num_hashes,
            },
            seed: DEFAULT_SEED,
        }
    }

    /// Sets a custom hash seed (default: 9001).
    ///
    /// Filters built from distinct seeds produce unrelated bit patterns and
    /// never compare equal, even with identical sizing and inserts.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::error::ErrorKind::InvalidParameter`] if the sizing
    /// parameters are out of range.
    pub fn build(self) -> Result<BloomFilter, Error> {
        let (num_bits, num_hashes) = match self.sizing {
            Sizing::Accuracy { max_items, fpp } => {
                let num_bits = Self::optimal_num_bits(max_items, fpp)?;
                let num_hashes = Self::optimal_num_hashes(max_items, num_bits);
                (num_bits, num_hashes)
            }
            Sizing::Explicit {
                num_bits,
                num_hashes,
            } => {
                if !(MIN_NUM_BITS..=MAX_NUM_BITS).contains(&num_bits) {
                    return Err(Error::invalid_parameter("bit count is out of range")
                        .with_context("num_bits", num_bits)
                        .with_context("max", MAX_NUM_BITS));
                }
                if !(MIN_NUM_HASHES..=MAX_NUM_HASHES).contains(&num_hashes) {
                    return Err(Error::invalid_parameter("hash count is out of range")
                        .with_context("num_hashes", num_hashes)
                        .with_context("max", MAX_NUM_HASHES));
                }
                (num_bits, num_hashes)
            }
        };

        Ok(BloomFilter {
            hashes: HashFamily::new(self.seed),
            num_hashes,
            inserted_count: 0,
            bits: BitArray::new(num_bits),
        })
    }

    /// Computes the optimal number of bits given max items and target FPP.
    ///
    /// Formula: `m = ceil(-n * ln(p) / ln(2)^2)` where n = `max_items` and
    /// p = `fpp`. Storage rounds the result up to a byte boundary; the
    /// logical bit count stays exact.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitsieve::BloomFilterBuilder;
    ///
    /// let bits = BloomFilterBuilder::optimal_num_bits(1000, 0.001).unwrap();
    /// assert_eq!(bits, 14378);
    /// ```
    pub fn optimal_num_bits(max_items: u64, fpp: f64) -> Result<u64, Error> {
        if max_items == 0 {
            return Err(Error::invalid_parameter("max_items must be at least 1"));
        }
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(
                Error::invalid_parameter("fpp must lie strictly between 0.0 and 1.0")
                    .with_context("fpp", fpp),
            );
        }

        let n = max_items as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;
        let bits = (-n * fpp.ln() / ln2_squared).ceil() as u64;

        Ok(bits.clamp(MIN_NUM_BITS, MAX_NUM_BITS))
    }

    /// Computes the optimal number of hash functions given max items and bit
    /// count.
    ///
    /// Formula: `k = round((m / n) * ln(2))` where m = `num_bits` and
    /// n = `max_items`, clamped to at least 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitsieve::BloomFilterBuilder;
    ///
    /// let hashes = BloomFilterBuilder::optimal_num_hashes(1000, 14378);
    /// assert_eq!(hashes, 10);
    /// ```
    pub fn optimal_num_hashes(max_items: u64, num_bits: u64) -> u32 {
        let k = (num_bits as f64 / max_items as f64 * std::f64::consts::LN_2).round();
        (k as u32).clamp(MIN_NUM_HASHES, MAX_NUM_HASHES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_sizing_anchor_values() {
        assert_eq!(BloomFilterBuilder::optimal_num_bits(1000, 0.001).unwrap(), 14378);
        assert_eq!(BloomFilterBuilder::optimal_num_hashes(1000, 14378), 10);

        assert_eq!(BloomFilterBuilder::optimal_num_bits(1000, 0.01).unwrap(), 9586);
        assert_eq!(BloomFilterBuilder::optimal_num_hashes(1000, 9586), 7);
    }

    #[test]
    fn test_hash_count_clamps_to_one() {
        // A tiny array relative to the item count would compute k = 0.
        assert_eq!(BloomFilterBuilder::optimal_num_hashes(1000, 100), 1);
    }

    #[test]
    fn test_build_with_accuracy() {
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.001)
            .build()
            .unwrap();
        assert_eq!(filter.bit_count(), 14378);
        assert_eq!(filter.hash_count(), 10);
        assert_eq!(filter.seed(), DEFAULT_SEED);
        assert_eq!(filter.element_count(), 0);
    }

    #[test]
    fn test_build_with_size_and_seed() {
        let filter = BloomFilterBuilder::with_size(1024, 5)
            .seed(77)
            .build()
            .unwrap();
        assert_eq!(filter.bit_count(), 1024);
        assert_eq!(filter.hash_count(), 5);
        assert_eq!(filter.seed(), 77);
    }

    #[test]
    fn test_invalid_accuracy_parameters() {
        for (max_items, fpp) in [(0, 0.01), (100, 0.0), (100, 1.0), (100, 1.5), (100, -0.1)] {
            let err = BloomFilterBuilder::with_accuracy(max_items, fpp)
                .build()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "({max_items}, {fpp})");
        }
    }

    #[test]
    fn test_invalid_explicit_parameters() {
        for (num_bits, num_hashes) in [
            (0, 1),
            (MAX_NUM_BITS + 1, 1),
            (64, 0),
            (64, MAX_NUM_HASHES + 1),
        ] {
            let err = BloomFilterBuilder::with_size(num_bits, num_hashes)
                .build()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        }
    }

    #[test]
    fn test_nan_fpp_is_rejected() {
        let err = BloomFilterBuilder::with_accuracy(100, f64::NAN)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
}
