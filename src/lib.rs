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

//! A seeded Bloom filter over raw byte sequences.
//!
//! A Bloom filter answers set-membership queries with "possibly present" or
//! "definitely absent", trading a tunable false-positive rate for sublinear
//! space. There are no false negatives: an inserted item is always reported
//! present.
//!
//! The filter is sized from a target item count and false-positive
//! probability (or from an explicit bit and hash count), derives its hash
//! functions from a single 64-bit seed, and persists to a fixed little-endian
//! byte layout that restores to an equal filter.
//!
//! # Examples
//!
//! ```
//! use bitsieve::{BloomFilter, BloomFilterBuilder};
//!
//! let mut filter = BloomFilterBuilder::with_accuracy(1000, 0.001)
//!     .seed(9001)
//!     .build()
//!     .unwrap();
//!
//! filter.insert(b"raspberry");
//! assert!(filter.contains(b"raspberry"));
//! assert!(!filter.contains(b"dragonfruit"));
//!
//! let bytes = filter.to_bytes();
//! let restored = BloomFilter::from_bytes(&bytes).unwrap();
//! assert_eq!(restored, filter);
//! ```

pub mod bloom;
pub mod error;
mod hash;

pub use bloom::BloomFilter;
pub use bloom::BloomFilterBuilder;
