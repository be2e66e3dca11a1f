//! Red-black tree ordered map for Rust.
//!
//! This crate provides [`RBTreeMap`], a sorted key-value container backed by
//! a red-black tree whose nodes live in an arena addressed by stable
//! handles. It offers:
//!
//! - O(log n) worst-case [`insert`](RBTreeMap::insert),
//!   [`get`](RBTreeMap::get), and [`remove`](RBTreeMap::remove)
//! - Ordered, bidirectional iteration ([`iter`](RBTreeMap::iter),
//!   [`keys`](RBTreeMap::keys), [`values`](RBTreeMap::values))
//! - A unique-key insertion policy that reports duplicates instead of
//!   overwriting, plus a repeat-key mode
//!   ([`insert_repeat`](RBTreeMap::insert_repeat)) that keeps equal keys in
//!   insertion order
//!
//! # Example
//!
//! ```
//! use carmine_tree::RBTreeMap;
//!
//! let mut population = RBTreeMap::new();
//! population.insert("Lagos", 16_500_000).unwrap();
//! population.insert("Reykjavik", 140_000).unwrap();
//! population.insert("Quito", 2_800_000).unwrap();
//!
//! // Lookups run in O(log n).
//! assert_eq!(population.get("Quito"), Some(&2_800_000));
//!
//! // A duplicate insert is rejected and the pair comes back.
//! let err = population.insert("Lagos", 0).unwrap_err();
//! assert_eq!(err.key, "Lagos");
//! assert_eq!(population.get("Lagos"), Some(&16_500_000));
//!
//! // Iteration is in key order.
//! let cities: Vec<_> = population.keys().copied().collect();
//! assert_eq!(cities, ["Lagos", "Quito", "Reykjavik"]);
//! ```
//!
//! # Implementation
//!
//! The tree follows the classic red-black scheme: nodes are linked RED,
//! insertion and deletion each run a bounded recolor/rotate fixup pass, and
//! the coloring invariants (BLACK root, no red-red edge, uniform black
//! height) bound the tree height at 2·log₂(n + 1). Structural links are
//! arena handles rather than pointers, so the parent back references carry
//! no ownership and freed slots are recycled across insertions.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod raw;

pub mod rbtree_map;

pub use rbtree_map::{OccupiedError, RBTreeMap};
