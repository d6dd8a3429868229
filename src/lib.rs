//! A permutation group library
//!
//! This crate provides data structures and algorithms for working with permutations and finite
//! permutation groups given by generators: orbits and Schreier vectors, stabilizer chains, coset
//! arithmetic (membership, order, rank/unrank), block systems, derived subgroups and randomized
//! recognition of large symmetric and alternating groups.
//!
pub mod error;
pub mod group;
pub mod orbit;
pub mod perm;

mod chain;
mod random;

/// Set element.
///
/// Set elements are represented by non-negative integers (`u32`).
pub type El = u32;
