//! # ethproof-tests
//!
//! Integration tests for the ethproof workspace.
//!
//! This crate exercises the pieces together over small synthetic DAG
//! files: end-to-end epoch commitment builds, proof assembly against
//! persisted caches, and property-based tests of the Merkle engine and
//! index derivation.

pub mod generators;

#[cfg(test)]
mod property_tests;


pub use generators::*;
