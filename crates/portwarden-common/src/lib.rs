//! # portwarden-common
//!
//! Shared layer between the Portwarden kernel programs and userspace:
//! the POD types that cross the BPF map boundary, the wire codes used in
//! verdict event records, protocol constants, and the loader-facing error
//! definitions.
//!
//! This crate is the leaf of the dependency graph. It compiles for BPF
//! targets with no features enabled; the `user` feature adds the
//! `aya::Pod` impls and error types the loader needs.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod constants;
#[cfg(feature = "user")]
pub mod error;
pub mod types;
