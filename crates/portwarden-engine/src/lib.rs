//! # portwarden-engine
//!
//! The packet-parsing and policy-evaluation engine behind every Portwarden
//! hook program.
//!
//! The engine is deliberately hook-agnostic: the four kernel programs and
//! the userspace dry-run all feed it the same inputs — a bounds-checked
//! [`frame::FrameView`] (packet paths) or a destination port (connect
//! path), the caller's comm where the variant needs one, and the current
//! policy — and translate the returned verdict to their own enforcement
//! convention.
//!
//! Everything except [`store`] is pure `core` so the same code links into
//! BPF targets unchanged.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod frame;
pub mod parse;
pub mod policy;
#[cfg(feature = "std")]
pub mod store;
