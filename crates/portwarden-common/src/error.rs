//! Userspace error types for the Portwarden loader and control plane.
//!
//! The kernel-side engine has no error type at all: a malformed frame is a
//! pass-through signal and a policy mismatch is a verdict, never a fault.
//! Everything here concerns the loader — object files, program and map
//! lookups, attachment.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for Portwarden userspace operations.
#[derive(Debug, Error)]
pub enum PortwardenError {
    /// The compiled BPF object could not be loaded.
    #[error("failed to load BPF object {path}: {source}")]
    ObjectLoad {
        /// Path of the object file.
        path: PathBuf,
        /// Underlying aya load error.
        source: aya::EbpfError,
    },

    /// A program was missing from the loaded object.
    #[error("program {name} not found in BPF object")]
    ProgramNotFound {
        /// Name of the missing program.
        name: &'static str,
    },

    /// A program failed to load or attach.
    #[error("program {name}: {source}")]
    Program {
        /// Name of the failing program.
        name: &'static str,
        /// Underlying aya program error.
        source: aya::programs::ProgramError,
    },

    /// A map was missing from the loaded object.
    #[error("map {name} not found in BPF object")]
    MapNotFound {
        /// Name of the missing map.
        name: &'static str,
    },

    /// A map operation failed.
    #[error("map {name}: {source}")]
    Map {
        /// Name of the failing map.
        name: &'static str,
        /// Underlying aya map error.
        source: aya::maps::MapError,
    },

    /// A map could not be pinned to or opened from bpffs.
    #[error("failed to pin map {name}: {source}")]
    Pin {
        /// Name of the map being pinned.
        name: &'static str,
        /// Underlying pin error.
        source: aya::pin::PinError,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },
}

/// Convenience alias used throughout the userspace crates.
pub type Result<T> = std::result::Result<T, PortwardenError>;
