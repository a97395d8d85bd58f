//! POD types crossing the BPF map boundary.
//!
//! Every struct here is `#[repr(C)]` with explicit padding so the kernel
//! and userspace agree on layout byte for byte. The `aya::Pod` impls live
//! behind the `user` feature; the BPF build needs only the raw structs.

use crate::constants::COMM_LEN;

/// Allowed-port policy map value.
///
/// Lives in a single-entry array map, which the kernel zero-initialises:
/// `configured == 0` therefore encodes "no port policy installed".
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortPolicy {
    /// Allowed TCP destination port, host byte order.
    pub port: u16,
    /// Non-zero once the control plane has written a value.
    pub configured: u8,
    /// Explicit padding, always zero.
    pub _pad: u8,
}

impl PortPolicy {
    /// The zero value an untouched array map slot holds.
    pub const UNSET: Self = Self {
        port: 0,
        configured: 0,
        _pad: 0,
    };

    /// A policy allowing exactly `port`.
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            configured: 1,
            _pad: 0,
        }
    }

    /// The configured port, or `None` when the policy is unset.
    #[must_use]
    pub const fn get(&self) -> Option<u16> {
        if self.configured != 0 {
            Some(self.port)
        } else {
            None
        }
    }
}

/// Allowed-comm policy map value.
///
/// Same single-entry array map discipline as [`PortPolicy`]. The comm is a
/// fixed 16-byte buffer compared over its full width, never as a
/// NUL-terminated string.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommPolicy {
    /// Allowed process short name, zero-padded to [`COMM_LEN`].
    pub comm: [u8; COMM_LEN],
    /// Non-zero once the control plane has written a value.
    pub configured: u8,
    /// Explicit padding, always zero.
    pub _pad: [u8; 3],
}

impl CommPolicy {
    /// The zero value an untouched array map slot holds.
    pub const UNSET: Self = Self {
        comm: [0; COMM_LEN],
        configured: 0,
        _pad: [0; 3],
    };

    /// A policy allowing exactly `comm`.
    #[must_use]
    pub const fn new(comm: [u8; COMM_LEN]) -> Self {
        Self {
            comm,
            configured: 1,
            _pad: [0; 3],
        }
    }

    /// The configured comm, or `None` when the policy is unset.
    #[must_use]
    pub const fn get(&self) -> Option<[u8; COMM_LEN]> {
        if self.configured != 0 {
            Some(self.comm)
        } else {
            None
        }
    }
}

/// One policy decision, published from the kernel via the verdict perf
/// array and consumed by the loader's reporting loop.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VerdictEvent {
    /// Comm of the process the kernel was executing for. All zeros on the
    /// XDP path, which has no process context.
    pub comm: [u8; COMM_LEN],
    /// Destination TCP port of the event, host byte order.
    pub dst_port: u16,
    /// Verdict wire code (`VERDICT_*`).
    pub verdict: u8,
    /// Drop reason wire code (`REASON_*`), `REASON_NONE` for passes.
    pub reason: u8,
    /// Hook id (`HOOK_*`) identifying the emitting program.
    pub hook: u8,
    /// Explicit padding, always zero.
    pub _pad: [u8; 3],
}

#[cfg(feature = "user")]
mod pod {
    #![allow(unsafe_code)]

    use super::{CommPolicy, PortPolicy, VerdictEvent};

    unsafe impl aya::Pod for PortPolicy {}
    unsafe impl aya::Pod for CommPolicy {}
    unsafe impl aya::Pod for VerdictEvent {}
}

/// Zero-pads `name` into a fixed-width comm buffer.
///
/// Returns `None` when the name cannot fit: a kernel comm is NUL-terminated
/// within [`COMM_LEN`] bytes, so a 16-byte-or-longer configured name could
/// never match any real process.
#[must_use]
pub fn comm_bytes(name: &str) -> Option<[u8; COMM_LEN]> {
    let raw = name.as_bytes();
    if raw.len() >= COMM_LEN {
        return None;
    }
    let mut comm = [0u8; COMM_LEN];
    comm[..raw.len()].copy_from_slice(raw);
    Some(comm)
}

/// Renders a fixed-width comm for display, dropping the NUL padding.
#[cfg(feature = "std")]
#[must_use]
pub fn comm_display(comm: &[u8; COMM_LEN]) -> String {
    let end = comm.iter().position(|&b| b == 0).unwrap_or(COMM_LEN);
    String::from_utf8_lossy(&comm[..end]).into_owned()
}
