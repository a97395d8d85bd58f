//! Portwarden eBPF kernel programs.
//!
//! One object file, four hook adapters over the shared
//! `portwarden-engine`:
//! - `port_filter` (XDP): port-only variant at the earliest drop point.
//! - `ingress_filter` / `egress_filter` (TC classifiers): process+port
//!   variant on packet paths.
//! - `connect_filter` (cgroup connect4): process+port variant on
//!   outbound connection attempts.
//!
//! Safety invariants:
//! - Every packet access goes through the engine's bounds-checked view.
//! - No loops over unbounded input; constant work per event.
//! - All map operations handle the absent case.
//!
//! Build requirements: this crate is NOT compiled for BPF by the standard
//! `cargo build`. Cross-compile it separately with
//! `cargo +nightly build -Z build-std=core --target bpfel-unknown-none
//! --release` and hand the produced object to `pwdn attach --obj`.
//! On host targets it compiles to an inert stub so the workspace builds
//! and tests everywhere.

#![cfg_attr(target_arch = "bpf", no_std)]
#![cfg_attr(target_arch = "bpf", no_main)]
#![cfg_attr(target_arch = "bpf", allow(unsafe_code))]

#[cfg(target_arch = "bpf")]
mod connect;
#[cfg(target_arch = "bpf")]
mod maps;
#[cfg(target_arch = "bpf")]
mod tc;
#[cfg(target_arch = "bpf")]
mod view;
#[cfg(target_arch = "bpf")]
mod xdp;

/// Host-target stub; the real programs only exist for BPF targets.
#[cfg(not(target_arch = "bpf"))]
fn main() {}

#[cfg(target_arch = "bpf")]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {
        core::hint::spin_loop();
    }
}
