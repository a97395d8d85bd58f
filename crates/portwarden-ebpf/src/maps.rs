//! BPF maps shared by all four programs, plus the small accessors the
//! adapters use.

use aya_ebpf::EbpfContext;
use aya_ebpf::macros::map;
use aya_ebpf::maps::{Array, PerfEventArray};
use portwarden_common::constants::COMM_LEN;
use portwarden_common::types::{CommPolicy, PortPolicy, VerdictEvent};
use portwarden_engine::policy::{PolicySnapshot, Verdict};

/// Allowed-port policy, written by the control plane.
#[map]
static PORT_POLICY: Array<PortPolicy> = Array::with_max_entries(1, 0);

/// Allowed-comm policy, written by the control plane.
#[map]
static COMM_POLICY: Array<CommPolicy> = Array::with_max_entries(1, 0);

/// Verdict records consumed by the loader's reporting loop.
#[map]
static VERDICT_EVENTS: PerfEventArray<VerdictEvent> = PerfEventArray::new(0);

/// Reads the port dimension fresh from its map.
///
/// Array map slots are zero-initialised, so an untouched slot reads as an
/// unset policy. The lookup is an atomic per-scalar snapshot.
#[inline(always)]
pub fn allowed_port() -> Option<u16> {
    PORT_POLICY.get(0).and_then(PortPolicy::get)
}

/// Reads both policy dimensions fresh from their maps.
///
/// The two lookups are independently atomic: a concurrent control-plane
/// update of both dimensions may interleave between them, but neither
/// scalar can ever be observed half-written.
#[inline(always)]
pub fn policy_snapshot() -> PolicySnapshot {
    PolicySnapshot {
        allowed_port: allowed_port(),
        allowed_comm: COMM_POLICY.get(0).and_then(CommPolicy::get),
    }
}

/// Publishes one policy decision to the verdict perf array.
///
/// Only policy-subject decisions are reported; pass-through traffic never
/// reaches this function.
#[inline(always)]
pub fn emit_verdict<C: EbpfContext>(
    ctx: &C,
    hook: u8,
    comm: &[u8; COMM_LEN],
    dst_port: u16,
    verdict: Verdict,
) {
    let event = VerdictEvent {
        comm: *comm,
        dst_port,
        verdict: verdict.code(),
        reason: verdict.reason_code(),
        hook,
        _pad: [0; 3],
    };
    VERDICT_EVENTS.output(ctx, &event, 0);
}
