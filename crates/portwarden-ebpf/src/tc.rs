//! TC classifier adapters: the process+port variant on both directions.
//!
//! `bpf_get_current_comm` reports the task the kernel is executing for,
//! which identifies the originating or receiving process for
//! locally-terminated traffic. The two programs differ only in the hook
//! id they stamp on verdict events; attachment direction is the loader's
//! choice.

use aya_ebpf::bindings::{TC_ACT_OK, TC_ACT_SHOT};
use aya_ebpf::helpers::bpf_get_current_comm;
use aya_ebpf::macros::classifier;
use aya_ebpf::programs::TcContext;
use aya_log_ebpf::debug;
use portwarden_common::constants::{COMM_LEN, HOOK_TC_EGRESS, HOOK_TC_INGRESS};
use portwarden_engine::parse::parse_frame;
use portwarden_engine::policy::decide_comm_port;

use crate::maps;
use crate::view::PacketView;

/// Process+port filter for the ingress direction.
#[classifier]
pub fn ingress_filter(ctx: TcContext) -> i32 {
    match try_comm_filter(&ctx, HOOK_TC_INGRESS) {
        Ok(ret) => ret,
        Err(()) => TC_ACT_OK,
    }
}

/// Process+port filter for the egress direction.
#[classifier]
pub fn egress_filter(ctx: TcContext) -> i32 {
    match try_comm_filter(&ctx, HOOK_TC_EGRESS) {
        Ok(ret) => ret,
        Err(()) => TC_ACT_OK,
    }
}

#[inline(always)]
fn try_comm_filter(ctx: &TcContext, hook: u8) -> Result<i32, ()> {
    let view = PacketView::new(ctx.data(), ctx.data_end());
    let Ok(headers) = parse_frame(&view) else {
        return Ok(TC_ACT_OK);
    };

    // A failed comm read leaves the buffer zeroed; a zeroed comm matches
    // no configured name, so identity stays fail-closed.
    let comm: [u8; COMM_LEN] = bpf_get_current_comm().unwrap_or([0; COMM_LEN]);

    let policy = maps::policy_snapshot();
    let verdict = decide_comm_port(&comm, headers.tcp_dest_port, &policy);
    maps::emit_verdict(ctx, hook, &comm, headers.tcp_dest_port, verdict);

    if verdict.is_drop() {
        debug!(
            ctx,
            "tc drop: dst port {} reason {}",
            headers.tcp_dest_port,
            verdict.reason_code()
        );
        return Ok(TC_ACT_SHOT);
    }
    Ok(TC_ACT_OK)
}
