//! Earliest-drop adapter: the port-only variant on the XDP hook.
//!
//! XDP runs before the stack has any process context, so this hook only
//! enforces the port dimension; verdict events carry a zeroed comm.

use aya_ebpf::bindings::xdp_action;
use aya_ebpf::macros::xdp;
use aya_ebpf::programs::XdpContext;
use aya_log_ebpf::debug;
use portwarden_common::constants::{COMM_LEN, HOOK_XDP};
use portwarden_engine::parse::parse_frame;
use portwarden_engine::policy::decide_port_only;

use crate::maps;
use crate::view::PacketView;

/// Drops TCP frames whose destination port misses the configured one.
#[xdp]
pub fn port_filter(ctx: XdpContext) -> u32 {
    match try_port_filter(&ctx) {
        Ok(ret) => ret,
        Err(()) => xdp_action::XDP_PASS,
    }
}

#[inline(always)]
fn try_port_filter(ctx: &XdpContext) -> Result<u32, ()> {
    let view = PacketView::new(ctx.data(), ctx.data_end());
    let Ok(headers) = parse_frame(&view) else {
        // Not subject to the policy: forward unmodified.
        return Ok(xdp_action::XDP_PASS);
    };

    let verdict = decide_port_only(headers.tcp_dest_port, maps::allowed_port());
    maps::emit_verdict(ctx, HOOK_XDP, &[0; COMM_LEN], headers.tcp_dest_port, verdict);

    if verdict.is_drop() {
        debug!(ctx, "xdp drop: dst port {}", headers.tcp_dest_port);
        return Ok(xdp_action::XDP_DROP);
    }
    Ok(xdp_action::XDP_PASS)
}
