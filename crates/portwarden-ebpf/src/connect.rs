//! Outbound-connect adapter: the process+port variant on cgroup connect4.
//!
//! Unlike the packet paths there is no frame to parse; the connect
//! descriptor carries the destination port directly, in network byte
//! order. Denied attempts fail synchronously before the socket connects.

use aya_ebpf::helpers::bpf_get_current_comm;
use aya_ebpf::macros::cgroup_sock_addr;
use aya_ebpf::programs::SockAddrContext;
use aya_log_ebpf::debug;
use portwarden_common::constants::{COMM_LEN, HOOK_CONNECT4, IPPROTO_TCP};
use portwarden_engine::policy::decide_comm_port;

use crate::maps;

/// Return value permitting the connection attempt.
const CONNECT_PERMIT: i32 = 1;
/// Return value rejecting the connection attempt.
const CONNECT_DENY: i32 = 0;

/// Address family of IPv4 sockets.
const AF_INET: u32 = 2;

/// Gates outbound IPv4 TCP connection attempts on comm and port.
#[cgroup_sock_addr(connect4)]
pub fn connect_filter(ctx: SockAddrContext) -> i32 {
    match try_connect_filter(&ctx) {
        Ok(ret) => ret,
        Err(()) => CONNECT_PERMIT,
    }
}

#[inline(always)]
fn try_connect_filter(ctx: &SockAddrContext) -> Result<i32, ()> {
    let sock_addr = unsafe { &*ctx.sock_addr };

    // Only IPv4 TCP connects are subject to the policy.
    if sock_addr.user_family != AF_INET || sock_addr.protocol != u32::from(IPPROTO_TCP) {
        return Ok(CONNECT_PERMIT);
    }

    // The descriptor delivers the port in network byte order.
    let dst_port = u16::from_be(sock_addr.user_port as u16);

    let comm: [u8; COMM_LEN] = bpf_get_current_comm().unwrap_or([0; COMM_LEN]);

    let policy = maps::policy_snapshot();
    let verdict = decide_comm_port(&comm, dst_port, &policy);
    maps::emit_verdict(ctx, HOOK_CONNECT4, &comm, dst_port, verdict);

    if verdict.is_drop() {
        debug!(ctx, "connect4 deny: dst port {}", dst_port);
        return Ok(CONNECT_DENY);
    }
    Ok(CONNECT_PERMIT)
}
