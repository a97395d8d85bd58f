//! Protocol constants, map names, and wire codes shared by the kernel
//! programs and userspace.

/// EtherType announcing an IPv4 payload.
pub const ETHERTYPE_IPV4: u16 = 0x0800;

/// IANA protocol number for TCP.
pub const IPPROTO_TCP: u8 = 6;

/// Length of an Ethernet header in bytes.
pub const ETH_HDR_LEN: usize = 14;

/// Minimal IPv4 header length in bytes (IHL = 5, no options).
pub const IPV4_HDR_MIN_LEN: usize = 20;

/// Length of a TCP header without options in bytes.
pub const TCP_HDR_LEN: usize = 20;

/// Width of a kernel task comm, including its trailing NUL padding.
pub const COMM_LEN: usize = 16;

/// Name of the allowed-port policy map.
pub const PORT_POLICY_MAP: &str = "PORT_POLICY";
/// Name of the allowed-comm policy map.
pub const COMM_POLICY_MAP: &str = "COMM_POLICY";
/// Name of the verdict event perf array.
pub const VERDICT_EVENTS_MAP: &str = "VERDICT_EVENTS";

/// Name of the XDP port-only program.
pub const XDP_PROGRAM: &str = "port_filter";
/// Name of the TC ingress process+port program.
pub const TC_INGRESS_PROGRAM: &str = "ingress_filter";
/// Name of the TC egress process+port program.
pub const TC_EGRESS_PROGRAM: &str = "egress_filter";
/// Name of the cgroup connect4 process+port program.
pub const CONNECT4_PROGRAM: &str = "connect_filter";

/// Default bpffs directory for pinned policy maps.
pub const DEFAULT_PIN_DIR: &str = "/sys/fs/bpf/portwarden";

/// Verdict code: traffic permitted by policy.
pub const VERDICT_PASS: u8 = 0;
/// Verdict code: traffic rejected by policy.
pub const VERDICT_DROP: u8 = 1;
/// Verdict code: event not subject to the policy (non-IPv4/TCP, truncated).
pub const VERDICT_PASS_THROUGH: u8 = 2;

/// Reason code: no drop reason (the event passed).
pub const REASON_NONE: u8 = 0;
/// Reason code: the comm policy was never configured.
pub const REASON_COMM_UNSET: u8 = 1;
/// Reason code: the caller's comm differs from the configured one.
pub const REASON_COMM_MISMATCH: u8 = 2;
/// Reason code: the destination port differs from the configured one.
pub const REASON_PORT_MISMATCH: u8 = 3;

/// Hook id: XDP earliest-drop hook.
pub const HOOK_XDP: u8 = 0;
/// Hook id: TC ingress classifier.
pub const HOOK_TC_INGRESS: u8 = 1;
/// Hook id: TC egress classifier.
pub const HOOK_TC_EGRESS: u8 = 2;
/// Hook id: cgroup connect4 hook.
pub const HOOK_CONNECT4: u8 = 3;
