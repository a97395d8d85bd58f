//! Policy evaluation: the two decision variants and the verdict type.
//!
//! Both variants are pure functions of the event's fields and the current
//! policy — stateless, non-blocking, one decision per event. The asymmetry
//! between them is deliberate and preserved from the reference behavior:
//! an unset port policy means "no restriction", an unset comm policy means
//! "reject everything".

use portwarden_common::constants::{
    COMM_LEN, REASON_COMM_MISMATCH, REASON_COMM_UNSET, REASON_NONE, REASON_PORT_MISMATCH,
    VERDICT_DROP, VERDICT_PASS, VERDICT_PASS_THROUGH,
};

/// A consistent view of the two policy dimensions.
///
/// Kernel adapters assemble one from the policy maps on every event (each
/// map lookup is an atomic per-scalar snapshot); userspace loads one from
/// the [`crate::store::PolicyStore`]. Either way it is read fresh per
/// event, never cached across events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicySnapshot {
    /// Allowed TCP destination port; `None` means no port restriction.
    pub allowed_port: Option<u16>,
    /// Allowed process comm; `None` denies every process.
    pub allowed_comm: Option<[u8; COMM_LEN]>,
}

impl PolicySnapshot {
    /// A snapshot with neither dimension configured.
    pub const EMPTY: Self = Self {
        allowed_port: None,
        allowed_comm: None,
    };
}

/// Why an event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The comm policy was never configured (deny-by-default).
    CommUnset,
    /// The caller's comm differs from the configured one.
    CommMismatch,
    /// The destination port differs from the configured one.
    PortMismatch,
}

impl DropReason {
    /// Wire code for verdict event records.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::CommUnset => REASON_COMM_UNSET,
            Self::CommMismatch => REASON_COMM_MISMATCH,
            Self::PortMismatch => REASON_PORT_MISMATCH,
        }
    }
}

/// The engine's three-valued output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Traffic permitted by policy.
    Pass,
    /// Traffic rejected by policy, with the reason.
    Drop(DropReason),
    /// Event not subject to the policy; the hook forwards it unmodified.
    PassThrough,
}

impl Verdict {
    /// Wire code for verdict event records.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Pass => VERDICT_PASS,
            Self::Drop(_) => VERDICT_DROP,
            Self::PassThrough => VERDICT_PASS_THROUGH,
        }
    }

    /// Drop reason wire code, [`REASON_NONE`] unless this is a drop.
    #[must_use]
    pub const fn reason_code(self) -> u8 {
        match self {
            Self::Drop(reason) => reason.code(),
            Self::Pass | Self::PassThrough => REASON_NONE,
        }
    }

    /// Whether the hook must discard the event.
    #[must_use]
    pub const fn is_drop(self) -> bool {
        matches!(self, Self::Drop(_))
    }
}

/// Port-only variant: drops when a port is configured and differs.
///
/// An unset `allowed_port` places no restriction — every TCP frame passes.
#[inline(always)]
#[must_use]
pub fn decide_port_only(dst_port: u16, allowed_port: Option<u16>) -> Verdict {
    match allowed_port {
        Some(allowed) if allowed != dst_port => Verdict::Drop(DropReason::PortMismatch),
        _ => Verdict::Pass,
    }
}

/// Process+port variant: comm gate first, then the port gate.
///
/// The comm comparison covers the full fixed width — a configured name and
/// a caller name that agree on a prefix but differ in trailing bytes never
/// match. An unset comm policy rejects every caller.
#[inline(always)]
#[must_use]
pub fn decide_comm_port(
    comm: &[u8; COMM_LEN],
    dst_port: u16,
    policy: &PolicySnapshot,
) -> Verdict {
    let Some(allowed_comm) = policy.allowed_comm else {
        return Verdict::Drop(DropReason::CommUnset);
    };
    if allowed_comm != *comm {
        return Verdict::Drop(DropReason::CommMismatch);
    }
    decide_port_only(dst_port, policy.allowed_port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwarden_common::types::comm_bytes;

    fn comm(name: &str) -> [u8; COMM_LEN] {
        comm_bytes(name).expect("test comms are short")
    }

    #[test]
    fn port_only_without_config_passes_everything() {
        for port in [0, 80, 4040, u16::MAX] {
            assert_eq!(decide_port_only(port, None), Verdict::Pass);
        }
    }

    #[test]
    fn port_only_matches_the_configured_port() {
        assert_eq!(decide_port_only(4040, Some(4040)), Verdict::Pass);
        assert_eq!(
            decide_port_only(8080, Some(4040)),
            Verdict::Drop(DropReason::PortMismatch)
        );
        assert_eq!(
            decide_port_only(4041, Some(4040)),
            Verdict::Drop(DropReason::PortMismatch)
        );
    }

    #[test]
    fn comm_variant_denies_by_default() {
        let policy = PolicySnapshot {
            allowed_port: Some(4040),
            allowed_comm: None,
        };
        assert_eq!(
            decide_comm_port(&comm("curl"), 4040, &policy),
            Verdict::Drop(DropReason::CommUnset)
        );
        assert_eq!(
            decide_comm_port(&[0; COMM_LEN], 80, &PolicySnapshot::EMPTY),
            Verdict::Drop(DropReason::CommUnset)
        );
    }

    #[test]
    fn comm_variant_reference_matrix() {
        let policy = PolicySnapshot {
            allowed_port: Some(4040),
            allowed_comm: Some(comm("curl")),
        };
        assert_eq!(decide_comm_port(&comm("curl"), 4040, &policy), Verdict::Pass);
        assert_eq!(
            decide_comm_port(&comm("curl"), 80, &policy),
            Verdict::Drop(DropReason::PortMismatch)
        );
        assert_eq!(
            decide_comm_port(&comm("wget"), 4040, &policy),
            Verdict::Drop(DropReason::CommMismatch)
        );
    }

    #[test]
    fn comm_match_without_port_config_passes_any_port() {
        let policy = PolicySnapshot {
            allowed_port: None,
            allowed_comm: Some(comm("nc")),
        };
        assert_eq!(decide_comm_port(&comm("nc"), 1, &policy), Verdict::Pass);
        assert_eq!(decide_comm_port(&comm("nc"), 65535, &policy), Verdict::Pass);
    }

    #[test]
    fn comm_comparison_is_fixed_width_not_prefix() {
        let policy = PolicySnapshot {
            allowed_port: None,
            allowed_comm: Some(comm("curl")),
        };
        // A caller comm that is a proper prefix of the configured name,
        // with different trailing bytes, must not match.
        let mut prefix = comm("cu");
        prefix[2] = b'x';
        assert_eq!(
            decide_comm_port(&prefix, 4040, &policy),
            Verdict::Drop(DropReason::CommMismatch)
        );

        // Same prefix, zero-padded, still differs over the full width.
        assert_eq!(
            decide_comm_port(&comm("cu"), 4040, &policy),
            Verdict::Drop(DropReason::CommMismatch)
        );
    }

    #[test]
    fn wire_codes_follow_the_verdict() {
        assert_eq!(Verdict::Pass.code(), VERDICT_PASS);
        assert_eq!(Verdict::Pass.reason_code(), REASON_NONE);
        assert_eq!(Verdict::PassThrough.code(), VERDICT_PASS_THROUGH);
        let drop = Verdict::Drop(DropReason::CommMismatch);
        assert_eq!(drop.code(), VERDICT_DROP);
        assert_eq!(drop.reason_code(), REASON_COMM_MISMATCH);
        assert!(drop.is_drop());
        assert!(!Verdict::Pass.is_drop());
    }
}
