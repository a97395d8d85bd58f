//! Verdict event consumption and reporting.
//!
//! The kernel programs publish one record per policy decision; this
//! module drains the perf array on every online CPU and reports each
//! record through `tracing`.

use anyhow::{Context, anyhow};
use aya::Ebpf;
use aya::maps::perf::{AsyncPerfEventArray, Events};
use aya::util::online_cpus;
use bytes::BytesMut;
use portwarden_common::constants::{
    HOOK_CONNECT4, HOOK_TC_EGRESS, HOOK_TC_INGRESS, HOOK_XDP, REASON_COMM_MISMATCH,
    REASON_COMM_UNSET, REASON_PORT_MISMATCH, VERDICT_DROP, VERDICT_EVENTS_MAP,
};
use portwarden_common::types::{VerdictEvent, comm_display};

/// Human-readable hook name for a hook id.
const fn hook_name(hook: u8) -> &'static str {
    match hook {
        HOOK_XDP => "xdp",
        HOOK_TC_INGRESS => "tc-ingress",
        HOOK_TC_EGRESS => "tc-egress",
        HOOK_CONNECT4 => "connect4",
        _ => "unknown",
    }
}

/// Human-readable reason for a drop reason code.
const fn reason_name(reason: u8) -> &'static str {
    match reason {
        REASON_COMM_UNSET => "comm-unset",
        REASON_COMM_MISMATCH => "comm-mismatch",
        REASON_PORT_MISMATCH => "port-mismatch",
        _ => "none",
    }
}

/// Reports one decision record.
fn report(event: &VerdictEvent) {
    let hook = hook_name(event.hook);
    let comm = comm_display(&event.comm);
    if event.verdict == VERDICT_DROP {
        tracing::warn!(
            hook,
            comm,
            dst_port = event.dst_port,
            reason = reason_name(event.reason),
            "dropped"
        );
    } else {
        tracing::info!(hook, comm, dst_port = event.dst_port, "passed");
    }
}

/// Takes the verdict perf array out of `bpf` and spawns one reader task
/// per online CPU.
///
/// # Errors
///
/// Returns an error if the map is missing or a per-CPU buffer cannot be
/// opened.
pub fn spawn_verdict_readers(bpf: &mut Ebpf) -> anyhow::Result<()> {
    let map = bpf
        .take_map(VERDICT_EVENTS_MAP)
        .ok_or_else(|| anyhow!("{VERDICT_EVENTS_MAP} map not found"))?;
    let mut events = AsyncPerfEventArray::try_from(map)?;

    let cpus = online_cpus().map_err(|(msg, err)| anyhow!("{msg}: {err}"))?;
    for cpu_id in cpus {
        let mut buf = events
            .open(cpu_id, None)
            .with_context(|| format!("failed to open perf buffer on CPU {cpu_id}"))?;

        let _ = tokio::spawn(async move {
            let mut buffers = (0..16)
                .map(|_| BytesMut::with_capacity(core::mem::size_of::<VerdictEvent>()))
                .collect::<Vec<_>>();

            loop {
                let Events { read, lost } = match buf.read_events(&mut buffers).await {
                    Ok(events) => events,
                    Err(error) => {
                        tracing::error!(%error, "perf buffer read failure");
                        continue;
                    }
                };

                if lost > 0 {
                    tracing::warn!(lost, "perf buffer lost events");
                }

                for buffer in buffers.iter_mut().take(read) {
                    if buffer.len() < core::mem::size_of::<VerdictEvent>() {
                        tracing::warn!(
                            len = buffer.len(),
                            expected = core::mem::size_of::<VerdictEvent>(),
                            "perf buffer returned undersized payload"
                        );
                        buffer.clear();
                        continue;
                    }

                    let event =
                        unsafe { (buffer.as_ptr() as *const VerdictEvent).read_unaligned() };
                    report(&event);
                    buffer.clear();
                }
            }
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwarden_common::constants::{COMM_LEN, REASON_NONE, VERDICT_PASS};

    #[test]
    fn hook_and_reason_names_cover_all_codes() {
        assert_eq!(hook_name(HOOK_XDP), "xdp");
        assert_eq!(hook_name(HOOK_TC_INGRESS), "tc-ingress");
        assert_eq!(hook_name(HOOK_TC_EGRESS), "tc-egress");
        assert_eq!(hook_name(HOOK_CONNECT4), "connect4");
        assert_eq!(reason_name(REASON_NONE), "none");
        assert_eq!(reason_name(REASON_COMM_UNSET), "comm-unset");
        assert_eq!(reason_name(REASON_COMM_MISMATCH), "comm-mismatch");
        assert_eq!(reason_name(REASON_PORT_MISMATCH), "port-mismatch");
    }

    #[test]
    fn report_accepts_a_pass_record() {
        // Exercise the formatting path; output goes to the subscriber.
        report(&VerdictEvent {
            comm: [0; COMM_LEN],
            dst_port: 4040,
            verdict: VERDICT_PASS,
            reason: REASON_NONE,
            hook: HOOK_XDP,
            _pad: [0; 3],
        });
    }
}
