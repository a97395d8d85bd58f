//! `pwdn check` — Dry-run the decision engine in userspace.
//!
//! Evaluates the same engine code the kernel adapters run, against either
//! a destination port (connect-style event) or a hex-encoded raw frame
//! (packet-style event), and prints the verdict. Useful for validating a
//! policy before attaching it.

use anyhow::{Context, ensure};
use clap::{Args, ValueEnum};
use portwarden_common::constants::COMM_LEN;
use portwarden_common::error::PortwardenError;
use portwarden_common::types::comm_bytes;
use portwarden_engine::parse::parse_frame;
use portwarden_engine::policy::{
    DropReason, PolicySnapshot, Verdict, decide_comm_port, decide_port_only,
};
use portwarden_engine::store::PolicyStore;
use serde::Serialize;

/// Which decision variant to evaluate.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Port dimension only (the XDP hook's behavior).
    PortOnly,
    /// Process identity and port (the TC and connect4 hooks' behavior).
    CommPort,
}

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Decision variant to evaluate.
    #[arg(long, value_enum, default_value = "comm-port")]
    pub variant: Variant,

    /// Allowed TCP destination port to evaluate against.
    #[arg(long)]
    pub allowed_port: Option<u16>,

    /// Allowed process name to evaluate against.
    #[arg(long)]
    pub allowed_comm: Option<String>,

    /// Destination port of the simulated event (connect-style input).
    #[arg(long, conflicts_with = "frame_hex")]
    pub port: Option<u16>,

    /// Hex-encoded raw frame to parse (packet-style input).
    #[arg(long)]
    pub frame_hex: Option<String>,

    /// Comm of the simulated caller. Unset simulates a caller whose comm
    /// could not be read (a zeroed buffer).
    #[arg(long)]
    pub comm: Option<String>,

    /// Emit the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Evaluation result for reporting.
#[derive(Serialize, Debug)]
struct CheckReport {
    variant: &'static str,
    dst_port: Option<u16>,
    verdict: &'static str,
    reason: Option<&'static str>,
}

/// Executes the `check` command.
///
/// # Errors
///
/// Returns an error if the inputs are missing or malformed.
pub fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let allowed_comm = match &args.allowed_comm {
        None => None,
        Some(name) => Some(comm_bytes(name).ok_or_else(|| PortwardenError::Config {
            message: format!("process name {name:?} does not fit a {COMM_LEN}-byte comm"),
        })?),
    };

    // The same store discipline the userspace pipeline uses: install the
    // snapshot, then read it back per event.
    let store = PolicyStore::with_snapshot(PolicySnapshot {
        allowed_port: args.allowed_port,
        allowed_comm,
    });
    let policy = store.load();

    let caller_comm = match &args.comm {
        None => [0u8; COMM_LEN],
        Some(name) => comm_bytes(name).ok_or_else(|| PortwardenError::Config {
            message: format!("process name {name:?} does not fit a {COMM_LEN}-byte comm"),
        })?,
    };

    let dst_port = resolve_dst_port(&args)?;
    let verdict = match dst_port {
        None => Verdict::PassThrough,
        Some(port) => match args.variant {
            Variant::PortOnly => decide_port_only(port, policy.allowed_port),
            Variant::CommPort => decide_comm_port(&caller_comm, port, &policy),
        },
    };

    let report = CheckReport {
        variant: match args.variant {
            Variant::PortOnly => "port-only",
            Variant::CommPort => "comm-port",
        },
        dst_port,
        verdict: verdict_name(verdict),
        reason: reason_name(verdict),
    };
    print_report(&report, args.json)?;
    Ok(())
}

/// Destination port of the simulated event: taken directly for
/// connect-style input, parsed out of the frame for packet-style input.
/// `None` means the frame was not subject to the policy.
fn resolve_dst_port(args: &CheckArgs) -> anyhow::Result<Option<u16>> {
    if let Some(port) = args.port {
        return Ok(Some(port));
    }
    let hex = args
        .frame_hex
        .as_deref()
        .context("pass --port or --frame-hex to describe the event")?;
    let frame = decode_hex(hex)?;
    Ok(parse_frame(frame.as_slice())
        .ok()
        .map(|headers| headers.tcp_dest_port))
}

fn decode_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    ensure!(
        cleaned.len() % 2 == 0,
        "hex frame must have an even number of digits"
    );
    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte at offset {i}"))
        })
        .collect()
}

const fn verdict_name(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "pass",
        Verdict::Drop(_) => "drop",
        Verdict::PassThrough => "pass-through",
    }
}

const fn reason_name(verdict: Verdict) -> Option<&'static str> {
    match verdict {
        Verdict::Drop(DropReason::CommUnset) => Some("comm-unset"),
        Verdict::Drop(DropReason::CommMismatch) => Some("comm-mismatch"),
        Verdict::Drop(DropReason::PortMismatch) => Some("port-mismatch"),
        Verdict::Pass | Verdict::PassThrough => None,
    }
}

#[allow(clippy::print_stdout)]
fn print_report(report: &CheckReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        match (report.dst_port, report.reason) {
            (Some(port), Some(reason)) => {
                println!("{} (dst port {port}): {}", report.verdict, reason);
            }
            (Some(port), None) => println!("{} (dst port {port})", report.verdict),
            (None, _) => println!("{} (frame not subject to the policy)", report.verdict),
        }
    }
    Ok(())
}
