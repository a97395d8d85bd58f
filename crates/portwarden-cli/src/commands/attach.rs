//! `pwdn attach` — Load the filter, configure it, and attach it to a hook.

use std::path::PathBuf;

use anyhow::Context;
use aya::programs::{TcAttachType, XdpFlags};
use aya_log::EbpfLogger;
use clap::{Args, ValueEnum};
use portwarden_common::constants::COMM_LEN;
use portwarden_common::error::PortwardenError;
use portwarden_common::types::{CommPolicy, PortPolicy, comm_bytes};

use crate::{events, loader};

/// Hook point to attach the filter to.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Earliest-drop packet hook; enforces the port dimension only.
    Xdp,
    /// Ingress classifier; enforces process identity and port.
    TcIngress,
    /// Egress classifier; enforces process identity and port.
    TcEgress,
    /// Outbound-connection hook; enforces process identity and port.
    Connect4,
}

/// XDP attach mode.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum XdpMode {
    /// Generic (skb) mode, available on every driver.
    Skb,
    /// Native driver mode.
    Driver,
}

impl XdpMode {
    const fn flags(self) -> XdpFlags {
        match self {
            Self::Skb => XdpFlags::SKB_MODE,
            Self::Driver => XdpFlags::DRV_MODE,
        }
    }
}

/// Arguments for the `attach` command.
#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Hook to attach the filter to.
    #[arg(long, value_enum)]
    pub hook: Hook,

    /// Network interface to attach to (packet hooks).
    #[arg(long)]
    pub iface: Option<String>,

    /// Cgroup v2 path to attach to (connect4 hook).
    #[arg(long, default_value = "/sys/fs/cgroup")]
    pub cgroup: PathBuf,

    /// Compiled BPF object file.
    #[arg(long, default_value = "portwarden-ebpf.bpf.o")]
    pub obj: PathBuf,

    /// Allowed TCP destination port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Allowed process name (required for the process+port hooks to pass
    /// anything: an unset comm policy denies every process).
    #[arg(long)]
    pub comm: Option<String>,

    /// Pin the policy maps under this bpffs directory so `pwdn set` can
    /// update them live.
    #[arg(long)]
    pub pin_dir: Option<PathBuf>,

    /// XDP attach mode.
    #[arg(long, value_enum, default_value = "skb")]
    pub xdp_mode: XdpMode,
}

/// Executes the `attach` command.
///
/// # Errors
///
/// Returns an error if loading, configuration, pinning, or attachment
/// fails.
pub async fn execute(args: AttachArgs) -> anyhow::Result<()> {
    let mut bpf = loader::load_object(&args.obj)?;
    if let Err(error) = EbpfLogger::init(&mut bpf) {
        tracing::warn!(%error, "failed to initialize eBPF logger");
    }

    if let Some(port) = args.port {
        loader::write_port_policy(&mut bpf, PortPolicy::new(port))?;
        tracing::info!(port, "port policy installed");
    }
    if let Some(name) = &args.comm {
        let comm = comm_bytes(name).ok_or_else(|| PortwardenError::Config {
            message: format!("process name {name:?} does not fit a {COMM_LEN}-byte comm"),
        })?;
        loader::write_comm_policy(&mut bpf, CommPolicy::new(comm))?;
        tracing::info!(comm = %name, "comm policy installed");
    }

    if let Some(pin_dir) = &args.pin_dir {
        loader::pin_policy_maps(&mut bpf, pin_dir)?;
        tracing::info!(pin_dir = %pin_dir.display(), "policy maps pinned");
    }

    match args.hook {
        Hook::Xdp => {
            let iface = packet_iface(&args)?;
            loader::attach_xdp(&mut bpf, iface, args.xdp_mode.flags())?;
            tracing::info!(iface, "XDP port filter attached");
        }
        Hook::TcIngress => {
            let iface = packet_iface(&args)?;
            loader::attach_tc(&mut bpf, iface, TcAttachType::Ingress)?;
            tracing::info!(iface, "TC ingress filter attached");
        }
        Hook::TcEgress => {
            let iface = packet_iface(&args)?;
            loader::attach_tc(&mut bpf, iface, TcAttachType::Egress)?;
            tracing::info!(iface, "TC egress filter attached");
        }
        Hook::Connect4 => {
            loader::attach_connect4(&mut bpf, &args.cgroup)?;
            tracing::info!(cgroup = %args.cgroup.display(), "connect4 filter attached");
        }
    }

    events::spawn_verdict_readers(&mut bpf)?;

    tracing::info!("filter running; press Ctrl-C to detach");
    tokio::signal::ctrl_c()
        .await
        .context("failed while waiting for ctrl-c")?;
    tracing::info!("detaching and shutting down");

    Ok(())
}

fn packet_iface(args: &AttachArgs) -> anyhow::Result<&str> {
    args.iface
        .as_deref()
        .context("--iface is required for packet hooks")
}
