//! `pwdn set` — Update the policy of an attached filter.
//!
//! Re-opens the maps pinned at attach time and replaces either scalar.
//! Each write is a whole-value replacement that takes effect on the next
//! event; no reload or re-attach is involved.

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use portwarden_common::constants::{COMM_LEN, DEFAULT_PIN_DIR};
use portwarden_common::error::PortwardenError;
use portwarden_common::types::{CommPolicy, PortPolicy, comm_bytes};

use crate::loader;

/// Arguments for the `set` command.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Directory the policy maps were pinned under at attach time.
    #[arg(long, default_value = DEFAULT_PIN_DIR)]
    pub pin_dir: PathBuf,

    /// New allowed TCP destination port.
    #[arg(long, conflicts_with = "clear_port")]
    pub port: Option<u16>,

    /// Remove the port restriction (every port passes the port gate).
    #[arg(long)]
    pub clear_port: bool,

    /// New allowed process name.
    #[arg(long, conflicts_with = "clear_comm")]
    pub comm: Option<String>,

    /// Clear the comm policy (the process+port hooks deny everything).
    #[arg(long)]
    pub clear_comm: bool,
}

/// Executes the `set` command.
///
/// # Errors
///
/// Returns an error if no change was requested, a value is invalid, or a
/// pinned map cannot be opened or written.
pub fn execute(args: SetArgs) -> anyhow::Result<()> {
    if args.port.is_none() && !args.clear_port && args.comm.is_none() && !args.clear_comm {
        bail!("nothing to do: pass --port/--clear-port or --comm/--clear-comm");
    }

    if let Some(policy) = port_update(&args) {
        let mut map = loader::open_pinned_port_policy(&args.pin_dir)?;
        map.set(0, policy, 0)
            .map_err(|source| PortwardenError::Map {
                name: portwarden_common::constants::PORT_POLICY_MAP,
                source,
            })?;
        match policy.get() {
            Some(port) => tracing::info!(port, "port policy replaced"),
            None => tracing::info!("port policy cleared"),
        }
    }

    if let Some(policy) = comm_update(&args)? {
        let mut map = loader::open_pinned_comm_policy(&args.pin_dir)?;
        map.set(0, policy, 0)
            .map_err(|source| PortwardenError::Map {
                name: portwarden_common::constants::COMM_POLICY_MAP,
                source,
            })?;
        match &args.comm {
            Some(name) => tracing::info!(comm = %name, "comm policy replaced"),
            None => tracing::info!("comm policy cleared"),
        }
    }

    tracing::info!("updates take effect on the next event");
    Ok(())
}

fn port_update(args: &SetArgs) -> Option<PortPolicy> {
    if args.clear_port {
        Some(PortPolicy::UNSET)
    } else {
        args.port.map(PortPolicy::new)
    }
}

fn comm_update(args: &SetArgs) -> anyhow::Result<Option<CommPolicy>> {
    if args.clear_comm {
        return Ok(Some(CommPolicy::UNSET));
    }
    match &args.comm {
        None => Ok(None),
        Some(name) => {
            let comm = comm_bytes(name).ok_or_else(|| PortwardenError::Config {
                message: format!("process name {name:?} does not fit a {COMM_LEN}-byte comm"),
            })?;
            Ok(Some(CommPolicy::new(comm)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> SetArgs {
        SetArgs {
            pin_dir: PathBuf::from(DEFAULT_PIN_DIR),
            port: None,
            clear_port: false,
            comm: None,
            clear_comm: false,
        }
    }

    #[test]
    fn port_update_prefers_clear() {
        let mut args = base_args();
        args.clear_port = true;
        assert_eq!(port_update(&args), Some(PortPolicy::UNSET));

        args.clear_port = false;
        args.port = Some(4040);
        assert_eq!(port_update(&args), Some(PortPolicy::new(4040)));

        args.port = None;
        assert_eq!(port_update(&args), None);
    }

    #[test]
    fn comm_update_rejects_oversized_names() {
        let mut args = base_args();
        args.comm = Some("a-process-name-too-long-for-a-comm".into());
        assert!(comm_update(&args).is_err());

        args.comm = Some("nc".into());
        let policy = comm_update(&args).expect("valid name").expect("update");
        assert_eq!(policy.get().map(|c| c[0]), Some(b'n'));
    }
}
