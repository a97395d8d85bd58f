//! aya plumbing: loading the BPF object, populating and pinning the
//! policy maps, and attaching programs to their hooks.

use std::path::Path;

use aya::Ebpf;
use aya::maps::{Array, Map, MapData};
use aya::programs::{
    CgroupAttachMode, CgroupSockAddr, SchedClassifier, TcAttachType, Xdp, XdpFlags, tc,
};
use portwarden_common::constants::{
    COMM_POLICY_MAP, CONNECT4_PROGRAM, PORT_POLICY_MAP, TC_EGRESS_PROGRAM, TC_INGRESS_PROGRAM,
    XDP_PROGRAM,
};
use portwarden_common::error::{PortwardenError, Result};
use portwarden_common::types::{CommPolicy, PortPolicy};

/// Loads the compiled BPF object from `path`.
///
/// # Errors
///
/// Returns an error if the object cannot be read or fails verification.
pub fn load_object(path: &Path) -> Result<Ebpf> {
    Ebpf::load_file(path).map_err(|source| PortwardenError::ObjectLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the port policy into its map; takes effect on the next event.
///
/// # Errors
///
/// Returns an error if the map is missing or the update fails.
pub fn write_port_policy(bpf: &mut Ebpf, policy: PortPolicy) -> Result<()> {
    let map = bpf
        .map_mut(PORT_POLICY_MAP)
        .ok_or(PortwardenError::MapNotFound {
            name: PORT_POLICY_MAP,
        })?;
    let mut array: Array<&mut MapData, PortPolicy> =
        Array::try_from(map).map_err(|source| PortwardenError::Map {
            name: PORT_POLICY_MAP,
            source,
        })?;
    array.set(0, policy, 0).map_err(|source| PortwardenError::Map {
        name: PORT_POLICY_MAP,
        source,
    })
}

/// Writes the comm policy into its map; takes effect on the next event.
///
/// # Errors
///
/// Returns an error if the map is missing or the update fails.
pub fn write_comm_policy(bpf: &mut Ebpf, policy: CommPolicy) -> Result<()> {
    let map = bpf
        .map_mut(COMM_POLICY_MAP)
        .ok_or(PortwardenError::MapNotFound {
            name: COMM_POLICY_MAP,
        })?;
    let mut array: Array<&mut MapData, CommPolicy> =
        Array::try_from(map).map_err(|source| PortwardenError::Map {
            name: COMM_POLICY_MAP,
            source,
        })?;
    array.set(0, policy, 0).map_err(|source| PortwardenError::Map {
        name: COMM_POLICY_MAP,
        source,
    })
}

/// Pins both policy maps under `pin_dir` so `pwdn set` can update them
/// while the filter stays attached.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a pin fails
/// (typically because a previous pin was left behind).
pub fn pin_policy_maps(bpf: &mut Ebpf, pin_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(pin_dir).map_err(|source| PortwardenError::Io {
        path: pin_dir.to_path_buf(),
        source,
    })?;

    for name in [PORT_POLICY_MAP, COMM_POLICY_MAP] {
        let map = bpf
            .map_mut(name)
            .ok_or(PortwardenError::MapNotFound { name })?;
        map.pin(pin_dir.join(name))
            .map_err(|source| PortwardenError::Pin { name, source })?;
    }
    Ok(())
}

/// Opens the pinned port policy map for a live update.
///
/// # Errors
///
/// Returns an error if nothing is pinned at the expected path.
pub fn open_pinned_port_policy(pin_dir: &Path) -> Result<Array<MapData, PortPolicy>> {
    let data =
        MapData::from_pin(pin_dir.join(PORT_POLICY_MAP)).map_err(|source| PortwardenError::Map {
            name: PORT_POLICY_MAP,
            source,
        })?;
    Array::try_from(Map::Array(data)).map_err(|source| PortwardenError::Map {
        name: PORT_POLICY_MAP,
        source,
    })
}

/// Opens the pinned comm policy map for a live update.
///
/// # Errors
///
/// Returns an error if nothing is pinned at the expected path.
pub fn open_pinned_comm_policy(pin_dir: &Path) -> Result<Array<MapData, CommPolicy>> {
    let data =
        MapData::from_pin(pin_dir.join(COMM_POLICY_MAP)).map_err(|source| PortwardenError::Map {
            name: COMM_POLICY_MAP,
            source,
        })?;
    Array::try_from(Map::Array(data)).map_err(|source| PortwardenError::Map {
        name: COMM_POLICY_MAP,
        source,
    })
}

/// Loads and attaches the XDP port-only program to `iface`.
///
/// # Errors
///
/// Returns an error if the program is missing, fails to load, or cannot
/// attach to the interface.
pub fn attach_xdp(bpf: &mut Ebpf, iface: &str, flags: XdpFlags) -> Result<()> {
    let program: &mut Xdp = bpf
        .program_mut(XDP_PROGRAM)
        .ok_or(PortwardenError::ProgramNotFound { name: XDP_PROGRAM })?
        .try_into()
        .map_err(|source| PortwardenError::Program {
            name: XDP_PROGRAM,
            source,
        })?;
    program.load().map_err(|source| PortwardenError::Program {
        name: XDP_PROGRAM,
        source,
    })?;
    let _ = program
        .attach(iface, flags)
        .map_err(|source| PortwardenError::Program {
            name: XDP_PROGRAM,
            source,
        })?;
    Ok(())
}

/// Loads and attaches a TC classifier program to `iface` in the given
/// direction.
///
/// # Errors
///
/// Returns an error if the program is missing, fails to load, or cannot
/// attach.
pub fn attach_tc(bpf: &mut Ebpf, iface: &str, direction: TcAttachType) -> Result<()> {
    let name = match direction {
        TcAttachType::Ingress => TC_INGRESS_PROGRAM,
        _ => TC_EGRESS_PROGRAM,
    };

    // A clsact qdisc may already be installed; that failure is harmless.
    let _ = tc::qdisc_add_clsact(iface);

    let program: &mut SchedClassifier = bpf
        .program_mut(name)
        .ok_or(PortwardenError::ProgramNotFound { name })?
        .try_into()
        .map_err(|source| PortwardenError::Program { name, source })?;
    program
        .load()
        .map_err(|source| PortwardenError::Program { name, source })?;
    let _ = program
        .attach(iface, direction)
        .map_err(|source| PortwardenError::Program { name, source })?;
    Ok(())
}

/// Loads and attaches the connect4 program to the cgroup at
/// `cgroup_path`.
///
/// # Errors
///
/// Returns an error if the cgroup cannot be opened or the program is
/// missing, fails to load, or cannot attach.
pub fn attach_connect4(bpf: &mut Ebpf, cgroup_path: &Path) -> Result<()> {
    let cgroup = std::fs::File::open(cgroup_path).map_err(|source| PortwardenError::Io {
        path: cgroup_path.to_path_buf(),
        source,
    })?;

    let program: &mut CgroupSockAddr = bpf
        .program_mut(CONNECT4_PROGRAM)
        .ok_or(PortwardenError::ProgramNotFound {
            name: CONNECT4_PROGRAM,
        })?
        .try_into()
        .map_err(|source| PortwardenError::Program {
            name: CONNECT4_PROGRAM,
            source,
        })?;
    program.load().map_err(|source| PortwardenError::Program {
        name: CONNECT4_PROGRAM,
        source,
    })?;
    let _ = program
        .attach(cgroup, CgroupAttachMode::Single)
        .map_err(|source| PortwardenError::Program {
            name: CONNECT4_PROGRAM,
            source,
        })?;
    Ok(())
}
