use super::{error, Result, CONFIG_FILE_PREFIX};
use crate::interface_id::InterfaceName;
use crate::network::{Network, VlanId};
use snafu::ResultExt;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use systemd_derive::{SystemdUnit, SystemdUnitSection};

/// A `.netdev` file, which creates a virtual device for networkd to configure.
#[derive(Debug)]
pub(crate) struct NetDevConfig {
    name: InterfaceName,
    unit: NetDevUnit,
}

#[derive(Debug, Default, SystemdUnit)]
struct NetDevUnit {
    netdev: Option<NetDevSection>,
    vlan: Option<VlanSection>,
}

#[derive(Debug, Default, SystemdUnitSection)]
#[systemd(section = "NetDev")]
struct NetDevSection {
    #[systemd(entry = "Name")]
    name: Option<InterfaceName>,
    #[systemd(entry = "Kind")]
    kind: Option<NetDevKind>,
}

#[derive(Debug, Default, SystemdUnitSection)]
#[systemd(section = "VLAN")]
struct VlanSection {
    #[systemd(entry = "Id")]
    id: Option<VlanId>,
}

#[derive(Debug)]
enum NetDevKind {
    Vlan,
}

impl Display for NetDevKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetDevKind::Vlan => write!(f, "vlan"),
        }
    }
}

impl NetDevConfig {
    const FILE_EXT: &'static str = "netdev";

    /// The device behind `network`, if it describes one.  A VLAN needs a name, an ID and a link
    /// before networkd can create it.
    pub(crate) fn from_network(network: &Network) -> Option<Self> {
        let vlan = network.vlan.as_ref()?;
        let name = network.identity().name.clone()?;
        let id = vlan.id?;
        vlan.link.as_ref()?;

        Some(Self {
            unit: NetDevUnit {
                netdev: Some(NetDevSection {
                    name: Some(name.clone()),
                    kind: Some(NetDevKind::Vlan),
                }),
                vlan: Some(VlanSection { id: Some(id) }),
            },
            name,
        })
    }

    /// Write the config to the proper directory with the proper prefix and file extension
    pub(crate) fn write_config_file<P: AsRef<Path>>(&self, config_dir: P) -> Result<PathBuf> {
        let cfg_path = self.config_path(config_dir);

        fs::write(&cfg_path, self.to_string()).context(error::NetworkDConfigWriteSnafu {
            what: "netdev config",
            path: &cfg_path,
        })?;
        Ok(cfg_path)
    }

    /// Build the proper prefixed path for the config file
    pub(crate) fn config_path<P: AsRef<Path>>(&self, config_dir: P) -> PathBuf {
        let filename = format!("{}{}.{}", CONFIG_FILE_PREFIX, self.name, Self::FILE_EXT);
        config_dir.as_ref().join(filename)
    }
}

impl Display for NetDevConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.unit)
    }
}
