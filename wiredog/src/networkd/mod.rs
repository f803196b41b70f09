//! The networkd module renders `Network`s as systemd-networkd `.network` files, plus a `.netdev`
//! file for each VLAN device.
mod netdev;
mod network;

pub(crate) use netdev::NetDevConfig;
pub(crate) use network::NetworkConfig;
use std::fmt::Display;

// Prefix for generated files; keeps them ordered ahead of anything installed by packages
pub(crate) const CONFIG_FILE_PREFIX: &str = "10-";

/// systemd accepts many spellings of a boolean, but we always write `yes` and `no`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SystemdBool(bool);

impl From<bool> for SystemdBool {
    fn from(b: bool) -> Self {
        SystemdBool(b)
    }
}

impl Display for SystemdBool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            true => write!(f, "yes"),
            false => write!(f, "no"),
        }
    }
}

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display("Unable to write {} to {}: {}", what, path.display(), source))]
        NetworkDConfigWrite {
            what: String,
            path: PathBuf,
            source: io::Error,
        },
    }
}

pub(crate) use error::Error;
pub(crate) type Result<T> = std::result::Result<T, error::Error>;
