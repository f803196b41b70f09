//! The wpa_supplicant module renders a `Network`'s access points as a wpa_supplicant
//! configuration file, one `network={}` block per access point.
use crate::network::{AccessPoint, EapMethod, KeyManagement, Network};
use crate::parse::is_quotable;
use snafu::ResultExt;
use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "wpa_supplicant-";
const FILE_EXT: &str = "conf";
const CTRL_INTERFACE: &str = "DIR=/run/wpa_supplicant GROUP=wheel";

/// The supplicant configuration for one interface.
#[derive(Debug)]
pub(crate) struct WpaSupplicantConfig {
    interface: String,
    networks: Vec<WpaNetwork>,
}

#[derive(Debug)]
struct WpaNetwork {
    ssid: String,
    key_mgmt: Option<&'static str>,
    eap: Option<&'static str>,
    identity: Option<String>,
    anonymous_identity: Option<String>,
    psk: Option<String>,
    password: Option<String>,
    ca_cert: Option<String>,
    client_cert: Option<String>,
    private_key: Option<String>,
    private_key_passwd: Option<String>,
}

fn key_mgmt(key_management: KeyManagement) -> Option<&'static str> {
    match key_management {
        KeyManagement::None => None,
        KeyManagement::Psk => Some("WPA-PSK"),
        KeyManagement::Eap => Some("WPA-EAP"),
        KeyManagement::Ieee8021x => Some("IEEE8021X"),
    }
}

fn eap(method: EapMethod) -> Option<&'static str> {
    match method {
        EapMethod::None => None,
        EapMethod::Tls => Some("TLS"),
        EapMethod::Peap => Some("PEAP"),
        EapMethod::Ttls => Some("TTLS"),
    }
}

/// wpa_supplicant reads a quoted value up to the next `"`, so anything that can't sit between
/// quotes is left out rather than written
fn quoted(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| is_quotable(v))
}

/// An SSID is arbitrary bytes.  Those that can't be quoted are written as unquoted hex, which
/// wpa_supplicant also accepts.
fn ssid_value(ssid: &str) -> String {
    if is_quotable(ssid) {
        return format!("\"{}\"", ssid);
    }
    ssid.bytes().map(|b| format!("{:02x}", b)).collect()
}

impl From<&AccessPoint> for WpaNetwork {
    fn from(access_point: &AccessPoint) -> Self {
        let auth = &access_point.auth;
        // A pre-shared key is written as `psk`, any other secret as `password`
        let secret = quoted(&auth.password);
        let (psk, password) = match auth.key_management {
            Some(KeyManagement::Psk) => (secret, None),
            _ => (None, secret),
        };

        Self {
            ssid: access_point.ssid().to_string(),
            key_mgmt: auth.key_management.and_then(key_mgmt),
            eap: auth.eap_method.and_then(eap),
            identity: quoted(&auth.identity),
            anonymous_identity: quoted(&auth.anonymous_identity),
            psk,
            password,
            ca_cert: quoted(&auth.ca_certificate),
            client_cert: quoted(&auth.client_certificate),
            private_key: quoted(&auth.client_key),
            private_key_passwd: quoted(&auth.client_key_password),
        }
    }
}

impl Display for WpaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "network={{")?;
        writeln!(f, "\tssid={}", ssid_value(&self.ssid))?;
        if let Some(key_mgmt) = self.key_mgmt {
            writeln!(f, "\tkey_mgmt={}", key_mgmt)?;
        }
        if let Some(eap) = self.eap {
            writeln!(f, "\teap={}", eap)?;
        }

        let quoted = [
            ("identity", &self.identity),
            ("anonymous_identity", &self.anonymous_identity),
            ("psk", &self.psk),
            ("password", &self.password),
            ("ca_cert", &self.ca_cert),
            ("client_cert", &self.client_cert),
            ("private_key", &self.private_key),
            ("private_key_passwd", &self.private_key_passwd),
        ];
        for (key, value) in quoted {
            if let Some(value) = value {
                writeln!(f, "\t{}=\"{}\"", key, value)?;
            }
        }
        writeln!(f, "}}")
    }
}

impl From<&Network> for WpaSupplicantConfig {
    fn from(network: &Network) -> Self {
        Self {
            interface: network.identity().stem(),
            networks: network.access_points().map(WpaNetwork::from).collect(),
        }
    }
}

impl Display for WpaSupplicantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ctrl_interface={}", CTRL_INTERFACE)?;
        writeln!(f, "update_config=1")?;
        for network in &self.networks {
            write!(f, "\n{}", network)?;
        }
        Ok(())
    }
}

impl WpaSupplicantConfig {
    /// Write the config to `config_dir`, returning the path written
    pub(crate) fn write_config_file<P: AsRef<Path>>(&self, config_dir: P) -> Result<PathBuf> {
        let cfg_path = self.config_path(config_dir);

        fs::write(&cfg_path, self.to_string()).context(error::WpaSupplicantConfigWriteSnafu {
            path: &cfg_path,
        })?;
        Ok(cfg_path)
    }

    pub(crate) fn config_path<P: AsRef<Path>>(&self, config_dir: P) -> PathBuf {
        let filename = format!("{}{}.{}", FILE_PREFIX, self.interface, FILE_EXT);
        config_dir.as_ref().join(filename)
    }
}

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display("Unable to write wpa_supplicant config to {}: {}", path.display(), source))]
        WpaSupplicantConfigWrite { path: PathBuf, source: io::Error },
    }
}

pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;
