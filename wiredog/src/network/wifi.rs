use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum KeyManagement {
    None,
    Psk,
    Eap,
    #[serde(rename = "8021x")]
    Ieee8021x,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum EapMethod {
    None,
    Tls,
    Peap,
    Ttls,
}

derive_fromstr_from_deserialize!(KeyManagement);
derive_fromstr_from_deserialize!(EapMethod);

/// Credentials for one access point.  Every field is optional; unset fields are left out of the
/// supplicant configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct WifiAuthentication {
    pub(crate) key_management: Option<KeyManagement>,
    pub(crate) eap_method: Option<EapMethod>,
    pub(crate) password: Option<String>,
    pub(crate) identity: Option<String>,
    pub(crate) anonymous_identity: Option<String>,
    pub(crate) ca_certificate: Option<String>,
    pub(crate) client_certificate: Option<String>,
    pub(crate) client_key: Option<String>,
    pub(crate) client_key_password: Option<String>,
}

/// An access point, identified by its SSID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AccessPoint {
    ssid: String,
    pub(crate) auth: WifiAuthentication,
}

impl AccessPoint {
    pub(crate) fn new<S: Into<String>>(ssid: S) -> Self {
        Self {
            ssid: ssid.into(),
            auth: WifiAuthentication::default(),
        }
    }

    pub(crate) fn ssid(&self) -> &str {
        &self.ssid
    }
}
