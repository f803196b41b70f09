//! Enumerated settings.  Each is parsed from, and displayed as, the name systemd-networkd uses for
//! it, unless noted otherwise.
use crate::parse::{self, parse_bool, parse_mode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum DhcpClient {
    No,
    Yes,
    Ipv4,
    Ipv6,
}

impl DhcpClient {
    /// Boolean tokens are accepted alongside the mode names.
    pub(crate) fn parse(input: &str) -> parse::Result<Self> {
        match parse_bool(input) {
            Ok(true) => Ok(DhcpClient::Yes),
            Ok(false) => Ok(DhcpClient::No),
            Err(_) => parse_mode("DHCP mode", input),
        }
    }

    /// The mode implied by the individual per-protocol switches
    pub(crate) fn from_protocols(dhcp4: Option<bool>, dhcp6: Option<bool>) -> Option<Self> {
        match (dhcp4, dhcp6) {
            (None, None) => None,
            (Some(true), Some(true)) => Some(DhcpClient::Yes),
            (Some(true), _) => Some(DhcpClient::Ipv4),
            (_, Some(true)) => Some(DhcpClient::Ipv6),
            _ => Some(DhcpClient::No),
        }
    }
}

/// The dracut `ip=` autoconfiguration methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum DracutDhcpMode {
    None,
    Off,
    Dhcp,
    On,
    Any,
    Dhcp6,
    Auto6,
    Either6,
    Ibft,
}

impl DracutDhcpMode {
    /// The equivalent systemd-networkd setting.  networkd has no router-advertisement-only or
    /// firmware-table mode, so `auto6`/`either6` become `ipv6` and `ibft` becomes `ipv4`.
    pub(crate) fn networkd_mode(self) -> DhcpClient {
        match self {
            DracutDhcpMode::None | DracutDhcpMode::Off => DhcpClient::No,
            DracutDhcpMode::On | DracutDhcpMode::Any => DhcpClient::Yes,
            DracutDhcpMode::Dhcp | DracutDhcpMode::Ibft => DhcpClient::Ipv4,
            DracutDhcpMode::Dhcp6 | DracutDhcpMode::Auto6 | DracutDhcpMode::Either6 => {
                DhcpClient::Ipv6
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ClientIdentifier {
    Mac,
    Duid,
    DuidOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum LinkLocalAddressing {
    Yes,
    No,
    Ipv4,
    Ipv6,
    Fallback,
    Ipv4Fallback,
}

impl LinkLocalAddressing {
    pub(crate) fn parse(input: &str) -> parse::Result<Self> {
        match parse_bool(input) {
            Ok(true) => Ok(LinkLocalAddressing::Yes),
            Ok(false) => Ok(LinkLocalAddressing::No),
            Err(_) => parse_mode("link-local addressing mode", input),
        }
    }

    /// Build the mode from a list of address families, e.g. `[ipv4, ipv6]`
    pub(crate) fn from_families<'a, I>(families: I) -> parse::Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (mut v4, mut v6) = (false, false);
        for family in families {
            match parse_mode("link-local address family", family)? {
                LinkLocalAddressing::Ipv4 => v4 = true,
                LinkLocalAddressing::Ipv6 => v6 = true,
                _ => {
                    return Err(parse::Error::InvalidValue {
                        kind: "link-local address family",
                        input: family.to_string(),
                    })
                }
            }
        }

        Ok(match (v4, v6) {
            (true, true) => LinkLocalAddressing::Yes,
            (true, false) => LinkLocalAddressing::Ipv4,
            (false, true) => LinkLocalAddressing::Ipv6,
            (false, false) => LinkLocalAddressing::No,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Ipv6AddressGeneration {
    Eui64,
    None,
    StablePrivacy,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Ipv6Privacy {
    No,
    Yes,
    PreferPublic,
}

impl Ipv6Privacy {
    pub(crate) fn parse(input: &str) -> parse::Result<Self> {
        match parse_bool(input) {
            Ok(true) => Ok(Ipv6Privacy::Yes),
            Ok(false) => Ok(Ipv6Privacy::No),
            Err(_) => parse_mode("IPv6 privacy mode", input),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum RequiredFamily {
    Ipv4,
    Ipv6,
    Both,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ActivationPolicy {
    Up,
    AlwaysUp,
    Manual,
    AlwaysDown,
    Down,
    Bound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum RouteType {
    Unicast,
    Local,
    Broadcast,
    Anycast,
    Multicast,
    Blackhole,
    Unreachable,
    Prohibit,
    Throw,
    Nat,
    Xresolve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum RouteScope {
    Global,
    Site,
    Link,
    Host,
    Nowhere,
}

/// How long an address stays preferred.  Only the two values networkd accepts are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub(crate) enum AddressLifetime {
    #[serde(rename = "forever", alias = "infinity")]
    Forever,
    #[serde(rename = "0")]
    Zero,
}

// Implement `from_str()` and `fmt()` in terms of the serde names above
derive_fromstr_from_deserialize!(DhcpClient);
derive_display_from_serialize!(DhcpClient);
derive_fromstr_from_deserialize!(DracutDhcpMode);
derive_display_from_serialize!(DracutDhcpMode);
derive_fromstr_from_deserialize!(ClientIdentifier);
derive_display_from_serialize!(ClientIdentifier);
derive_fromstr_from_deserialize!(LinkLocalAddressing);
derive_display_from_serialize!(LinkLocalAddressing);
derive_fromstr_from_deserialize!(Ipv6AddressGeneration);
derive_display_from_serialize!(Ipv6AddressGeneration);
derive_fromstr_from_deserialize!(Ipv6Privacy);
derive_display_from_serialize!(Ipv6Privacy);
derive_fromstr_from_deserialize!(RequiredFamily);
derive_display_from_serialize!(RequiredFamily);
derive_fromstr_from_deserialize!(ActivationPolicy);
derive_display_from_serialize!(ActivationPolicy);
derive_fromstr_from_deserialize!(RouteType);
derive_display_from_serialize!(RouteType);
derive_fromstr_from_deserialize!(RouteScope);
derive_display_from_serialize!(RouteScope);
derive_fromstr_from_deserialize!(AddressLifetime);
derive_display_from_serialize!(AddressLifetime);
