//! Schema tables map a YAML key to the function that converts its value and stores it.  There is
//! one table per section; the type parameter of each table is the record its setters write to.
use super::node::Node;
use crate::network::{
    AccessPoint, AddressOptions, Dhcp4Overrides, Dhcp6Overrides, DhcpClient, DhcpMode, Identity,
    Ipv6Privacy, KeyManagement, LinkLocalAddressing, Network, Route, RouteTo, RoutingPolicyRule,
    Vlan,
};
use crate::parse::{
    self, parse_bool, parse_interface_name, parse_ip_addr, parse_ip_net, parse_mac, parse_mode,
    parse_quotable, parse_unsigned, parse_vlan_id,
};
use snafu::{OptionExt, ResultExt, Snafu};
use std::convert::TryFrom;
use std::net::IpAddr;
use std::str::FromStr;

/// The key that starts a new access point in the `access-points` section.
pub(crate) const SSID_KEY: &str = "ssid-name";

/// Converts a value and writes it into `T`.
pub(crate) type Setter<T> = fn(&mut T, &Node) -> Result<()>;

pub(crate) struct Entry<T> {
    pub(crate) key: &'static str,
    pub(crate) set: Setter<T>,
}

/// Find the entry for `key`.  Keys are matched exactly.
pub(crate) fn lookup<T>(table: &'static [Entry<T>], key: &str) -> Option<&'static Entry<T>> {
    table.iter().find(|entry| entry.key == key)
}

/// The named sections that can appear inside an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Match,
    Dhcp4Overrides,
    Dhcp6Overrides,
    Addresses,
    Nameservers,
    Routes,
    RoutingPolicy,
    AccessPoints,
}

impl Section {
    const ALL: [Section; 8] = [
        Section::Match,
        Section::Dhcp4Overrides,
        Section::Dhcp6Overrides,
        Section::Addresses,
        Section::Nameservers,
        Section::Routes,
        Section::RoutingPolicy,
        Section::AccessPoints,
    ];

    pub(crate) fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.name() == key)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Section::Match => "match",
            Section::Dhcp4Overrides => "dhcp4-overrides",
            Section::Dhcp6Overrides => "dhcp6-overrides",
            Section::Addresses => "addresses",
            Section::Nameservers => "nameservers",
            Section::Routes => "routes",
            Section::RoutingPolicy => "routing-policy",
            Section::AccessPoints => "access-points",
        }
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=
// Value conversions shared by the tables

fn scalar(value: &Node) -> Result<&str> {
    value.as_scalar().context(ExpectedScalarSnafu {
        found: value.kind(),
    })
}

/// A single value or a sequence of values
fn scalars(value: &Node) -> Result<Vec<&str>> {
    match value {
        Node::Scalar(s) if s.is_empty() => Ok(Vec::new()),
        Node::Scalar(s) => Ok(vec![s.as_str()]),
        Node::Sequence(items) => items.iter().map(scalar).collect(),
        Node::Mapping(_) => ExpectedScalarsSnafu {
            found: value.kind(),
        }
        .fail(),
    }
}

fn text(value: &Node) -> Result<String> {
    scalar(value).map(String::from)
}

/// Text that wpa_supplicant will read back from between double quotes
fn quotable(value: &Node) -> Result<String> {
    parse_quotable(scalar(value)?)
        .map(String::from)
        .context(ConvertSnafu)
}

fn boolean(value: &Node) -> Result<bool> {
    parse_bool(scalar(value)?).context(ConvertSnafu)
}

fn unsigned<T: TryFrom<u64>>(value: &Node) -> Result<T> {
    parse_unsigned(scalar(value)?).context(ConvertSnafu)
}

fn ip_addrs(value: &Node) -> Result<Vec<IpAddr>> {
    scalars(value)?
        .into_iter()
        .map(parse_ip_addr)
        .collect::<parse::Result<Vec<_>>>()
        .context(ConvertSnafu)
}

fn mode<T: FromStr>(kind: &'static str, value: &Node) -> Result<T> {
    parse_mode(kind, scalar(value)?).context(ConvertSnafu)
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=
// Tables

pub(crate) static MATCH_TABLE: &[Entry<Identity>] = &[
    Entry {
        key: "name",
        set: |id, v| {
            id.name = Some(parse_interface_name(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "macaddress",
        set: |id, v| {
            id.mac = Some(parse_mac(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "driver",
        set: |id, v| {
            id.drivers = scalars(v)?.into_iter().map(String::from).collect();
            Ok(())
        },
    },
];

pub(crate) static NETWORK_TABLE: &[Entry<Network>] = &[
    Entry {
        key: "unmanaged",
        set: |n, v| {
            n.link.unmanaged = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "mtu",
        set: |n, v| {
            n.link.mtu = Some(unsigned(v)?);
            Ok(())
        },
    },
    Entry {
        key: "arp",
        set: |n, v| {
            n.link.arp = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "multicast",
        set: |n, v| {
            n.link.multicast = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "allmulticast",
        set: |n, v| {
            n.link.all_multicast = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "promiscuous",
        set: |n, v| {
            n.link.promiscuous = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "required-for-online",
        set: |n, v| {
            n.link.required_for_online = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "required-family-for-online",
        set: |n, v| {
            n.link.required_family_for_online = Some(mode("required family", v)?);
            Ok(())
        },
    },
    Entry {
        key: "activation-mode",
        set: |n, v| {
            n.link.activation_policy = Some(mode("activation mode", v)?);
            Ok(())
        },
    },
    Entry {
        key: "macaddress",
        set: |n, v| {
            n.link.mac = Some(parse_mac(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "dhcp",
        set: |n, v| {
            let mode = DhcpClient::parse(scalar(v)?).context(ConvertSnafu)?;
            n.dhcp = Some(DhcpMode::Networkd(mode));
            Ok(())
        },
    },
    Entry {
        key: "dhcp4",
        set: |n, v| {
            n.dhcp4 = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "dhcp6",
        set: |n, v| {
            n.dhcp6 = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "dhcp-identifier",
        set: |n, v| {
            n.dhcp_identifier = Some(mode("DHCP client identifier", v)?);
            Ok(())
        },
    },
    Entry {
        key: "lldp",
        set: |n, v| {
            n.lldp = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "emit-lldp",
        set: |n, v| {
            n.emit_lldp = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "accept-ra",
        set: |n, v| {
            n.accept_ra = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "link-local",
        set: |n, v| {
            let mode = match v {
                Node::Sequence(_) => LinkLocalAddressing::from_families(scalars(v)?),
                _ => LinkLocalAddressing::parse(scalar(v)?),
            };
            n.link_local = Some(mode.context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "ipv6-address-generation",
        set: |n, v| {
            n.ipv6_address_generation = Some(mode("IPv6 address generation mode", v)?);
            Ok(())
        },
    },
    Entry {
        key: "ipv6-privacy",
        set: |n, v| {
            n.ipv6_privacy = Some(Ipv6Privacy::parse(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "ipv6-mtu",
        set: |n, v| {
            n.ipv6_mtu = Some(unsigned(v)?);
            Ok(())
        },
    },
    Entry {
        key: "ntp",
        set: |n, v| {
            for server in ip_addrs(v)? {
                n.add_ntp_server(server);
            }
            Ok(())
        },
    },
    Entry {
        key: "gateway4",
        set: |n, v| {
            n.gateway = Some(parse_ip_addr(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "gateway6",
        set: |n, v| {
            n.gateway = Some(parse_ip_addr(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "domains",
        set: |n, v| {
            for domain in scalars(v)? {
                n.add_search_domain(domain);
            }
            Ok(())
        },
    },
];

/// Keys only a `vlans` selector understands.  Everything else in its body is ordinary network
/// configuration for the VLAN device.
pub(crate) static VLAN_TABLE: &[Entry<Network>] = &[
    Entry {
        key: "id",
        set: |n, v| {
            let id = parse_vlan_id(scalar(v)?).context(ConvertSnafu)?;
            n.vlan.get_or_insert_with(Vlan::default).id = Some(id);
            Ok(())
        },
    },
    Entry {
        key: "link",
        set: |n, v| {
            let link = parse_interface_name(scalar(v)?).context(ConvertSnafu)?;
            n.vlan.get_or_insert_with(Vlan::default).link = Some(link);
            Ok(())
        },
    },
];

pub(crate) static DHCP4_TABLE: &[Entry<Dhcp4Overrides>] = &[
    Entry {
        key: "use-dns",
        set: |d, v| {
            d.use_dns = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-domains",
        set: |d, v| {
            d.use_domains = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-domain",
        set: |d, v| {
            d.use_domains = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-ntp",
        set: |d, v| {
            d.use_ntp = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-mtu",
        set: |d, v| {
            d.use_mtu = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-routes",
        set: |d, v| {
            d.use_routes = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-hostname",
        set: |d, v| {
            d.use_hostname = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "send-hostname",
        set: |d, v| {
            d.send_hostname = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "route-metric",
        set: |d, v| {
            d.route_metric = Some(unsigned(v)?);
            Ok(())
        },
    },
    Entry {
        key: "hostname",
        set: |d, v| {
            d.hostname = Some(text(v)?);
            Ok(())
        },
    },
];

pub(crate) static DHCP6_TABLE: &[Entry<Dhcp6Overrides>] = &[
    Entry {
        key: "use-dns",
        set: |d, v| {
            d.use_dns = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-domains",
        set: |d, v| {
            d.use_domains = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-domain",
        set: |d, v| {
            d.use_domains = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-ntp",
        set: |d, v| {
            d.use_ntp = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-address",
        set: |d, v| {
            d.use_address = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "use-hostname",
        set: |d, v| {
            d.use_hostname = Some(boolean(v)?);
            Ok(())
        },
    },
];

/// Attributes of an address.  The address literals themselves are keys, so they have no entry.
pub(crate) static ADDRESS_TABLE: &[Entry<AddressOptions>] = &[
    Entry {
        key: "label",
        set: |a, v| {
            a.label = Some(text(v)?);
            Ok(())
        },
    },
    Entry {
        key: "lifetime",
        set: |a, v| {
            a.lifetime = Some(mode("address lifetime", v)?);
            Ok(())
        },
    },
];

pub(crate) static NAMESERVER_TABLE: &[Entry<Network>] = &[
    Entry {
        key: "search",
        set: |n, v| {
            for domain in scalars(v)? {
                n.add_search_domain(domain);
            }
            Ok(())
        },
    },
    Entry {
        key: "addresses",
        set: |n, v| {
            for nameserver in ip_addrs(v)? {
                n.add_nameserver(nameserver);
            }
            Ok(())
        },
    },
];

pub(crate) static ROUTE_TABLE: &[Entry<Route>] = &[
    Entry {
        key: "to",
        set: |r, v| {
            r.destination = Some(RouteTo::parse(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "via",
        set: |r, v| {
            r.gateway = Some(parse_ip_addr(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "from",
        set: |r, v| {
            r.preferred_source = Some(parse_ip_addr(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "table",
        set: |r, v| {
            r.table = Some(unsigned(v)?);
            Ok(())
        },
    },
    Entry {
        key: "type",
        set: |r, v| {
            r.route_type = Some(mode("route type", v)?);
            Ok(())
        },
    },
    Entry {
        key: "scope",
        set: |r, v| {
            r.scope = Some(mode("route scope", v)?);
            Ok(())
        },
    },
    Entry {
        key: "metric",
        set: |r, v| {
            r.metric = Some(unsigned(v)?);
            Ok(())
        },
    },
    Entry {
        key: "on-link",
        set: |r, v| {
            r.on_link = Some(boolean(v)?);
            Ok(())
        },
    },
    Entry {
        key: "congestion-window",
        set: |r, v| {
            r.congestion_window = Some(unsigned(v)?);
            Ok(())
        },
    },
    Entry {
        key: "advertised-receive-window",
        set: |r, v| {
            r.advertised_receive_window = Some(unsigned(v)?);
            Ok(())
        },
    },
];

pub(crate) static RULE_TABLE: &[Entry<RoutingPolicyRule>] = &[
    Entry {
        key: "from",
        set: |r, v| {
            r.from = Some(parse_ip_net(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "to",
        set: |r, v| {
            r.to = Some(parse_ip_net(scalar(v)?).context(ConvertSnafu)?);
            Ok(())
        },
    },
    Entry {
        key: "table",
        set: |r, v| {
            r.table = Some(unsigned(v)?);
            Ok(())
        },
    },
    Entry {
        key: "priority",
        set: |r, v| {
            r.priority = Some(unsigned(v)?);
            Ok(())
        },
    },
    Entry {
        key: "type-of-service",
        set: |r, v| {
            r.type_of_service = Some(unsigned(v)?);
            Ok(())
        },
    },
    Entry {
        key: "mark",
        set: |r, v| {
            r.mark = Some(unsigned(v)?);
            Ok(())
        },
    },
];

pub(crate) static WIFI_TABLE: &[Entry<AccessPoint>] = &[
    Entry {
        key: "password",
        set: |ap, v| {
            ap.auth.password = Some(quotable(v)?);
            Ok(())
        },
    },
    Entry {
        key: "psk",
        set: |ap, v| {
            ap.auth.password = Some(quotable(v)?);
            ap.auth.key_management = Some(KeyManagement::Psk);
            Ok(())
        },
    },
    Entry {
        key: "key-management",
        set: |ap, v| {
            ap.auth.key_management = Some(mode("key management", v)?);
            Ok(())
        },
    },
    Entry {
        key: "method",
        set: |ap, v| {
            ap.auth.eap_method = Some(mode("EAP method", v)?);
            Ok(())
        },
    },
    Entry {
        key: "identity",
        set: |ap, v| {
            ap.auth.identity = Some(quotable(v)?);
            Ok(())
        },
    },
    Entry {
        key: "anonymous-identity",
        set: |ap, v| {
            ap.auth.anonymous_identity = Some(quotable(v)?);
            Ok(())
        },
    },
    Entry {
        key: "ca-certificate",
        set: |ap, v| {
            ap.auth.ca_certificate = Some(quotable(v)?);
            Ok(())
        },
    },
    Entry {
        key: "client-certificate",
        set: |ap, v| {
            ap.auth.client_certificate = Some(quotable(v)?);
            Ok(())
        },
    },
    Entry {
        key: "client-key",
        set: |ap, v| {
            ap.auth.client_key = Some(quotable(v)?);
            Ok(())
        },
    },
    Entry {
        key: "client-key-password",
        set: |ap, v| {
            ap.auth.client_key_password = Some(quotable(v)?);
            Ok(())
        },
    },
];

/// A value that couldn't be stored.  The walker turns these into warnings and moves on.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum FieldError {
    #[snafu(display("{}", source))]
    Convert { source: parse::Error },

    #[snafu(display("expected a single value, found a {}", found))]
    ExpectedScalar { found: &'static str },

    #[snafu(display("expected a value or a list of values, found a {}", found))]
    ExpectedScalars { found: &'static str },
}

type Result<T> = std::result::Result<T, FieldError>;
