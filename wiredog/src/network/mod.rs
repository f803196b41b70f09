//! The network module contains `Network`, the normalized description of one interface's desired
//! configuration.  Both the YAML walker and the kernel command line compiler produce it, and the
//! serializers consume it; nothing in here knows where the values came from or how they will be
//! written.
//!
//! Optional settings are `Option`s so that "unset" can be told apart from "false" or "0"; unset
//! values are left out of generated configuration.  Collections are ordered by first insertion
//! and silently ignore duplicates, except for access points, where a repeated SSID is an error.
mod address;
mod modes;
mod route;
mod vlan;
mod wifi;

use crate::interface_id::{InterfaceName, MacAddress};
use indexmap::{IndexMap, IndexSet};
use ipnet::IpNet;
use snafu::ensure;
use std::net::IpAddr;

pub(crate) use address::{Address, AddressOptions};
pub(crate) use modes::{
    ActivationPolicy, AddressLifetime, ClientIdentifier, DhcpClient, DracutDhcpMode,
    Ipv6AddressGeneration, Ipv6Privacy, LinkLocalAddressing, RequiredFamily, RouteScope,
    RouteType,
};
pub(crate) use route::{Route, RouteTo, RoutingPolicyRule};
pub(crate) use vlan::{Vlan, VlanId};
pub(crate) use wifi::{AccessPoint, EapMethod, KeyManagement};

/// The criteria an interface is matched by.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub(crate) name: Option<InterfaceName>,
    pub(crate) mac: Option<MacAddress>,
    pub(crate) drivers: Vec<String>,
}

impl Identity {
    pub(crate) fn with_name(name: InterfaceName) -> Self {
        Self {
            name: Some(name),
            ..Default::default()
        }
    }

    /// A short identifier for file names and log messages: the name, else the MAC without
    /// colons, else the first driver, else "default"
    pub(crate) fn stem(&self) -> String {
        match (&self.name, &self.mac, self.drivers.first()) {
            (Some(name), _, _) => name.to_string(),
            (None, Some(mac), _) => mac.compact(),
            (None, None, Some(driver)) => driver.clone(),
            (None, None, None) => "default".to_string(),
        }
    }
}

/// The DHCP client mode, tagged with the vocabulary it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DhcpMode {
    Networkd(DhcpClient),
    Dracut(DracutDhcpMode),
}

impl DhcpMode {
    pub(crate) fn networkd_mode(self) -> DhcpClient {
        match self {
            DhcpMode::Networkd(mode) => mode,
            DhcpMode::Dracut(mode) => mode.networkd_mode(),
        }
    }
}

/// Link-level settings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct LinkSettings {
    pub(crate) mtu: Option<u32>,
    pub(crate) mac: Option<MacAddress>,
    pub(crate) arp: Option<bool>,
    pub(crate) multicast: Option<bool>,
    pub(crate) all_multicast: Option<bool>,
    pub(crate) promiscuous: Option<bool>,
    pub(crate) unmanaged: Option<bool>,
    pub(crate) required_for_online: Option<bool>,
    pub(crate) required_family_for_online: Option<RequiredFamily>,
    pub(crate) activation_policy: Option<ActivationPolicy>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Dhcp4Overrides {
    pub(crate) use_dns: Option<bool>,
    pub(crate) use_domains: Option<bool>,
    pub(crate) use_ntp: Option<bool>,
    pub(crate) use_mtu: Option<bool>,
    pub(crate) use_routes: Option<bool>,
    pub(crate) use_hostname: Option<bool>,
    pub(crate) send_hostname: Option<bool>,
    pub(crate) route_metric: Option<u32>,
    pub(crate) hostname: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Dhcp6Overrides {
    pub(crate) use_dns: Option<bool>,
    pub(crate) use_domains: Option<bool>,
    pub(crate) use_ntp: Option<bool>,
    pub(crate) use_address: Option<bool>,
    pub(crate) use_hostname: Option<bool>,
}

/// The normalized configuration for one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Network {
    identity: Identity,
    modified: bool,

    pub(crate) dhcp: Option<DhcpMode>,
    pub(crate) dhcp4: Option<bool>,
    pub(crate) dhcp6: Option<bool>,
    pub(crate) dhcp_identifier: Option<ClientIdentifier>,
    pub(crate) dhcp4_overrides: Dhcp4Overrides,
    pub(crate) dhcp6_overrides: Dhcp6Overrides,

    pub(crate) link: LinkSettings,
    pub(crate) link_local: Option<LinkLocalAddressing>,
    pub(crate) ipv6_address_generation: Option<Ipv6AddressGeneration>,
    pub(crate) ipv6_privacy: Option<Ipv6Privacy>,
    pub(crate) ipv6_mtu: Option<u32>,
    pub(crate) lldp: Option<bool>,
    pub(crate) emit_lldp: Option<bool>,
    pub(crate) accept_ra: Option<bool>,

    pub(crate) gateway: Option<IpAddr>,
    pub(crate) gateway_on_link: Option<bool>,

    /// Set when this record describes a VLAN device rather than a physical interface
    pub(crate) vlan: Option<Vlan>,

    addresses: IndexMap<IpNet, Address>,
    nameservers: IndexSet<IpAddr>,
    search_domains: IndexSet<String>,
    ntp_servers: IndexSet<IpAddr>,
    routes: IndexSet<Route>,
    routing_policy_rules: IndexSet<RoutingPolicyRule>,
    access_points: IndexMap<String, AccessPoint>,
    vlans: IndexSet<InterfaceName>,
}

impl Network {
    pub(crate) fn new(identity: Identity) -> Self {
        Self {
            identity,
            modified: false,
            dhcp: None,
            dhcp4: None,
            dhcp6: None,
            dhcp_identifier: None,
            dhcp4_overrides: Dhcp4Overrides::default(),
            dhcp6_overrides: Dhcp6Overrides::default(),
            link: LinkSettings::default(),
            link_local: None,
            ipv6_address_generation: None,
            ipv6_privacy: None,
            ipv6_mtu: None,
            lldp: None,
            emit_lldp: None,
            accept_ra: None,
            gateway: None,
            gateway_on_link: None,
            vlan: None,
            addresses: IndexMap::new(),
            nameservers: IndexSet::new(),
            search_domains: IndexSet::new(),
            ntp_servers: IndexSet::new(),
            routes: IndexSet::new(),
            routing_policy_rules: IndexSet::new(),
            access_points: IndexMap::new(),
            vlans: IndexSet::new(),
        }
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Whether anything has been written to this network since it was created
    pub(crate) fn is_modified(&self) -> bool {
        self.modified
    }

    /// Callers that write the public fields directly are responsible for calling this
    pub(crate) fn mark_modified(&mut self) {
        self.modified = true
    }

    /// Add a static address.  Returns `false`, leaving the existing entry untouched, if the
    /// address is already present.
    pub(crate) fn add_address(&mut self, address: Address) -> bool {
        self.modified = true;
        if self.addresses.contains_key(&address.address) {
            return false;
        }
        self.addresses.insert(address.address, address);
        true
    }

    pub(crate) fn address_mut(&mut self, address: &IpNet) -> Option<&mut Address> {
        self.addresses.get_mut(address)
    }

    pub(crate) fn add_nameserver(&mut self, nameserver: IpAddr) {
        self.modified = true;
        self.nameservers.insert(nameserver);
    }

    pub(crate) fn add_search_domain<S: Into<String>>(&mut self, domain: S) {
        self.modified = true;
        self.search_domains.insert(domain.into());
    }

    pub(crate) fn add_ntp_server(&mut self, server: IpAddr) {
        self.modified = true;
        self.ntp_servers.insert(server);
    }

    /// Add a route.  A route that only says "default via X" becomes the default gateway rather
    /// than a separate route; anything else is added to the route set.
    pub(crate) fn add_route(&mut self, route: Route) {
        self.modified = true;
        match route.as_default_gateway() {
            Some((gateway, on_link)) => {
                self.gateway = Some(gateway);
                if on_link.is_some() {
                    self.gateway_on_link = on_link;
                }
            }
            None => {
                self.routes.insert(route);
            }
        }
    }

    pub(crate) fn add_routing_policy_rule(&mut self, rule: RoutingPolicyRule) {
        self.modified = true;
        self.routing_policy_rules.insert(rule);
    }

    /// Add an access point.  An access point whose SSID is already present is rejected, and the
    /// existing one is kept as it was.
    pub(crate) fn add_access_point(&mut self, access_point: AccessPoint) -> Result<()> {
        ensure!(
            !self.access_points.contains_key(access_point.ssid()),
            error::DuplicateAccessPointSnafu {
                ssid: access_point.ssid(),
                interface: self.identity.stem(),
            }
        );
        self.modified = true;
        self.access_points
            .insert(access_point.ssid().to_string(), access_point);
        Ok(())
    }

    /// Carry the VLAN device `name` on this interface.
    pub(crate) fn add_vlan(&mut self, name: InterfaceName) {
        self.modified = true;
        self.vlans.insert(name);
    }

    pub(crate) fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.addresses.values()
    }

    pub(crate) fn nameservers(&self) -> impl Iterator<Item = &IpAddr> {
        self.nameservers.iter()
    }

    pub(crate) fn search_domains(&self) -> impl Iterator<Item = &String> {
        self.search_domains.iter()
    }

    pub(crate) fn ntp_servers(&self) -> impl Iterator<Item = &IpAddr> {
        self.ntp_servers.iter()
    }

    pub(crate) fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub(crate) fn routing_policy_rules(&self) -> impl Iterator<Item = &RoutingPolicyRule> {
        self.routing_policy_rules.iter()
    }

    pub(crate) fn access_points(&self) -> impl Iterator<Item = &AccessPoint> {
        self.access_points.values()
    }

    pub(crate) fn vlans(&self) -> impl Iterator<Item = &InterfaceName> {
        self.vlans.iter()
    }

    pub(crate) fn has_access_points(&self) -> bool {
        !self.access_points.is_empty()
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display(
            "Access point '{}' is already configured for '{}', ignoring the duplicate",
            ssid,
            interface
        ))]
        DuplicateAccessPoint { ssid: String, interface: String },
    }
}

pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_ip_addr, parse_ip_net};
    use std::convert::TryFrom;

    fn eth0() -> Network {
        Network::new(Identity::with_name(InterfaceName::try_from("eth0").unwrap()))
    }

    #[test]
    fn new_network_is_unmodified() {
        let network = eth0();
        assert!(!network.is_modified());
        assert_eq!(network.identity().stem(), "eth0");
    }

    #[test]
    fn identity_stem_fallbacks() {
        let mac = Identity {
            mac: Some(MacAddress::try_from("52:54:00:79:99:C6").unwrap()),
            drivers: vec!["virtio_net".to_string()],
            ..Default::default()
        };
        assert_eq!(mac.stem(), "5254007999c6");

        let driver = Identity {
            drivers: vec!["ixgbe".to_string(), "e1000".to_string()],
            ..Default::default()
        };
        assert_eq!(driver.stem(), "ixgbe");
        assert_eq!(Identity::default().stem(), "default");
    }

    #[test]
    fn duplicate_address_is_a_no_op() {
        let mut network = eth0();
        let addr = parse_ip_net("192.168.1.10/24").unwrap();
        let labelled = Address {
            label: Some("eth0:static".to_string()),
            ..Address::new(addr)
        };

        assert!(network.add_address(labelled));
        assert!(!network.add_address(Address::new(addr)));

        let addresses: Vec<_> = network.addresses().collect();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].label.as_deref(), Some("eth0:static"));
        assert!(network.is_modified());
    }

    #[test]
    fn same_address_different_prefix_is_distinct() {
        let mut network = eth0();
        network.add_address(Address::new(parse_ip_net("10.0.0.1/24").unwrap()));
        network.add_address(Address::new(parse_ip_net("10.0.0.1/16").unwrap()));
        assert_eq!(network.addresses().count(), 2);
    }

    #[test]
    fn sets_keep_first_insertion_order() {
        let mut network = eth0();
        for ns in ["8.8.8.8", "1.1.1.1", "8.8.8.8"] {
            network.add_nameserver(parse_ip_addr(ns).unwrap());
        }
        for domain in ["example.com", "corp.example.com", "example.com"] {
            network.add_search_domain(domain);
        }
        let nameservers: Vec<String> = network.nameservers().map(|n| n.to_string()).collect();
        assert_eq!(nameservers, vec!["8.8.8.8", "1.1.1.1"]);
        let domains: Vec<&String> = network.search_domains().collect();
        assert_eq!(domains, vec!["example.com", "corp.example.com"]);
    }

    #[test]
    fn routes_deduplicate_on_every_attribute() {
        let mut network = eth0();
        let route = Route {
            destination: Some(RouteTo::Ip(parse_ip_net("10.1.0.0/16").unwrap())),
            gateway: Some(parse_ip_addr("10.0.0.1").unwrap()),
            ..Default::default()
        };
        let with_metric = Route {
            metric: Some(100),
            ..route.clone()
        };

        network.add_route(route.clone());
        network.add_route(route);
        network.add_route(with_metric);
        assert_eq!(network.routes().count(), 2);
    }

    #[test]
    fn bare_default_route_becomes_gateway() {
        let mut network = eth0();
        network.add_route(Route {
            destination: Some(RouteTo::DefaultRoute),
            gateway: Some(parse_ip_addr("192.168.1.1").unwrap()),
            on_link: Some(true),
            ..Default::default()
        });

        assert_eq!(network.gateway, Some(parse_ip_addr("192.168.1.1").unwrap()));
        assert_eq!(network.gateway_on_link, Some(true));
        assert_eq!(network.routes().count(), 0);
    }

    #[test]
    fn default_route_with_extras_stays_a_route() {
        let mut network = eth0();
        network.add_route(Route {
            destination: Some(RouteTo::DefaultRoute),
            gateway: Some(parse_ip_addr("192.168.1.1").unwrap()),
            metric: Some(200),
            ..Default::default()
        });

        assert_eq!(network.gateway, None);
        assert_eq!(network.routes().count(), 1);
    }

    #[test]
    fn vlans_are_a_set() {
        let mut network = eth0();
        for name in ["vlan100", "vlan200", "vlan100"] {
            network.add_vlan(InterfaceName::try_from(name).unwrap());
        }
        let vlans: Vec<&str> = network.vlans().map(|v| &**v).collect();
        assert_eq!(vlans, vec!["vlan100", "vlan200"]);
        assert!(network.is_modified());
    }

    #[test]
    fn duplicate_access_point_is_rejected() {
        let mut network = eth0();
        let mut first = AccessPoint::new("home");
        first.auth.password = Some("first-password".to_string());
        let mut second = AccessPoint::new("home");
        second.auth.password = Some("second-password".to_string());
        second.auth.key_management = Some(KeyManagement::Psk);

        assert!(network.add_access_point(first.clone()).is_ok());
        assert!(matches!(
            network.add_access_point(second),
            Err(Error::DuplicateAccessPoint { .. })
        ));

        let access_points: Vec<_> = network.access_points().collect();
        assert_eq!(access_points, vec![&first]);
    }
}
