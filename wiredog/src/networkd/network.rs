use super::{error, Result, SystemdBool, CONFIG_FILE_PREFIX};
use crate::interface_id::{InterfaceName, MacAddress};
use crate::network::{
    ActivationPolicy, AddressLifetime, ClientIdentifier, DhcpClient, DhcpMode,
    Ipv6AddressGeneration, Ipv6Privacy, LinkLocalAddressing, Network, RequiredFamily, Route,
    RouteScope, RouteTo, RouteType, RoutingPolicyRule,
};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use snafu::ResultExt;
use std::fmt::Display;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use systemd_derive::{SystemdUnit, SystemdUnitSection};

/// A `.network` file, named for the interface it configures.
#[derive(Debug)]
pub(crate) struct NetworkConfig {
    stem: String,
    unit: NetworkUnit,
}

/// The file's contents.  Sections are written in field order.
#[derive(Debug, Default, SystemdUnit)]
struct NetworkUnit {
    r#match: Option<MatchSection>,
    link: Option<LinkSection>,
    network: Option<NetworkSection>,
    dhcp4: Option<Dhcp4Section>,
    dhcp6: Option<Dhcp6Section>,
    address: Vec<AddressSection>,
    gateway: Option<RouteSection>,
    route: Vec<RouteSection>,
    routing_policy_rule: Vec<RoutingPolicyRuleSection>,
}

#[derive(Debug, Default, PartialEq, SystemdUnitSection)]
#[systemd(section = "Match")]
struct MatchSection {
    #[systemd(entry = "Name")]
    name: Option<InterfaceName>,
    #[systemd(entry = "MACAddress")]
    mac_address: Option<MacAddress>,
    #[systemd(entry = "Driver", space_separated)]
    drivers: Vec<String>,
}

#[derive(Debug, Default, PartialEq, SystemdUnitSection)]
#[systemd(section = "Link")]
struct LinkSection {
    #[systemd(entry = "MTUBytes")]
    mtu: Option<u32>,
    #[systemd(entry = "MACAddress")]
    mac_address: Option<MacAddress>,
    #[systemd(entry = "ARP")]
    arp: Option<SystemdBool>,
    #[systemd(entry = "Multicast")]
    multicast: Option<SystemdBool>,
    #[systemd(entry = "AllMulticast")]
    all_multicast: Option<SystemdBool>,
    #[systemd(entry = "Promiscuous")]
    promiscuous: Option<SystemdBool>,
    #[systemd(entry = "Unmanaged")]
    unmanaged: Option<SystemdBool>,
    #[systemd(entry = "RequiredForOnline")]
    required: Option<SystemdBool>,
    #[systemd(entry = "RequiredFamilyForOnline")]
    required_family: Option<RequiredFamily>,
    #[systemd(entry = "ActivationPolicy")]
    activation_policy: Option<ActivationPolicy>,
}

#[derive(Debug, Default, PartialEq, SystemdUnitSection)]
#[systemd(section = "Network")]
struct NetworkSection {
    #[systemd(entry = "DHCP")]
    dhcp: Option<DhcpClient>,
    #[systemd(entry = "LLDP")]
    lldp: Option<SystemdBool>,
    #[systemd(entry = "LinkLocalAddressing")]
    link_local_addressing: Option<LinkLocalAddressing>,
    #[systemd(entry = "IPv6AcceptRA")]
    ipv6_accept_ra: Option<SystemdBool>,
    #[systemd(entry = "DNS", space_separated)]
    dns: Vec<IpAddr>,
    #[systemd(entry = "NTP", space_separated)]
    ntp: Vec<IpAddr>,
    #[systemd(entry = "Domains", space_separated)]
    domains: Vec<String>,
    #[systemd(entry = "EmitLLDP")]
    emit_lldp: Option<SystemdBool>,
    #[systemd(entry = "IPv6LinkLocalAddressGenerationMode")]
    ipv6_address_generation: Option<Ipv6AddressGeneration>,
    #[systemd(entry = "IPv6PrivacyExtensions")]
    ipv6_privacy: Option<Ipv6Privacy>,
    #[systemd(entry = "IPv6MTUBytes")]
    ipv6_mtu: Option<u32>,
    #[systemd(entry = "ConfigureWithoutCarrier")]
    configure_without_carrier: Option<SystemdBool>,
    #[systemd(entry = "VLAN")]
    vlan: Vec<InterfaceName>,
}

#[derive(Debug, Default, PartialEq, SystemdUnitSection)]
#[systemd(section = "DHCPv4")]
struct Dhcp4Section {
    #[systemd(entry = "ClientIdentifier")]
    client_identifier: Option<ClientIdentifier>,
    #[systemd(entry = "UseDNS")]
    use_dns: Option<SystemdBool>,
    #[systemd(entry = "UseDomains")]
    use_domains: Option<SystemdBool>,
    #[systemd(entry = "UseMTU")]
    use_mtu: Option<SystemdBool>,
    #[systemd(entry = "UseNTP")]
    use_ntp: Option<SystemdBool>,
    #[systemd(entry = "UseRoutes")]
    use_routes: Option<SystemdBool>,
    #[systemd(entry = "UseHostname")]
    use_hostname: Option<SystemdBool>,
    #[systemd(entry = "SendHostname")]
    send_hostname: Option<SystemdBool>,
    #[systemd(entry = "RouteMetric")]
    metric: Option<u32>,
    #[systemd(entry = "Hostname")]
    hostname: Option<String>,
}

#[derive(Debug, Default, PartialEq, SystemdUnitSection)]
#[systemd(section = "DHCPv6")]
struct Dhcp6Section {
    #[systemd(entry = "UseDNS")]
    use_dns: Option<SystemdBool>,
    #[systemd(entry = "UseDomains")]
    use_domains: Option<SystemdBool>,
    #[systemd(entry = "UseNTP")]
    use_ntp: Option<SystemdBool>,
    #[systemd(entry = "UseAddress")]
    use_address: Option<SystemdBool>,
    #[systemd(entry = "UseHostname")]
    use_hostname: Option<SystemdBool>,
}

#[derive(Debug, Default, PartialEq, SystemdUnitSection)]
#[systemd(section = "Address")]
struct AddressSection {
    #[systemd(entry = "Address")]
    address: Option<IpNet>,
    #[systemd(entry = "Peer")]
    peer: Option<IpAddr>,
    #[systemd(entry = "Label")]
    label: Option<String>,
    #[systemd(entry = "PreferredLifetime")]
    preferred_lifetime: Option<AddressLifetime>,
}

#[derive(Debug, Default, PartialEq, SystemdUnitSection)]
#[systemd(section = "Route")]
struct RouteSection {
    #[systemd(entry = "Destination")]
    destination: Option<IpNet>,
    #[systemd(entry = "Gateway")]
    gateway: Option<IpAddr>,
    #[systemd(entry = "GatewayOnlink")]
    gateway_on_link: Option<SystemdBool>,
    #[systemd(entry = "PreferredSource")]
    preferred_source: Option<IpAddr>,
    #[systemd(entry = "Table")]
    table: Option<u32>,
    #[systemd(entry = "Metric")]
    metric: Option<u32>,
    #[systemd(entry = "Scope")]
    scope: Option<RouteScope>,
    #[systemd(entry = "Type")]
    route_type: Option<RouteType>,
    #[systemd(entry = "InitialCongestionWindow")]
    congestion_window: Option<u32>,
    #[systemd(entry = "InitialAdvertisedReceiveWindow")]
    advertised_receive_window: Option<u32>,
}

#[derive(Debug, Default, PartialEq, SystemdUnitSection)]
#[systemd(section = "RoutingPolicyRule")]
struct RoutingPolicyRuleSection {
    #[systemd(entry = "From")]
    from: Option<IpNet>,
    #[systemd(entry = "To")]
    to: Option<IpNet>,
    #[systemd(entry = "Table")]
    table: Option<u32>,
    #[systemd(entry = "Priority")]
    priority: Option<u32>,
    #[systemd(entry = "TypeOfService")]
    type_of_service: Option<u8>,
    #[systemd(entry = "FirewallMark")]
    firewall_mark: Option<u32>,
}

/// Sections that have nothing in them are left out of the file entirely
fn non_empty<T: Default + PartialEq>(section: T) -> Option<T> {
    (section != T::default()).then_some(section)
}

fn yes_no(value: Option<bool>) -> Option<SystemdBool> {
    value.map(SystemdBool::from)
}

/// An unspecified address (`0.0.0.0`, `::`) is no gateway at all
fn specified(gateway: Option<IpAddr>) -> Option<IpAddr> {
    gateway.filter(|gw| !gw.is_unspecified())
}

impl From<&Network> for NetworkConfig {
    fn from(network: &Network) -> Self {
        let identity = network.identity();
        let link = &network.link;
        let dhcp4 = &network.dhcp4_overrides;
        let dhcp6 = &network.dhcp6_overrides;

        // An explicit DHCP mode wins over the per-protocol switches
        let dhcp = network
            .dhcp
            .map(DhcpMode::networkd_mode)
            .or_else(|| DhcpClient::from_protocols(network.dhcp4, network.dhcp6));

        let gateway = specified(network.gateway).map(|gateway| RouteSection {
            gateway: Some(gateway),
            gateway_on_link: yes_no(network.gateway_on_link),
            ..Default::default()
        });

        let unit = NetworkUnit {
            r#match: Some(MatchSection {
                name: identity.name.clone(),
                mac_address: identity.mac.clone(),
                drivers: identity.drivers.clone(),
            }),
            link: non_empty(LinkSection {
                mtu: link.mtu.filter(|mtu| *mtu > 0),
                mac_address: link.mac.clone(),
                arp: yes_no(link.arp),
                multicast: yes_no(link.multicast),
                all_multicast: yes_no(link.all_multicast),
                promiscuous: yes_no(link.promiscuous),
                unmanaged: yes_no(link.unmanaged),
                required: yes_no(link.required_for_online),
                required_family: link.required_family_for_online,
                activation_policy: link.activation_policy,
            }),
            network: Some(NetworkSection {
                dhcp,
                lldp: yes_no(network.lldp),
                link_local_addressing: network.link_local,
                ipv6_accept_ra: yes_no(network.accept_ra),
                dns: network.nameservers().copied().collect(),
                ntp: network.ntp_servers().copied().collect(),
                domains: network.search_domains().cloned().collect(),
                emit_lldp: yes_no(network.emit_lldp),
                ipv6_address_generation: network.ipv6_address_generation,
                ipv6_privacy: network.ipv6_privacy,
                ipv6_mtu: network.ipv6_mtu,
                // A VLAN has no carrier of its own to wait for
                configure_without_carrier: network.vlan.as_ref().map(|_| SystemdBool::from(true)),
                vlan: network.vlans().cloned().collect(),
            }),
            dhcp4: non_empty(Dhcp4Section {
                client_identifier: network.dhcp_identifier,
                use_dns: yes_no(dhcp4.use_dns),
                use_domains: yes_no(dhcp4.use_domains),
                use_mtu: yes_no(dhcp4.use_mtu),
                use_ntp: yes_no(dhcp4.use_ntp),
                use_routes: yes_no(dhcp4.use_routes),
                use_hostname: yes_no(dhcp4.use_hostname),
                send_hostname: yes_no(dhcp4.send_hostname),
                metric: dhcp4.route_metric,
                hostname: dhcp4.hostname.clone(),
            }),
            dhcp6: non_empty(Dhcp6Section {
                use_dns: yes_no(dhcp6.use_dns),
                use_domains: yes_no(dhcp6.use_domains),
                use_ntp: yes_no(dhcp6.use_ntp),
                use_address: yes_no(dhcp6.use_address),
                use_hostname: yes_no(dhcp6.use_hostname),
            }),
            address: network
                .addresses()
                .map(|address| AddressSection {
                    address: Some(address.address),
                    peer: address.peer,
                    label: address.label.clone(),
                    preferred_lifetime: address.lifetime,
                })
                .collect(),
            gateway,
            route: network.routes().filter_map(RouteSection::from_route).collect(),
            routing_policy_rule: network
                .routing_policy_rules()
                .map(RoutingPolicyRuleSection::from)
                .collect(),
        };

        Self {
            stem: identity.stem(),
            unit,
        }
    }
}

impl RouteSection {
    /// Routes with neither a destination nor a gateway have nothing to say and are dropped.
    fn from_route(route: &Route) -> Option<Self> {
        let gateway = specified(route.gateway);
        let destination = match route.destination {
            Some(RouteTo::Ip(net)) => Some(net),
            // The default route belongs to the gateway's family
            Some(RouteTo::DefaultRoute) => Some(match gateway {
                Some(IpAddr::V6(_)) => IpNet::V6(Ipv6Net::default()),
                _ => IpNet::V4(Ipv4Net::default()),
            }),
            None => None,
        };

        if destination.is_none() && gateway.is_none() {
            return None;
        }

        Some(Self {
            destination,
            gateway,
            gateway_on_link: yes_no(route.on_link),
            preferred_source: route.preferred_source,
            table: route.table,
            metric: route.metric,
            scope: route.scope,
            route_type: route.route_type,
            congestion_window: route.congestion_window,
            advertised_receive_window: route.advertised_receive_window,
        })
    }
}

impl From<&RoutingPolicyRule> for RoutingPolicyRuleSection {
    fn from(rule: &RoutingPolicyRule) -> Self {
        Self {
            from: rule.from,
            to: rule.to,
            table: rule.table,
            priority: rule.priority,
            type_of_service: rule.type_of_service,
            firewall_mark: rule.mark,
        }
    }
}

impl NetworkConfig {
    const FILE_EXT: &'static str = "network";

    /// Write the config to the proper directory with the proper prefix and file extension
    pub(crate) fn write_config_file<P: AsRef<Path>>(&self, config_dir: P) -> Result<PathBuf> {
        let cfg_path = self.config_path(config_dir);

        fs::write(&cfg_path, self.to_string()).context(error::NetworkDConfigWriteSnafu {
            what: "network config",
            path: &cfg_path,
        })?;
        Ok(cfg_path)
    }

    /// Build the proper prefixed path for the config file
    pub(crate) fn config_path<P: AsRef<Path>>(&self, config_dir: P) -> PathBuf {
        // Interface names may contain dots, so the extension is appended rather than set
        let filename = format!("{}{}.{}", CONFIG_FILE_PREFIX, self.stem, Self::FILE_EXT);
        config_dir.as_ref().join(filename)
    }
}

impl Display for NetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.unit)
    }
}
