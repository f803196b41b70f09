//! The walker applies the schema tables to a `Node` tree.
//!
//! Traversal and dispatch are kept apart: `visit_mappings` knows how sections may be shaped
//! (a mapping, a list of mappings, lists of lists, or nothing at all) and hands each mapping it
//! finds to a closure, which decides what the keys mean.
use super::node::Node;
use super::schema::{
    lookup, Entry, FieldError, Section, ADDRESS_TABLE, DHCP4_TABLE, DHCP6_TABLE, MATCH_TABLE,
    NAMESERVER_TABLE, NETWORK_TABLE, ROUTE_TABLE, RULE_TABLE, SSID_KEY, VLAN_TABLE, WIFI_TABLE,
};
use super::{error, Result};
use crate::interface_id::{self, InterfaceName};
use crate::network::{self, AccessPoint, Address, AddressOptions, Identity, Network, Vlan};
use crate::parse::{self, parse_ip_net};
use indexmap::map::Entry as MapEntry;
use indexmap::IndexMap;
use ipnet::IpNet;
use snafu::Snafu;
use std::convert::TryFrom;
use std::mem;

/// Top-level keys whose children are interface selectors
const INTERFACE_KINDS: [&str; 3] = ["ethernets", "wifis", VLAN_KIND];

/// Selectors under this key describe VLAN devices
const VLAN_KIND: &str = "vlans";

/// The result of walking one or more documents.
#[derive(Debug)]
pub(crate) struct Parsed {
    pub(crate) networks: Vec<Network>,
    pub(crate) warnings: Vec<Warning>,
}

/// Something in the document that was skipped.  The rest of the document is still used.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum Warning {
    #[snafu(display("Ignoring '{}' for '{}': {}", key, interface, source))]
    Field {
        interface: String,
        key: String,
        source: FieldError,
    },

    #[snafu(display(
        "Ignoring '{}' for '{}': it must follow '{}'",
        key,
        interface,
        SSID_KEY
    ))]
    NoAccessPoint { interface: String, key: String },

    #[snafu(display("{}", source))]
    AccessPoint { source: network::Error },

    #[snafu(display(
        "'{}' has no 'match' section and is not a valid interface name: {}",
        selector,
        source
    ))]
    Selector {
        selector: String,
        source: interface_id::Error,
    },

    #[snafu(display("VLAN '{}' has no {}; no device will be created for it", interface, missing))]
    IncompleteVlan {
        interface: String,
        missing: &'static str,
    },
}

/// Walks documents one at a time, collecting one `Network` per selector.
#[derive(Debug, Default)]
pub(crate) struct Walker {
    networks: IndexMap<String, Network>,
    warnings: Vec<Warning>,
}

impl Walker {
    pub(crate) fn document(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Mapping(entries) => self.top_level(entries),
            // Lone scalars at the top carry nothing we can use
            Node::Scalar(_) => Ok(()),
            Node::Sequence(_) => error::ExpectedMappingSnafu {
                section: "document",
                found: node.kind(),
            }
            .fail(),
        }
    }

    pub(crate) fn finish(mut self) -> Parsed {
        self.attach_vlans();
        Parsed {
            networks: self.networks.into_values().collect(),
            warnings: self.warnings,
        }
    }

    fn top_level(&mut self, entries: &[(String, Node)]) -> Result<()> {
        for (key, value) in entries {
            if INTERFACE_KINDS.contains(&key.as_str()) {
                for (selector, body) in mapping(key, value)? {
                    self.interface(key == VLAN_KIND, selector, body)?;
                }
                continue;
            }

            // Wrappers such as `network:` are searched for interface sections, but their own
            // keys never name interfaces
            match value {
                Node::Mapping(nested) => {
                    trace!("Searching '{}' for interface sections", key);
                    self.top_level(nested)?;
                }
                _ => debug!("Ignoring top-level key '{}'", key),
            }
        }
        Ok(())
    }

    fn interface(&mut self, is_vlan: bool, selector: &str, body: &Node) -> Result<()> {
        let entries = mapping(selector, body)?;
        let mut reporter = Reporter {
            interface: selector,
            warnings: &mut self.warnings,
        };

        let network = match self.networks.entry(selector.to_string()) {
            MapEntry::Occupied(entry) => entry.into_mut(),
            MapEntry::Vacant(entry) => {
                let identity = reporter.identity(entries)?;
                entry.insert(Network::new(identity))
            }
        };

        // A VLAN selector describes a device to create, even when nothing else is set for it
        if is_vlan && network.vlan.is_none() {
            network.vlan = Some(Vlan::default());
            network.mark_modified();
        }

        InterfaceWalker {
            network,
            reporter,
            is_vlan,
        }
        .body(entries)
    }

    /// Each VLAN is carried by the interface named in its `link`.  That interface gets a record
    /// of its own if nothing else configured it.
    fn attach_vlans(&mut self) {
        let mut links = Vec::new();
        for (selector, network) in &self.networks {
            let vlan = match &network.vlan {
                Some(vlan) => vlan,
                None => continue,
            };
            let missing = match (&network.identity().name, &vlan.link, vlan.id) {
                (None, _, _) => "interface name",
                (_, None, _) => "'link'",
                (_, _, None) => "'id'",
                (Some(name), Some(link), Some(_)) => {
                    links.push((name.clone(), link.clone()));
                    continue;
                }
            };
            let warning = Warning::IncompleteVlan {
                interface: selector.clone(),
                missing,
            };
            warn!("{}", warning);
            self.warnings.push(warning);
        }

        for (name, link) in links {
            let key = self
                .networks
                .iter()
                .find(|(_, network)| network.identity().name.as_ref() == Some(&link))
                .map(|(key, _)| key.clone())
                .unwrap_or_else(|| link.to_string());
            let carrier = self
                .networks
                .entry(key)
                .or_insert_with(|| Network::new(Identity::with_name(link.clone())));
            debug!("Attaching VLAN '{}' to '{}'", name, link);
            carrier.add_vlan(name);
        }
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// Runs the schema setters for one interface and records anything that fails.
struct Reporter<'w> {
    interface: &'w str,
    warnings: &'w mut Vec<Warning>,
}

impl Reporter<'_> {
    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn field_error(&mut self, key: &str, source: FieldError) {
        self.warn(Warning::Field {
            interface: self.interface.to_string(),
            key: key.to_string(),
            source,
        })
    }

    /// Convert and store one value.  Returns whether anything was written.
    fn store<T>(&mut self, entry: &Entry<T>, target: &mut T, value: &Node) -> bool {
        match (entry.set)(target, value) {
            Ok(()) => true,
            Err(source) => {
                self.field_error(entry.key, source);
                false
            }
        }
    }

    /// Apply `table` to every key of `entries`.  Returns whether anything was written.
    fn fill_entries<T>(
        &mut self,
        section: &str,
        table: &'static [Entry<T>],
        target: &mut T,
        entries: &[(String, Node)],
    ) -> bool {
        let mut written = false;
        for (key, value) in entries {
            match lookup(table, key) {
                Some(entry) => written |= self.store(entry, target, value),
                None => debug!(
                    "Ignoring unknown key '{}' in '{}' for '{}'",
                    key, section, self.interface
                ),
            }
        }
        written
    }

    /// Apply `table` to every mapping in a section, all writing to the same target.
    fn fill<T>(
        &mut self,
        section: &str,
        table: &'static [Entry<T>],
        target: &mut T,
        node: &Node,
    ) -> Result<bool> {
        let mut written = false;
        visit_mappings(section, node, &mut |entries| {
            written |= self.fill_entries(section, table, target, entries);
            Ok(())
        })?;
        Ok(written)
    }

    /// Build a fresh record from each mapping in a section.  Records that nothing was written to
    /// are dropped; the rest are handed to `insert`.
    fn records<T, F>(
        &mut self,
        section: &str,
        table: &'static [Entry<T>],
        node: &Node,
        mut insert: F,
    ) -> Result<()>
    where
        T: Default,
        F: FnMut(T),
    {
        visit_mappings(section, node, &mut |entries| {
            let mut record = T::default();
            if self.fill_entries(section, table, &mut record, entries) {
                insert(record);
            } else {
                debug!(
                    "Dropping empty '{}' entry for '{}'",
                    section, self.interface
                );
            }
            Ok(())
        })
    }

    /// The interface's identity comes from its `match` section if it has one, otherwise from the
    /// selector itself.
    fn identity(&mut self, entries: &[(String, Node)]) -> Result<Identity> {
        let section = Section::Match.name();
        if let Some((_, node)) = entries.iter().find(|(key, _)| key == section) {
            let mut identity = Identity::default();
            self.fill(section, MATCH_TABLE, &mut identity, node)?;
            return Ok(identity);
        }

        match InterfaceName::try_from(self.interface) {
            Ok(name) => Ok(Identity::with_name(name)),
            Err(source) => {
                self.warn(Warning::Selector {
                    selector: self.interface.to_string(),
                    source,
                });
                Ok(Identity::default())
            }
        }
    }
}

/// Populates one interface's `Network` from the body of its selector.
struct InterfaceWalker<'w> {
    network: &'w mut Network,
    reporter: Reporter<'w>,
    is_vlan: bool,
}

impl InterfaceWalker<'_> {
    fn body(&mut self, entries: &[(String, Node)]) -> Result<()> {
        for (key, value) in entries {
            if let Some(section) = Section::from_key(key) {
                trace!("Walking '{}' for '{}'", key, self.reporter.interface);
                self.section(section, value)?;
            } else if let Some(entry) = self.network_entry(key) {
                if self.reporter.store(entry, &mut *self.network, value) {
                    self.network.mark_modified();
                }
            } else {
                // Unknown keys are skipped along with everything beneath them
                debug!(
                    "Ignoring unknown key '{}' for '{}'",
                    key, self.reporter.interface
                );
            }
        }
        Ok(())
    }

    fn network_entry(&self, key: &str) -> Option<&'static Entry<Network>> {
        let vlan_entry = match self.is_vlan {
            true => lookup(VLAN_TABLE, key),
            false => None,
        };
        vlan_entry.or_else(|| lookup(NETWORK_TABLE, key))
    }

    fn section(&mut self, section: Section, value: &Node) -> Result<()> {
        let name = section.name();
        let written = match section {
            // Already used to build the identity, which can't change afterward
            Section::Match => false,
            Section::Dhcp4Overrides => self.reporter.fill(
                name,
                DHCP4_TABLE,
                &mut self.network.dhcp4_overrides,
                value,
            )?,
            Section::Dhcp6Overrides => self.reporter.fill(
                name,
                DHCP6_TABLE,
                &mut self.network.dhcp6_overrides,
                value,
            )?,
            Section::Nameservers => {
                self.reporter
                    .fill(name, NAMESERVER_TABLE, &mut *self.network, value)?
            }
            Section::Routes => {
                let network = &mut *self.network;
                self.reporter
                    .records(name, ROUTE_TABLE, value, |route| network.add_route(route))?;
                false
            }
            Section::RoutingPolicy => {
                let network = &mut *self.network;
                self.reporter.records(name, RULE_TABLE, value, |rule| {
                    network.add_routing_policy_rule(rule)
                })?;
                false
            }
            Section::Addresses => {
                self.addresses(value)?;
                false
            }
            Section::AccessPoints => {
                let mut current = None;
                self.access_points(value, &mut current)?;
                self.flush_access_point(&mut current);
                false
            }
        };

        if written {
            self.network.mark_modified();
        }
        Ok(())
    }

    /// Addresses may be written as plain list items, or as mapping keys carrying their own
    /// `label`/`lifetime`.  Options written beside the literals in a mapping (rather than beneath
    /// one) go to the next literal in that mapping, or to the last one if none follows.  They
    /// never reach past the mapping they were written in.
    fn addresses(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Sequence(items) => {
                for item in items {
                    self.addresses(item)?;
                }
            }
            Node::Scalar(literal) if literal.is_empty() => {}
            Node::Scalar(literal) => {
                if let Some(net) = self.address_literal(literal) {
                    self.add_address(net, AddressOptions::default());
                }
            }
            Node::Mapping(entries) => {
                let mut pending = AddressOptions::default();
                let mut last = None;
                for (key, value) in entries {
                    if let Some(entry) = lookup(ADDRESS_TABLE, key) {
                        self.reporter.store(entry, &mut pending, value);
                        continue;
                    }

                    let net = match self.address_literal(key) {
                        Some(net) => net,
                        None => continue,
                    };
                    let mut own = AddressOptions::default();
                    self.reporter
                        .fill(Section::Addresses.name(), ADDRESS_TABLE, &mut own, value)?;
                    own.merge(mem::take(&mut pending));
                    last = self.add_address(net, own);
                }

                if pending.is_empty() {
                    return Ok(());
                }
                match last.and_then(|net| self.network.address_mut(&net)) {
                    Some(existing) => existing.merge(pending),
                    None => debug!(
                        "Address options with no address to attach to for '{}'",
                        self.reporter.interface
                    ),
                }
            }
        }
        Ok(())
    }

    fn address_literal(&mut self, literal: &str) -> Option<IpNet> {
        match parse_ip_net(literal) {
            Ok(net) => Some(net),
            Err(source) => {
                self.reporter
                    .field_error(Section::Addresses.name(), FieldError::Convert { source });
                None
            }
        }
    }

    /// Add one address.  Returns it if it wasn't already configured.
    fn add_address(&mut self, net: IpNet, options: AddressOptions) -> Option<IpNet> {
        let address = Address::with_options(net, options);
        if self.network.add_address(address) {
            Some(net)
        } else {
            debug!(
                "Address '{}' is already configured for '{}'",
                net, self.reporter.interface
            );
            None
        }
    }

    /// `ssid-name` starts a new access point, and the keys after it describe that access point
    /// until the next `ssid-name`.  An access point may also be written as a mapping keyed by its
    /// SSID.  `auth` sections are walked in place, against the current access point.
    fn access_points(&mut self, node: &Node, current: &mut Option<AccessPoint>) -> Result<()> {
        let section = Section::AccessPoints.name();
        visit_mappings(section, node, &mut |entries| {
            for (key, value) in entries {
                self.access_point_key(key, value, current)?;
            }
            Ok(())
        })
    }

    fn access_point_key(
        &mut self,
        key: &str,
        value: &Node,
        current: &mut Option<AccessPoint>,
    ) -> Result<()> {
        if key == SSID_KEY {
            self.flush_access_point(current);
            match value.as_scalar() {
                Some(ssid) if !ssid.is_empty() => *current = Some(AccessPoint::new(ssid)),
                Some(ssid) => self.reporter.field_error(
                    key,
                    FieldError::Convert {
                        source: parse::Error::InvalidValue {
                            kind: "SSID",
                            input: ssid.to_string(),
                        },
                    },
                ),
                None => self.reporter.field_error(
                    key,
                    FieldError::ExpectedScalar {
                        found: value.kind(),
                    },
                ),
            }
        } else if key == "auth" {
            self.access_points(value, current)?;
        } else if let Some(entry) = lookup(WIFI_TABLE, key) {
            match current {
                Some(access_point) => {
                    self.reporter.store(entry, access_point, value);
                }
                None => self.reporter.warn(Warning::NoAccessPoint {
                    interface: self.reporter.interface.to_string(),
                    key: key.to_string(),
                }),
            }
        } else if let Node::Mapping(_) = value {
            self.flush_access_point(current);
            *current = Some(AccessPoint::new(key));
            self.access_points(value, current)?;
            self.flush_access_point(current);
        } else {
            debug!(
                "Ignoring unknown key '{}' in '{}' for '{}'",
                key,
                Section::AccessPoints.name(),
                self.reporter.interface
            );
        }
        Ok(())
    }

    fn flush_access_point(&mut self, current: &mut Option<AccessPoint>) {
        if let Some(access_point) = current.take() {
            if let Err(source) = self.network.add_access_point(access_point) {
                self.reporter.warn(Warning::AccessPoint { source });
            }
        }
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// The entries of a mapping.  A missing value (`key:` with nothing after it) is an empty mapping.
fn mapping<'a>(section: &str, node: &'a Node) -> Result<&'a [(String, Node)]> {
    match node {
        Node::Mapping(entries) => Ok(entries),
        Node::Scalar(s) if s.is_empty() => Ok(&[]),
        _ => error::ExpectedMappingSnafu {
            section,
            found: node.kind(),
        }
        .fail(),
    }
}

/// Call `f` for every mapping in `node`, descending through sequences in order.
fn visit_mappings<'a, F>(section: &str, node: &'a Node, f: &mut F) -> Result<()>
where
    F: FnMut(&'a [(String, Node)]) -> Result<()>,
{
    match node {
        Node::Mapping(entries) => f(entries),
        Node::Sequence(items) => {
            for item in items {
                visit_mappings(section, item, f)?;
            }
            Ok(())
        }
        Node::Scalar(s) if s.is_empty() => Ok(()),
        Node::Scalar(_) => error::ExpectedMappingSnafu {
            section,
            found: node.kind(),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::from_str;
    use super::*;
    use crate::network::{
        AddressLifetime, DhcpClient, DhcpMode, EapMethod, KeyManagement, RouteTo,
    };
    use crate::parse::parse_ip_addr;

    fn only(text: &str) -> Network {
        let parsed = from_str(text).unwrap();
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        assert_eq!(parsed.networks.len(), 1);
        parsed.networks.into_iter().next().unwrap()
    }

    #[test]
    fn selector_becomes_name() {
        let network = only("ethernets:\n  eth0:\n    dhcp: yes\n");
        assert_eq!(network.identity().stem(), "eth0");
        assert_eq!(network.dhcp, Some(DhcpMode::Networkd(DhcpClient::Yes)));
        assert!(network.is_modified());
    }

    #[test]
    fn match_section_wins_over_selector() {
        let network = only(
            r#"
ethernets:
  uplink:
    match:
      macaddress: "52:54:00:79:99:C6"
      driver: [virtio_net, e1000]
    mtu: 9000
"#,
        );
        let identity = network.identity();
        assert_eq!(identity.name, None);
        assert_eq!(identity.mac.as_ref().unwrap().to_string(), "52:54:00:79:99:c6");
        assert_eq!(identity.drivers, vec!["virtio_net", "e1000"]);
    }

    #[test]
    fn wrapper_keys_are_searched() {
        let parsed = from_str(
            "network:\n  version: 2\n  renderer: networkd\n  ethernets:\n    eth0: {mtu: 1500}\n  wifis:\n    wlan0: {dhcp4: true}\n",
        )
        .unwrap();
        let stems: Vec<String> = parsed
            .networks
            .iter()
            .map(|n| n.identity().stem())
            .collect();
        assert_eq!(stems, vec!["eth0", "wlan0"]);
    }

    #[test]
    fn unknown_nesting_is_skipped() {
        // Only `ethernets`, `wifis` and `vlans` name interfaces; `bridges` here and `extras`
        // below are not mistaken for interface selectors or sections
        let parsed = from_str(
            r#"
bridges:
  br0:
    mtu: 1400
ethernets:
  eth0:
    extras:
      mtu: 9000
      eth1:
        dhcp: yes
"#,
        )
        .unwrap();
        assert_eq!(parsed.networks.len(), 1);
        let network = &parsed.networks[0];
        assert_eq!(network.identity().stem(), "eth0");
        assert_eq!(network.link.mtu, None);
        assert_eq!(network.dhcp, None);
        assert!(!network.is_modified());
    }

    #[test]
    fn bad_values_become_warnings() {
        let parsed = from_str(
            r#"
ethernets:
  eth0:
    mtu: huge
    dhcp4: maybe
    lldp: true
    dhcp4-overrides:
      route-metric: 0x1ffffffff
      use-dns: no
"#,
        )
        .unwrap();
        assert_eq!(parsed.warnings.len(), 3);
        assert!(parsed
            .warnings
            .iter()
            .all(|w| matches!(w, Warning::Field { .. })));

        let network = &parsed.networks[0];
        assert_eq!(network.link.mtu, None);
        assert_eq!(network.dhcp4, None);
        assert_eq!(network.lldp, Some(true));
        assert_eq!(network.dhcp4_overrides.route_metric, None);
        assert_eq!(network.dhcp4_overrides.use_dns, Some(false));
    }

    #[test]
    fn later_scalar_writes_win() {
        let network = only(
            "ethernets:\n  eth0:\n    mtu: 1500\n    dhcp: no\n---\nethernets:\n  eth0:\n    mtu: 9000\n",
        );
        assert_eq!(network.link.mtu, Some(9000));
        assert_eq!(network.dhcp, Some(DhcpMode::Networkd(DhcpClient::No)));
    }

    #[test]
    fn invalid_selector_without_match() {
        let parsed = from_str("ethernets:\n  not/a/name:\n    mtu: 1500\n").unwrap();
        assert!(matches!(parsed.warnings[..], [Warning::Selector { .. }]));
        assert_eq!(parsed.networks[0].identity().stem(), "default");
        assert_eq!(parsed.networks[0].link.mtu, Some(1500));
    }

    #[test]
    fn address_forms() {
        let network = only(
            r#"
ethernets:
  eth0:
    addresses:
      - 10.0.0.1/24
      - 192.168.1.10/24:
          label: "eth0:static"
          lifetime: 0
      - 2001:db8::5/64
      - 10.0.0.1/24
"#,
        );
        let addresses: Vec<_> = network.addresses().collect();
        assert_eq!(addresses.len(), 3);
        assert_eq!(addresses[0].address.to_string(), "10.0.0.1/24");
        assert_eq!(addresses[0].label, None);
        assert_eq!(addresses[1].label.as_deref(), Some("eth0:static"));
        assert_eq!(addresses[1].lifetime, Some(AddressLifetime::Zero));
        assert_eq!(addresses[2].address.to_string(), "2001:db8::5/64");
    }

    #[test]
    fn address_options_either_side_of_the_literal() {
        let before = only(
            "ethernets:\n  eth0:\n    addresses:\n      - label: lan\n        10.0.0.1/24:\n",
        );
        let after = only(
            "ethernets:\n  eth0:\n    addresses:\n      - 10.0.0.1/24:\n        label: lan\n",
        );
        for network in [before, after] {
            let addresses: Vec<_> = network.addresses().collect();
            assert_eq!(addresses.len(), 1);
            assert_eq!(addresses[0].label.as_deref(), Some("lan"));
        }
    }

    #[test]
    fn nested_options_beat_pending_ones() {
        let network = only(
            r#"
ethernets:
  eth0:
    addresses:
      - label: outer
        lifetime: forever
        10.0.0.1/24:
          label: inner
      - 10.0.0.2/24
"#,
        );
        let addresses: Vec<_> = network.addresses().collect();
        assert_eq!(addresses[0].label.as_deref(), Some("inner"));
        assert_eq!(addresses[0].lifetime, Some(AddressLifetime::Forever));
        // Pending options are used up by the first literal
        assert_eq!(addresses[1].label, None);
    }

    #[test]
    fn address_options_stay_in_their_mapping() {
        let parsed = from_str(
            r#"
ethernets:
  eth0:
    addresses:
      - label: lan
        lifetime: 0
      - 10.0.0.1/24
      - 10.0.0.2/24:
"#,
        )
        .unwrap();
        let addresses: Vec<_> = parsed.networks[0].addresses().collect();
        assert_eq!(addresses.len(), 2);
        for address in addresses {
            assert_eq!(address.label, None, "{}", address.address);
            assert_eq!(address.lifetime, None, "{}", address.address);
        }

        let network = only("ethernets:\n  eth0:\n    addresses: [{label: lan}, 10.0.0.1/24]\n");
        assert_eq!(network.addresses().next().unwrap().label, None);
    }

    #[test]
    fn duplicate_address_keeps_first() {
        let network = only(
            r#"
ethernets:
  eth0:
    addresses:
      - 10.0.0.1/24:
          label: first
      - 10.0.0.1/24:
          label: second
"#,
        );
        let addresses: Vec<_> = network.addresses().collect();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].label.as_deref(), Some("first"));
    }

    #[test]
    fn bad_address_literal_is_a_warning() {
        let parsed =
            from_str("ethernets:\n  eth0:\n    addresses: [10.0.0.300/24, 10.0.0.3/24]\n")
                .unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.networks[0].addresses().count(), 1);
    }

    #[test]
    fn routes_one_per_mapping() {
        let network = only(
            r#"
ethernets:
  eth0:
    routes:
      - to: 10.1.0.0/16
        via: 10.0.0.1
        metric: 100
      - to: default
        via: 10.0.0.254
        on-link: true
      - {}
      - bogus: value
"#,
        );
        let routes: Vec<_> = network.routes().collect();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].metric, Some(100));
        assert_eq!(network.gateway, Some(parse_ip_addr("10.0.0.254").unwrap()));
        assert_eq!(network.gateway_on_link, Some(true));
    }

    #[test]
    fn gateway_keys() {
        let network = only("ethernets:\n  eth0:\n    gateway4: 192.168.1.1\n");
        assert_eq!(network.gateway, Some(parse_ip_addr("192.168.1.1").unwrap()));
    }

    #[test]
    fn routing_policy_rules() {
        let network = only(
            r#"
ethernets:
  eth0:
    routing-policy:
      - from: 10.0.0.0/24
        table: 100
        priority: 10
      - to: 172.16.0.0/12
        mark: 0x10
      - nothing: here
"#,
        );
        let rules: Vec<_> = network.routing_policy_rules().collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].table, Some(100));
        assert_eq!(rules[1].mark, Some(16));
    }

    #[test]
    fn nameservers_and_domains() {
        let network = only(
            r#"
ethernets:
  eth0:
    nameservers:
      search: [example.com, corp.example.com]
      addresses: [8.8.8.8, "2001:4860:4860::8888"]
    domains: example.com
"#,
        );
        let nameservers: Vec<String> = network.nameservers().map(|n| n.to_string()).collect();
        assert_eq!(nameservers, vec!["8.8.8.8", "2001:4860:4860::8888"]);
        let domains: Vec<&String> = network.search_domains().collect();
        assert_eq!(domains, vec!["example.com", "corp.example.com"]);
    }

    #[test]
    fn access_points_by_ssid_name() {
        let network = only(
            r#"
wifis:
  wlan0:
    access-points:
      - ssid-name: home
        password: hunter22
        key-management: psk
      - ssid-name: office
        auth:
          key-management: eap
          method: peap
          identity: alice
          password: secret
"#,
        );
        let access_points: Vec<_> = network.access_points().collect();
        assert_eq!(access_points.len(), 2);
        assert_eq!(access_points[0].ssid(), "home");
        assert_eq!(access_points[0].auth.key_management, Some(KeyManagement::Psk));
        assert_eq!(access_points[1].ssid(), "office");
        assert_eq!(access_points[1].auth.eap_method, Some(EapMethod::Peap));
        assert_eq!(access_points[1].auth.identity.as_deref(), Some("alice"));
    }

    #[test]
    fn access_points_keyed_by_ssid() {
        let network = only(
            r#"
wifis:
  wlan0:
    access-points:
      "coffee shop": {}
      home:
        password: hunter22
"#,
        );
        let ssids: Vec<&str> = network.access_points().map(|ap| ap.ssid()).collect();
        assert_eq!(ssids, vec!["coffee shop", "home"]);
    }

    #[test]
    fn duplicate_ssid_keeps_first() {
        let parsed = from_str(
            r#"
wifis:
  wlan0:
    access-points:
      - ssid-name: home
        password: first
      - ssid-name: home
        password: second
        key-management: psk
"#,
        )
        .unwrap();
        assert!(matches!(parsed.warnings[..], [Warning::AccessPoint { .. }]));
        let access_points: Vec<_> = parsed.networks[0].access_points().collect();
        assert_eq!(access_points.len(), 1);
        assert_eq!(access_points[0].auth.password.as_deref(), Some("first"));
        assert_eq!(access_points[0].auth.key_management, None);
    }

    #[test]
    fn wifi_keys_before_ssid() {
        let parsed = from_str(
            "wifis:\n  wlan0:\n    access-points:\n      - password: orphan\n        ssid-name: home\n",
        )
        .unwrap();
        assert!(matches!(parsed.warnings[..], [Warning::NoAccessPoint { .. }]));
        let access_points: Vec<_> = parsed.networks[0].access_points().collect();
        assert_eq!(access_points[0].auth.password, None);
    }

    #[test]
    fn vlan_is_attached_to_its_link() {
        let parsed = from_str(
            r#"
ethernets:
  eth0:
    dhcp: yes
vlans:
  vlan100:
    id: 100
    link: eth0
    addresses: [10.100.0.5/24]
  vlan200:
    id: 200
    link: eth1
"#,
        )
        .unwrap();
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        let stems: Vec<String> = parsed
            .networks
            .iter()
            .map(|n| n.identity().stem())
            .collect();
        assert_eq!(stems, vec!["eth0", "vlan100", "vlan200", "eth1"]);

        let eth0 = &parsed.networks[0];
        let carried: Vec<&str> = eth0.vlans().map(|v| &**v).collect();
        assert_eq!(carried, vec!["vlan100"]);
        assert_eq!(eth0.vlan, None);

        let vlan100 = &parsed.networks[1];
        let vlan = vlan100.vlan.as_ref().unwrap();
        assert_eq!(vlan.id.map(|id| *id), Some(100));
        assert_eq!(vlan.link.as_deref(), Some("eth0"));
        assert_eq!(vlan100.addresses().count(), 1);

        // Nothing configured eth1, so it gets a record that only carries the VLAN
        let eth1 = &parsed.networks[3];
        assert!(eth1.is_modified());
        let carried: Vec<&str> = eth1.vlans().map(|v| &**v).collect();
        assert_eq!(carried, vec!["vlan200"]);
    }

    #[test]
    fn vlan_keys_only_apply_to_vlans() {
        let network = only("ethernets:\n  eth0:\n    id: 100\n    link: eth1\n");
        assert_eq!(network.vlan, None);
        assert!(!network.is_modified());
    }

    #[test]
    fn incomplete_vlan_is_a_warning() {
        let parsed = from_str("vlans:\n  vlan5:\n    id: 5\n").unwrap();
        assert!(matches!(
            parsed.warnings[..],
            [Warning::IncompleteVlan {
                missing: "'link'",
                ..
            }]
        ));
        assert_eq!(parsed.networks.len(), 1);

        let parsed = from_str("vlans:\n  vlan5:\n    id: 4095\n    link: eth0\n").unwrap();
        assert!(matches!(
            parsed.warnings[..],
            [Warning::Field { .. }, Warning::IncompleteVlan { missing: "'id'", .. }]
        ));
        assert!(parsed.networks.iter().all(|n| n.vlans().count() == 0));
    }

    #[test]
    fn route_destination_literal() {
        let network = only(
            "ethernets:\n  eth0:\n    routes:\n      - to: 10.2.0.0/16\n        from: 10.0.0.5\n",
        );
        let route = network.routes().next().unwrap();
        assert_eq!(
            route.destination,
            Some(RouteTo::Ip(parse_ip_net("10.2.0.0/16").unwrap()))
        );
        assert_eq!(route.gateway, None);
        assert_eq!(route.preferred_source, Some(parse_ip_addr("10.0.0.5").unwrap()));
    }
}
