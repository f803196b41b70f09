//! The cmdline module compiles dracut-style network arguments from the kernel command line into
//! `Network`s.
//!
//! Recognized arguments:
//! - `ip=<mode>`
//! - `ip=<interface>:<mode>[:<mtu>[:<mac>]]`
//! - `ip=<client-ip>:[<peer>]:<gateway>:<netmask>:<hostname>:<interface>:<mode>[:[<mtu>][:<mac>]]`
//! - `ip=<client-ip>:[<peer>]:<gateway>:<netmask>:<hostname>:<interface>:<mode>[:<dns1>[:<dns2>]]`
//! - `nameserver=<ip>`
//! - `rd.route=<net>/<prefix>:<gateway>[:<interface>]`
//! - `rd.peerdns=<bool>`
//!
//! IPv6 addresses must be wrapped in brackets wherever the argument is colon-separated.  Anything
//! else on the command line is ignored.
use crate::interface_id::{InterfaceName, MacAddress};
use crate::network::{Address, DhcpMode, DracutDhcpMode, Identity, Network, Route, RouteTo};
use crate::parse::{
    self, parse_bool, parse_interface_name, parse_ip_addr, parse_ip_net, parse_mac, parse_mode,
    parse_unsigned,
};
use indexmap::IndexMap;
use ipnet::IpNet;
use snafu::{ResultExt, Snafu};
use std::fs;
use std::net::IpAddr;
use std::path::Path;

/// Interface-less `ip=` arguments are stored under this key
const ANY_INTERFACE: &str = "";

/// The result of compiling a command line.
#[derive(Debug)]
pub(crate) struct Compiled {
    pub(crate) networks: Vec<Network>,
    pub(crate) warnings: Vec<Warning>,
}

/// An argument, or part of one, that was skipped.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum Warning {
    #[snafu(display("Ignoring part of '{}': {}", argument, source))]
    InvalidValue {
        argument: String,
        source: parse::Error,
    },

    #[snafu(display("Ignoring '{}': {}", argument, reason))]
    Malformed { argument: String, reason: String },
}

/// Read the command line from `path` (usually `/proc/cmdline`) and compile it
pub(crate) fn from_path<P>(path: P) -> Result<Compiled>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let cmdline = fs::read_to_string(path).context(error::KernelCmdlineReadFailedSnafu { path })?;
    Ok(from_str(&cmdline))
}

/// Compile a command line.  Problems with individual arguments are returned as warnings.
pub(crate) fn from_str(cmdline: &str) -> Compiled {
    let mut compiler = Compiler::default();
    for argument in cmdline.split_whitespace() {
        match argument.split_once('=') {
            Some(("ip", value)) => compiler.ip(argument, value),
            Some(("nameserver", value)) => compiler.nameserver(argument, value),
            Some(("rd.route", value)) => compiler.route(argument, value),
            Some(("rd.peerdns", value)) => compiler.peerdns(argument, value),
            _ => debug!("Ignoring kernel argument '{}'", argument),
        }
    }
    compiler.finish()
}

#[derive(Debug, Default)]
struct Compiler {
    networks: IndexMap<String, Network>,
    warnings: Vec<Warning>,
    // Key of the record the last `ip=` argument wrote to
    last: Option<String>,
    peerdns: Option<bool>,
}

/// The pieces of an `ip=` argument, before conversion
struct IpArgument<'a> {
    client: &'a str,
    peer: &'a str,
    gateway: &'a str,
    netmask: &'a str,
    hostname: &'a str,
    interface: &'a str,
    mode: &'a str,
    // Trailing fields: either `<mtu>[:<mac>]` or `<dns1>[:<dns2>]`
    rest: Vec<&'a str>,
}

impl<'a> IpArgument<'a> {
    fn split(value: &'a str) -> Option<Self> {
        let fields = split_fields(value);
        let is_mode = |field: &str| parse_mode::<DracutDhcpMode>("", field).is_ok();

        let mut arg = IpArgument {
            client: "",
            peer: "",
            gateway: "",
            netmask: "",
            hostname: "",
            interface: "",
            mode: "",
            rest: Vec::new(),
        };

        match fields.len() {
            1 => arg.mode = fields[0],
            n if n >= 7 && is_mode(fields[6]) => {
                arg.client = fields[0];
                arg.peer = fields[1];
                arg.gateway = fields[2];
                arg.netmask = fields[3];
                arg.hostname = fields[4];
                arg.interface = fields[5];
                arg.mode = fields[6];
                arg.rest = fields[7..].to_vec();
            }
            n if n >= 2 && is_mode(fields[1]) => {
                arg.interface = fields[0];
                arg.mode = fields[1];
                arg.rest = fields[2..].to_vec();
            }
            _ => return None,
        }
        Some(arg)
    }
}

impl Compiler {
    fn finish(mut self) -> Compiled {
        if let Some(use_dns) = self.peerdns {
            for network in self.networks.values_mut() {
                network.dhcp4_overrides.use_dns = Some(use_dns);
                network.mark_modified();
            }
        }
        Compiled {
            networks: self.networks.into_values().collect(),
            warnings: self.warnings,
        }
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn invalid(&mut self, argument: &str, source: parse::Error) {
        self.warn(Warning::InvalidValue {
            argument: argument.to_string(),
            source,
        })
    }

    /// The record for `interface`, created if needed.  An empty name is the interface-less
    /// record, which matches every interface.
    fn network(&mut self, interface: &str) -> &mut Network {
        self.networks
            .entry(interface.to_string())
            .or_insert_with(|| match InterfaceName::try_from(interface) {
                Ok(name) => Network::new(Identity::with_name(name)),
                Err(_) => Network::new(Identity::default()),
            })
    }

    /// The record `nameserver=` and `rd.route=` apply to when they don't name one
    fn current(&mut self) -> &mut Network {
        let key = self.last.clone().unwrap_or_else(|| ANY_INTERFACE.to_string());
        self.network(&key)
    }

    fn ip(&mut self, argument: &str, value: &str) {
        let arg = match IpArgument::split(value) {
            Some(arg) => arg,
            None => {
                return self.warn(Warning::Malformed {
                    argument: argument.to_string(),
                    reason: "expected '<mode>', '<interface>:<mode>' or the full static form"
                        .to_string(),
                })
            }
        };

        // Without a usable interface there's no record to write to
        if !arg.interface.is_empty() {
            if let Err(e) = parse_interface_name(arg.interface) {
                return self.invalid(argument, e);
            }
        }

        let mut problems = Vec::new();
        let mode = keep(
            parse_mode::<DracutDhcpMode>("dracut DHCP mode", arg.mode),
            &mut problems,
        );
        let address = optional(
            arg.client,
            |client| client_address(client, arg.netmask),
            &mut problems,
        );
        let peer = optional(arg.peer, parse_ip_addr, &mut problems);
        let gateway = optional(arg.gateway, parse_ip_addr, &mut problems);
        let trailing = Trailing::parse(&arg.rest, &mut problems);

        for problem in problems {
            self.invalid(argument, problem);
        }

        let network = self.network(arg.interface);
        if let Some(mode) = mode {
            network.dhcp = Some(DhcpMode::Dracut(mode));
        }
        if let Some(address) = address {
            network.add_address(Address {
                peer,
                ..Address::new(address)
            });
        }
        if let Some(gateway) = gateway {
            network.gateway = Some(gateway);
        }
        if !arg.hostname.is_empty() {
            network.dhcp4_overrides.hostname = Some(arg.hostname.to_string());
        }
        for nameserver in trailing.nameservers {
            network.add_nameserver(nameserver);
        }
        if trailing.mtu.is_some() {
            network.link.mtu = trailing.mtu;
        }
        if trailing.mac.is_some() {
            network.link.mac = trailing.mac;
        }
        network.mark_modified();
        self.last = Some(arg.interface.to_string());
    }

    fn nameserver(&mut self, argument: &str, value: &str) {
        match parse_ip_addr(strip_brackets(value)) {
            Ok(nameserver) => self.current().add_nameserver(nameserver),
            Err(e) => self.invalid(argument, e),
        }
    }

    fn route(&mut self, argument: &str, value: &str) {
        let fields = split_fields(value);
        if fields.len() < 2 || fields.len() > 3 {
            return self.warn(Warning::Malformed {
                argument: argument.to_string(),
                reason: "expected '<net>/<prefix>:<gateway>[:<interface>]'".to_string(),
            });
        }

        let destination = match parse_ip_net(fields[0]) {
            Ok(net) => net,
            Err(e) => return self.invalid(argument, e),
        };
        let gateway = match fields[1] {
            "" => None,
            gateway => match parse_ip_addr(gateway) {
                Ok(gateway) => Some(gateway),
                Err(e) => return self.invalid(argument, e),
            },
        };

        let route = Route {
            destination: Some(RouteTo::Ip(destination)),
            gateway,
            ..Default::default()
        };

        match fields.get(2).copied().filter(|iface| !iface.is_empty()) {
            Some(interface) => match parse_interface_name(interface) {
                Ok(_) => self.network(interface).add_route(route),
                Err(e) => self.invalid(argument, e),
            },
            None => self.current().add_route(route),
        }
    }

    fn peerdns(&mut self, argument: &str, value: &str) {
        match parse_bool(value) {
            Ok(use_dns) => self.peerdns = Some(use_dns),
            Err(e) => self.invalid(argument, e),
        }
    }
}

/// Trailing `ip=` fields hold nameservers if the first one is an address, and an MTU and MAC
/// address otherwise.
#[derive(Debug, Default)]
struct Trailing {
    nameservers: Vec<IpAddr>,
    mtu: Option<u32>,
    mac: Option<MacAddress>,
}

impl Trailing {
    fn parse(rest: &[&str], problems: &mut Vec<parse::Error>) -> Self {
        let mut trailing = Trailing::default();
        let first = match rest.first() {
            Some(first) => *first,
            None => return trailing,
        };

        if parse_ip_addr(first).is_ok() {
            for dns in rest {
                if let Some(dns) = keep(parse_ip_addr(dns), problems) {
                    trailing.nameservers.push(dns);
                }
            }
            return trailing;
        }

        trailing.mtu = optional(first, parse_unsigned::<u32>, problems);
        // The MAC's own colons were split apart along with everything else
        trailing.mac = optional(&rest[1..].join(":"), parse_mac, problems);
        trailing
    }
}

/// The converted value, or `None` with the error set aside for reporting
fn keep<T>(result: parse::Result<T>, problems: &mut Vec<parse::Error>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            problems.push(e);
            None
        }
    }
}

/// Convert `field` unless it was left empty
fn optional<T, F>(field: &str, convert: F, problems: &mut Vec<parse::Error>) -> Option<T>
where
    F: FnOnce(&str) -> parse::Result<T>,
{
    if field.is_empty() {
        return None;
    }
    keep(convert(field), problems)
}

/// Build the client address from the address and netmask fields.  The netmask may be dotted
/// (`255.255.255.0`) or a prefix length (`24`); without one the address is a host address.
fn client_address(client: &str, netmask: &str) -> parse::Result<IpNet> {
    let address = parse_ip_addr(client)?;
    if netmask.is_empty() {
        return Ok(IpNet::from(address));
    }

    let prefix = if netmask.contains('.') {
        match parse_ip_addr(netmask)? {
            IpAddr::V4(mask) => ipnet::ipv4_mask_to_prefix(mask).ok(),
            IpAddr::V6(_) => None,
        }
    } else {
        parse_unsigned::<u8>(netmask).ok()
    };

    prefix
        .and_then(|prefix| IpNet::new(address, prefix).ok())
        .ok_or_else(|| parse::Error::InvalidValue {
            kind: "netmask",
            input: netmask.to_string(),
        })
}

/// Split on colons, except inside `[...]`.  Brackets are removed from the fields.
fn split_fields(value: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut bracketed = false;
    for (i, c) in value.char_indices() {
        match c {
            '[' => bracketed = true,
            ']' => bracketed = false,
            ':' if !bracketed => {
                fields.push(strip_brackets(&value[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(strip_brackets(&value[start..]));
    fields
}

fn strip_brackets(field: &str) -> &str {
    field
        .strip_prefix('[')
        .and_then(|f| f.strip_suffix(']'))
        .unwrap_or(field)
}

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display("Failed to read kernel command line from '{}': {}", path.display(), source))]
        KernelCmdlineReadFailed { path: PathBuf, source: io::Error },
    }
}

pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;
