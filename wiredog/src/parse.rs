//! The parse module contains the primitive parsers shared by the YAML walker and the kernel
//! command line compiler.  Each one takes a single scalar token and returns a typed value or a
//! typed error; none of them have side effects.
use crate::interface_id::{InterfaceName, MacAddress};
use crate::network::VlanId;
use ipnet::IpNet;
use snafu::{ensure, OptionExt, ResultExt};
use std::convert::TryFrom;
use std::net::IpAddr;
use std::str::FromStr;

const TRUE_TOKENS: [&str; 6] = ["1", "y", "yes", "t", "true", "on"];
const FALSE_TOKENS: [&str; 6] = ["0", "n", "no", "f", "false", "off"];

/// Parse a boolean token, ignoring case.
pub(crate) fn parse_bool(input: &str) -> Result<bool> {
    if TRUE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(input)) {
        return Ok(true);
    }
    if FALSE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(input)) {
        return Ok(false);
    }
    error::InvalidBooleanSnafu { input }.fail()
}

/// Parse a decimal or `0x`-prefixed hexadecimal unsigned integer that must fit in `T`.
pub(crate) fn parse_unsigned<T>(input: &str) -> Result<T>
where
    T: TryFrom<u64>,
{
    let input = input.trim();
    let (digits, radix) = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (input, 10),
    };

    ensure!(
        !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)),
        error::NotANumberSnafu { input }
    );

    let target = std::any::type_name::<T>();
    // Every character is a valid digit at this point, so the only possible failure is overflow
    let value = u64::from_str_radix(digits, radix)
        .ok()
        .context(error::OverflowSnafu { input, target })?;
    T::try_from(value)
        .ok()
        .context(error::OverflowSnafu { input, target })
}

/// Parse a bare IPv4 or IPv6 address.
pub(crate) fn parse_ip_addr(input: &str) -> Result<IpAddr> {
    IpAddr::from_str(input)
        .ok()
        .context(error::InvalidAddressSnafu { input })
}

/// Parse an address with an optional prefix length.  A bare address gets the host prefix (/32 or
/// /128).  The host bits are kept; `10.0.0.5/24` stays `10.0.0.5/24`.
pub(crate) fn parse_ip_net(input: &str) -> Result<IpNet> {
    if input.contains('/') {
        IpNet::from_str(input)
            .ok()
            .context(error::InvalidAddressSnafu { input })
    } else {
        parse_ip_addr(input).map(IpNet::from)
    }
}

pub(crate) fn parse_mac(input: &str) -> Result<MacAddress> {
    MacAddress::try_from(input).context(error::InvalidMacAddressSnafu)
}

pub(crate) fn parse_interface_name(input: &str) -> Result<InterfaceName> {
    InterfaceName::try_from(input).context(error::InvalidInterfaceNameSnafu)
}

/// Whether `input` can be written between double quotes in a configuration file: no quotes and
/// no control characters such as newlines.
pub(crate) fn is_quotable(input: &str) -> bool {
    !input.chars().any(|c| c == '"' || c.is_control())
}

/// Accept text that will be written between double quotes.
pub(crate) fn parse_quotable(input: &str) -> Result<&str> {
    ensure!(is_quotable(input), error::UnquotableSnafu { input });
    Ok(input)
}

/// Parse an 802.1Q VLAN ID.  4095 is reserved, so the range is 0-4094.
pub(crate) fn parse_vlan_id(input: &str) -> Result<VlanId> {
    let id = parse_unsigned::<u16>(input)?;
    VlanId::new(id).context(error::InvalidValueSnafu {
        kind: "VLAN ID",
        input,
    })
}

/// Parse one of the named values of an enumerated mode, ignoring case.  `kind` names the mode in
/// the error message.
pub(crate) fn parse_mode<T: FromStr>(kind: &'static str, input: &str) -> Result<T> {
    input
        .to_ascii_lowercase()
        .parse::<T>()
        .ok()
        .context(error::InvalidValueSnafu { kind, input })
}

mod error {
    use crate::interface_id;
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display("Invalid boolean '{}'", input))]
        InvalidBoolean { input: String },

        #[snafu(display("Value '{}' does not fit in {}", input, target))]
        Overflow { input: String, target: &'static str },

        #[snafu(display("'{}' is not a number", input))]
        NotANumber { input: String },

        #[snafu(display("Invalid IP address '{}'", input))]
        InvalidAddress { input: String },

        #[snafu(display("{}", source))]
        InvalidMacAddress { source: interface_id::Error },

        #[snafu(display("{}", source))]
        InvalidInterfaceName { source: interface_id::Error },

        #[snafu(display("Invalid {} '{}'", kind, input))]
        InvalidValue { kind: &'static str, input: String },

        #[snafu(display("'{}' contains a double quote or a control character", input))]
        Unquotable { input: String },
    }
}

pub(crate) use error::Error;
pub(crate) type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RequiredFamily;

    #[test]
    fn bool_tokens() {
        for t in ["1", "y", "yes", "t", "true", "on", "YES", "True", "On"] {
            assert!(parse_bool(t).unwrap(), "{}", t);
        }
        for f in ["0", "n", "no", "f", "false", "off", "NO", "False", "OFF"] {
            assert!(!parse_bool(f).unwrap(), "{}", f);
        }
    }

    #[test]
    fn bool_rejects_everything_else() {
        for bad in ["", "2", "yess", "enable", "nope", " yes", "-1"] {
            assert!(
                matches!(parse_bool(bad), Err(Error::InvalidBoolean { .. })),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn unsigned_decimal_and_hex() {
        assert_eq!(parse_unsigned::<u32>("1500").unwrap(), 1500);
        assert_eq!(parse_unsigned::<u32>("0x5dc").unwrap(), 1500);
        assert_eq!(parse_unsigned::<u32>("0X5DC").unwrap(), 1500);
        assert_eq!(parse_unsigned::<u8>("255").unwrap(), 255);
        assert_eq!(parse_unsigned::<u64>("0").unwrap(), 0);
        assert_eq!(parse_unsigned::<u16>(" 9000 ").unwrap(), 9000);
    }

    #[test]
    fn unsigned_overflow() {
        assert!(matches!(
            parse_unsigned::<u8>("256"),
            Err(Error::Overflow { .. })
        ));
        assert!(matches!(
            parse_unsigned::<u32>("4294967296"),
            Err(Error::Overflow { .. })
        ));
        assert!(matches!(
            parse_unsigned::<u64>("99999999999999999999999"),
            Err(Error::Overflow { .. })
        ));
    }

    #[test]
    fn unsigned_not_a_number() {
        for bad in ["", "0x", "-1", "+1", "12a", "1.5", "ten", "0xfg"] {
            assert!(
                matches!(parse_unsigned::<u32>(bad), Err(Error::NotANumber { .. })),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn ip_net_accepts_bare_and_prefixed() {
        assert_eq!(
            parse_ip_net("192.168.1.10/24").unwrap().to_string(),
            "192.168.1.10/24"
        );
        assert_eq!(parse_ip_net("10.0.0.1").unwrap().to_string(), "10.0.0.1/32");
        assert_eq!(parse_ip_net("fe80::1/64").unwrap().to_string(), "fe80::1/64");
        assert_eq!(parse_ip_net("2001:db8::1").unwrap().to_string(), "2001:db8::1/128");
    }

    #[test]
    fn invalid_addresses() {
        for bad in ["", "10.0.0", "10.0.0.256", "10.0.0.1/33", "fe80::1::2", "default"] {
            assert!(
                matches!(parse_ip_net(bad), Err(Error::InvalidAddress { .. })),
                "{:?}",
                bad
            );
        }
        assert!(parse_ip_addr("10.0.0.1/24").is_err());
    }

    #[test]
    fn mac_and_name() {
        assert_eq!(
            parse_mac("00:11:22:AA:BB:CC").unwrap().to_string(),
            "00:11:22:aa:bb:cc"
        );
        assert!(matches!(
            parse_mac("00:11:22"),
            Err(Error::InvalidMacAddress { .. })
        ));
        for signed in ["+a:bb:cc:dd:ee:ff", "aa:bb:cc:dd:ee:+f"] {
            assert!(parse_mac(signed).is_err(), "{}", signed);
        }
        assert!(parse_interface_name("eth0").is_ok());
        assert!(parse_interface_name("eth 0").is_err());
    }

    #[test]
    fn quotable_text() {
        assert_eq!(parse_quotable("hunter 22!").unwrap(), "hunter 22!");
        for bad in ["a\"b", "line\nbreak", "tab\there", "\u{7f}"] {
            assert!(
                matches!(parse_quotable(bad), Err(Error::Unquotable { .. })),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn vlan_ids() {
        assert_eq!(*parse_vlan_id("0").unwrap(), 0);
        assert_eq!(*parse_vlan_id("4094").unwrap(), 4094);
        assert_eq!(parse_vlan_id("0x64").unwrap().to_string(), "100");
        assert!(matches!(
            parse_vlan_id("4095"),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(parse_vlan_id("70000"), Err(Error::Overflow { .. })));
        assert!(matches!(parse_vlan_id("ten"), Err(Error::NotANumber { .. })));
    }

    #[test]
    fn modes_ignore_case() {
        let family: RequiredFamily = parse_mode("required family", "IPv4").unwrap();
        assert_eq!(family, RequiredFamily::Ipv4);
        assert!(matches!(
            parse_mode::<RequiredFamily>("required family", "ipv5"),
            Err(Error::InvalidValue { .. })
        ));
    }
}
