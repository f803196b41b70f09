//! Validated identifiers a network record can be matched by.
//!
//! Interface names follow the kernel's rules in `dev_valid_name()`:
//! https://elixir.bootlin.com/linux/v5.10.102/source/net/core/dev.c#L1138
use snafu::ensure;
use std::convert::TryFrom;
use std::fmt::Display;
use std::ops::Deref;

// The kernel's buffer size, including the trailing NUL
const IFNAMSIZ: usize = 16;
const MAC_OCTETS: usize = 6;

/// A MAC address.  Either `:` or `-` may separate the octets on input; it always displays as
/// lowercase and colon-separated.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct MacAddress {
    octets: [u8; MAC_OCTETS],
}

impl MacAddress {
    /// The address with no separators, e.g. for use in a file name
    pub(crate) fn compact(&self) -> String {
        self.octets.iter().map(|o| format!("{:02x}", o)).collect()
    }
}

impl TryFrom<&str> for MacAddress {
    type Error = error::Error;

    fn try_from(input: &str) -> Result<Self> {
        let fields: Vec<&str> = input.split([':', '-']).collect();
        ensure!(
            fields.len() == MAC_OCTETS,
            error::InvalidMacAddressSnafu {
                input,
                reason: "must have 6 octets"
            }
        );

        let mut octets = [0; MAC_OCTETS];
        for (octet, field) in octets.iter_mut().zip(fields) {
            // from_str_radix alone would let a sign through, e.g. "+a"
            ensure!(
                field.len() == 2 && field.chars().all(|c| c.is_ascii_hexdigit()),
                error::InvalidMacAddressSnafu {
                    input,
                    reason: "each octet must be 2 hex digits"
                }
            );
            *octet = u8::from_str_radix(field, 16).unwrap_or_default();
        }

        Ok(MacAddress { octets })
    }
}

impl TryFrom<String> for MacAddress {
    type Error = error::Error;

    fn try_from(input: String) -> Result<Self> {
        Self::try_from(input.as_str())
    }
}

impl Display for MacAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let octets: Vec<String> = self.octets.iter().map(|o| format!("{:02x}", o)).collect();
        write!(f, "{}", octets.join(":"))
    }
}

/// A network interface name the kernel would accept.  `:` is refused as well, since the kernel
/// command line uses it as a field separator.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct InterfaceName {
    inner: String,
}

impl TryFrom<String> for InterfaceName {
    type Error = error::Error;

    fn try_from(input: String) -> Result<Self> {
        ensure!(
            !input.is_empty() && input.len() < IFNAMSIZ,
            error::InvalidInterfaceNameSnafu {
                input,
                reason: "must be 1 to 15 bytes long"
            }
        );
        ensure!(
            input != "." && input != "..",
            error::InvalidInterfaceNameSnafu {
                input,
                reason: "must not be '.' or '..'"
            }
        );
        // Covers every Unicode line terminator as well as spaces and tabs
        ensure!(
            !input.contains(|c: char| c.is_whitespace() || c == '/' || c == ':'),
            error::InvalidInterfaceNameSnafu {
                input,
                reason: "must not contain whitespace, '/' or ':'"
            }
        );

        Ok(Self { inner: input })
    }
}

impl TryFrom<&str> for InterfaceName {
    type Error = error::Error;

    fn try_from(input: &str) -> Result<Self> {
        Self::try_from(input.to_string())
    }
}

impl Deref for InterfaceName {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Display for InterfaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    #[allow(clippy::enum_variant_names)]
    pub(crate) enum Error {
        #[snafu(display("Invalid interface name '{}': {}", input, reason))]
        InvalidInterfaceName { input: String, reason: String },

        #[snafu(display("Invalid MAC address '{}': {}", input, reason))]
        InvalidMacAddress { input: String, reason: String },
    }
}

pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;
