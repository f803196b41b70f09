use super::AddressLifetime;
use ipnet::IpNet;
use std::net::IpAddr;

/// A static address assigned to an interface.  Addresses are keyed by `address`; the other fields
/// are attributes of that key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Address {
    pub(crate) address: IpNet,
    pub(crate) peer: Option<IpAddr>,
    pub(crate) label: Option<String>,
    pub(crate) lifetime: Option<AddressLifetime>,
}

impl Address {
    pub(crate) fn new(address: IpNet) -> Self {
        Self {
            address,
            peer: None,
            label: None,
            lifetime: None,
        }
    }

    pub(crate) fn with_options(address: IpNet, options: AddressOptions) -> Self {
        Self {
            label: options.label,
            lifetime: options.lifetime,
            ..Self::new(address)
        }
    }

    /// Fill in whichever of `options` this address doesn't already have.
    pub(crate) fn merge(&mut self, options: AddressOptions) {
        if self.label.is_none() {
            self.label = options.label;
        }
        if self.lifetime.is_none() {
            self.lifetime = options.lifetime;
        }
    }
}

/// Attributes collected for an address that hasn't been seen yet, or that are about to be
/// attached to one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct AddressOptions {
    pub(crate) label: Option<String>,
    pub(crate) lifetime: Option<AddressLifetime>,
}

impl AddressOptions {
    pub(crate) fn is_empty(&self) -> bool {
        self.label.is_none() && self.lifetime.is_none()
    }

    /// Fill in whichever of `other` these options don't already have.
    pub(crate) fn merge(&mut self, other: AddressOptions) {
        if self.label.is_none() {
            self.label = other.label;
        }
        if self.lifetime.is_none() {
            self.lifetime = other.lifetime;
        }
    }
}
