use crate::interface_id::InterfaceName;
use std::fmt::Display;
use std::ops::Deref;

/// An 802.1Q VLAN ID, 0-4094.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct VlanId {
    inner: u16,
}

impl VlanId {
    const MAX: u16 = 4094;

    pub(crate) fn new(id: u16) -> Option<Self> {
        (id <= Self::MAX).then_some(Self { inner: id })
    }
}

impl Deref for VlanId {
    type Target = u16;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Display for VlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// The virtual device behind a `vlans` entry: its tag, and the interface it sits on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Vlan {
    pub(crate) id: Option<VlanId>,
    pub(crate) link: Option<InterfaceName>,
}
