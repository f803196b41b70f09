use super::{RouteScope, RouteType};
use crate::parse::{self, parse_ip_net};
use ipnet::IpNet;
use std::net::IpAddr;

/// The destination of a route: either the default route or a specific network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum RouteTo {
    DefaultRoute,
    Ip(IpNet),
}

impl RouteTo {
    pub(crate) fn parse(input: &str) -> parse::Result<Self> {
        if input == "default" {
            return Ok(RouteTo::DefaultRoute);
        }
        parse_ip_net(input).map(RouteTo::Ip)
    }
}

/// A static route.  Two routes are the same route only if every attribute matches.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Route {
    pub(crate) destination: Option<RouteTo>,
    pub(crate) gateway: Option<IpAddr>,
    pub(crate) preferred_source: Option<IpAddr>,
    pub(crate) table: Option<u32>,
    pub(crate) metric: Option<u32>,
    pub(crate) scope: Option<RouteScope>,
    pub(crate) route_type: Option<RouteType>,
    pub(crate) on_link: Option<bool>,
    pub(crate) congestion_window: Option<u32>,
    pub(crate) advertised_receive_window: Option<u32>,
}

impl Route {
    /// If this route is nothing more than "default via X", optionally on-link, return the gateway
    /// and on-link flag so it can be stored as the interface's default gateway.
    pub(crate) fn as_default_gateway(&self) -> Option<(IpAddr, Option<bool>)> {
        let gateway = self.gateway?;
        let bare = Route {
            destination: Some(RouteTo::DefaultRoute),
            gateway: Some(gateway),
            on_link: self.on_link,
            ..Default::default()
        };
        (*self == bare).then_some((gateway, self.on_link))
    }
}

/// A routing policy rule.  As with routes, equality covers every attribute.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RoutingPolicyRule {
    pub(crate) from: Option<IpNet>,
    pub(crate) to: Option<IpNet>,
    pub(crate) table: Option<u32>,
    pub(crate) priority: Option<u32>,
    pub(crate) type_of_service: Option<u8>,
    pub(crate) mark: Option<u32>,
}
