// Copyright 2025 bgpgg Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Neighbor configuration: peers, peer-groups and the attributes configured
//! on them.
//!
//! Attributes are set either directly on a peer or on a peer-group. A peer
//! bound to a group inherits every attribute it does not set itself; what
//! it sets directly is *overridden* and survives group changes. Some
//! attributes are stored inverted (their default is "on"), so the command
//! that configures them is the `no` form.

mod catalog;
mod custom;
mod flags;
mod resolve;
pub(crate) mod store;
mod transfer;

pub use catalog::{
    entries, lookup, match_tokens, validate_list_name, ArgGrammar, Argument, AttrDef, AttrKind,
    FilterDirection, FilterType, PeerInversion,
};
pub use custom::{AdvertisementInterval, CustomAttr};
pub use flags::{AfFlags, PeerFlags};
pub use store::{Group, NeighborStore, Peer};

use crate::bgp::multiprotocol::AfiSafi;
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Type of BGP session based on AS relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionType {
    /// External BGP session (different AS)
    Ebgp,
    /// Internal BGP session (same AS)
    Ibgp,
}

impl SessionType {
    pub fn from_asns(local_asn: u32, remote_asn: u32) -> Self {
        if local_asn == remote_asn {
            SessionType::Ibgp
        } else {
            SessionType::Ebgp
        }
    }
}

/// How a peer is identified in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeerId {
    Address(IpAddr),
    /// Unnumbered peer reached through an interface.
    Interface(String),
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerId::Address(addr) => write!(f, "{}", addr),
            PeerId::Interface(name) => write!(f, "{}", name),
        }
    }
}

/// Addresses parse as [`PeerId::Address`], anything else names an interface.
impl FromStr for PeerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty peer identifier".to_string());
        }
        Ok(match s.parse::<IpAddr>() {
            Ok(addr) => PeerId::Address(addr),
            Err(_) => PeerId::Interface(s.to_string()),
        })
    }
}

/// Something attributes can be configured on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Peer(PeerId),
    Group(String),
}

impl Entity {
    pub fn is_group(&self) -> bool {
        matches!(self, Entity::Group(_))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Peer(id) => write!(f, "{}", id),
            Entity::Group(name) => write!(f, "{}", name),
        }
    }
}

/// Where an attribute applies: session wide, or per address family and,
/// for filters, per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Scope {
    pub afi_safi: Option<AfiSafi>,
    pub direction: Option<FilterDirection>,
}

impl Scope {
    pub const GLOBAL: Scope = Scope {
        afi_safi: None,
        direction: None,
    };

    pub fn af(afi_safi: AfiSafi) -> Self {
        Scope {
            afi_safi: Some(afi_safi),
            direction: None,
        }
    }

    pub fn with_direction(self, direction: FilterDirection) -> Self {
        Scope {
            direction: Some(direction),
            ..self
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.afi_safi, self.direction) {
            (None, _) => write!(f, "global"),
            (Some(afi_safi), None) => write!(f, "{}", afi_safi),
            (Some(afi_safi), Some(direction)) => write!(f, "{} {}", afi_safi, direction),
        }
    }
}

/// State of one attribute on one entity.
///
/// `value` is the stored bit, so for an inverted attribute `value == false`
/// means "configured". `overridden` is only ever true on a peer that
/// carries the setting itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttrState {
    pub value: bool,
    pub overridden: bool,
    pub inverted: bool,
    /// List name for filters, command arguments for flags that take them,
    /// the resolved number for custom attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,
}

impl AttrState {
    /// Whether the attribute differs from its default.
    pub fn is_configured(&self) -> bool {
        self.value != self.inverted
    }
}

/// Value handed to [`NeighborStore::set_direct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Flag attributes. `enabled` is the stored bit, the positive form of
    /// the command: `enabled: false` configures an inverted attribute.
    Flag {
        enabled: bool,
        argument: Option<String>,
    },
    /// Filter attributes: the list or map name.
    List(String),
    /// Custom attributes.
    Number(u32),
}

impl AttrValue {
    pub fn flag(enabled: bool) -> Self {
        AttrValue::Flag {
            enabled,
            argument: None,
        }
    }
}

/// Errors returned by neighbor configuration operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborError {
    /// No catalog entry with this name
    UnknownAttribute(String),
    /// Attribute used in a way it does not support (wrong scope, wrong
    /// value type, iBGP-only attribute on an eBGP neighbor)
    UnsupportedOperation(String),
    /// Unknown or duplicate peer/group, or a membership change that does
    /// not apply
    InvalidEntityState(String),
    /// Argument rejected by the attribute's grammar
    InvalidArgument { attr: String, reason: String },
}

impl fmt::Display for NeighborError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborError::UnknownAttribute(name) => write!(f, "unknown attribute: {}", name),
            NeighborError::UnsupportedOperation(msg) => write!(f, "unsupported operation: {}", msg),
            NeighborError::InvalidEntityState(msg) => write!(f, "invalid entity state: {}", msg),
            NeighborError::InvalidArgument { attr, reason } => {
                write!(f, "invalid argument for {}: {}", attr, reason)
            }
        }
    }
}

impl std::error::Error for NeighborError {}
