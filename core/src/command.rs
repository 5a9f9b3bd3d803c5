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

//! Text commands of the `router bgp` configuration that act on neighbors.
//!
//! Each line maps onto one store operation. The positive form of a flag
//! command sets the stored bit; for attributes stored inverted that is the
//! default, so the `no` form configures them. The default form clears a
//! configured setting and otherwise stores an explicit "not configured"
//! override.

use crate::bgp::multiprotocol::{Afi, AfiSafi, Safi};
use crate::log::debug;
use crate::neighbor::store::unknown_entity;
use crate::neighbor::{
    match_tokens, AttrDef, AttrKind, AttrValue, Entity, FilterDirection, NeighborError,
    NeighborStore, PeerId, Scope,
};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Rejected by the neighbor store
    Neighbor(NeighborError),
    /// Line outside the accepted grammar
    Syntax(String),
    /// Neighbor command before `router bgp`
    NoInstance,
    /// Error on a specific line of a multi-line input
    Line {
        number: usize,
        text: String,
        error: Box<CommandError>,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Neighbor(e) => write!(f, "{}", e),
            CommandError::Syntax(msg) => write!(f, "syntax error: {}", msg),
            CommandError::NoInstance => write!(f, "no BGP instance configured"),
            CommandError::Line {
                number,
                text,
                error,
            } => write!(f, "line {} [{}]: {}", number, text, error),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<NeighborError> for CommandError {
    fn from(e: NeighborError) -> Self {
        CommandError::Neighbor(e)
    }
}

/// A configuration session: the BGP instance (if any) and the current
/// address-family context.
#[derive(Debug, Default)]
pub struct CommandSession {
    store: Option<NeighborStore>,
    af: Option<AfiSafi>,
}

impl CommandSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> Option<&NeighborStore> {
        self.store.as_ref()
    }

    pub fn into_store(self) -> Option<NeighborStore> {
        self.store
    }

    /// Current address-family context.
    pub fn address_family(&self) -> Option<AfiSafi> {
        self.af
    }

    /// Run every line of `text`. Blank lines, `!` separators and comments
    /// are skipped. Stops at the first failing line.
    pub fn execute_all(&mut self, text: &str) -> Result<(), CommandError> {
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('!') || trimmed.starts_with('#') {
                continue;
            }
            self.execute(trimmed).map_err(|error| CommandError::Line {
                number: idx + 1,
                text: trimmed.to_string(),
                error: Box::new(error),
            })?;
        }
        Ok(())
    }

    /// Run one command line.
    pub fn execute(&mut self, line: &str) -> Result<(), CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (negate, tokens) = match tokens.split_first() {
            Some((&"no", rest)) => (true, rest),
            _ => (false, tokens.as_slice()),
        };

        let result = match tokens {
            ["router", "bgp", rest @ ..] => self.router_bgp(negate, rest),
            ["bgp", "router-id", rest @ ..] => self.router_id(negate, rest),
            ["bgp", "default", "ipv4-unicast"] => {
                self.store_mut()?.set_default_ipv4_unicast(!negate);
                Ok(())
            }
            ["address-family", afi, rest @ ..] if !negate => self.address_family_enter(afi, rest),
            ["exit-address-family"] | ["exit"] if !negate => {
                self.af = None;
                Ok(())
            }
            ["neighbor", name, rest @ ..] => self.neighbor(negate, name, rest),
            _ => Err(CommandError::Syntax(format!("unknown command: {}", line.trim()))),
        };

        match &result {
            Ok(()) => debug!(command = line.trim(), "command executed"),
            Err(e) => debug!(command = line.trim(), error = %e, "command failed"),
        }
        result
    }

    fn store_mut(&mut self) -> Result<&mut NeighborStore, CommandError> {
        self.store.as_mut().ok_or(CommandError::NoInstance)
    }

    fn router_bgp(&mut self, negate: bool, args: &[&str]) -> Result<(), CommandError> {
        if negate {
            self.store = None;
            self.af = None;
            return Ok(());
        }

        let [asn] = args else {
            return Err(CommandError::Syntax("router bgp requires an AS number".to_string()));
        };
        let asn = parse_asn(asn)?;
        match &self.store {
            Some(store) if store.local_asn() != asn => Err(CommandError::Syntax(format!(
                "BGP is already running; AS is {}",
                store.local_asn()
            ))),
            Some(_) => Ok(()),
            None => {
                self.store = Some(NeighborStore::new(asn));
                self.af = None;
                Ok(())
            }
        }
    }

    fn router_id(&mut self, negate: bool, args: &[&str]) -> Result<(), CommandError> {
        let store = self.store_mut()?;
        if negate {
            store.set_router_id(None);
            return Ok(());
        }
        let [addr] = args else {
            return Err(CommandError::Syntax("bgp router-id requires an address".to_string()));
        };
        let router_id = addr
            .parse::<Ipv4Addr>()
            .map_err(|_| CommandError::Syntax(format!("invalid router-id: {}", addr)))?;
        store.set_router_id(Some(router_id));
        Ok(())
    }

    fn address_family_enter(&mut self, afi: &str, rest: &[&str]) -> Result<(), CommandError> {
        self.store_mut()?;
        let afi = afi.parse::<Afi>().map_err(CommandError::Syntax)?;
        let safi = match rest {
            [] => Safi::Unicast,
            [safi] => safi.parse::<Safi>().map_err(CommandError::Syntax)?,
            _ => {
                return Err(CommandError::Syntax(format!(
                    "unexpected arguments: {}",
                    rest.join(" ")
                )))
            }
        };
        self.af = Some(AfiSafi::new(afi, safi));
        Ok(())
    }

    fn neighbor(&mut self, negate: bool, name: &str, args: &[&str]) -> Result<(), CommandError> {
        match args {
            ["peer-group"] => self.neighbor_peer_group(negate, name),
            ["remote-as", asn] if !negate => self.neighbor_remote_as(name, asn),
            ["interface", rest @ ..] if !negate => self.neighbor_interface(name, rest),
            ["peer-group", group] => self.neighbor_membership(negate, name, group),
            ["activate"] => {
                let af = self.af.unwrap_or(AfiSafi::IPV4_UNICAST);
                let entity = self.resolve_entity(name)?;
                self.store_mut()?.activate(&entity, af, !negate)?;
                Ok(())
            }
            _ => self.neighbor_attribute(negate, name, args),
        }
    }

    fn neighbor_peer_group(&mut self, negate: bool, name: &str) -> Result<(), CommandError> {
        if negate {
            return Err(NeighborError::UnsupportedOperation(format!(
                "peer-group {} cannot be removed",
                name
            ))
            .into());
        }
        self.store_mut()?.add_group(name)?;
        Ok(())
    }

    fn neighbor_remote_as(&mut self, name: &str, asn: &str) -> Result<(), CommandError> {
        let asn = match asn {
            "internal" => self.store_mut()?.local_asn(),
            asn => parse_asn(asn)?,
        };
        let store = self.store_mut()?;
        if let Ok(addr) = name.parse::<IpAddr>() {
            let id = PeerId::Address(addr);
            if store.peer(&id).is_none() {
                store.add_peer(id, Some(asn))?;
                return Ok(());
            }
        }
        let entity = self.resolve_entity(name)?;
        self.store_mut()?.set_remote_as(&entity, asn)?;
        Ok(())
    }

    fn neighbor_interface(&mut self, name: &str, args: &[&str]) -> Result<(), CommandError> {
        if name.parse::<IpAddr>().is_ok() {
            return Err(CommandError::Syntax(format!(
                "{} is an address, not an interface",
                name
            )));
        }
        let (group, asn) = match args {
            [] => (None, None),
            ["peer-group", group] => (Some(*group), None),
            ["remote-as", asn] => (None, Some(parse_asn(asn)?)),
            _ => {
                return Err(CommandError::Syntax(format!(
                    "unexpected arguments: {}",
                    args.join(" ")
                )))
            }
        };

        let id = PeerId::Interface(name.to_string());
        let store = self.store_mut()?;
        if let Some(group) = group {
            if store.group(group).is_none() {
                return Err(unknown_entity(&Entity::Group(group.to_string())).into());
            }
        }
        if store.peer(&id).is_none() {
            store.add_peer(id.clone(), None)?;
        }
        if let Some(group) = group {
            store.join(&id, group)?;
        }
        if let Some(asn) = asn {
            store.set_remote_as(&Entity::Peer(id), asn)?;
        }
        Ok(())
    }

    fn neighbor_membership(
        &mut self,
        negate: bool,
        name: &str,
        group: &str,
    ) -> Result<(), CommandError> {
        let store = self.store_mut()?;
        // an unknown address becomes a peer when the group supplies its remote-as
        if let Ok(addr) = name.parse::<IpAddr>() {
            let id = PeerId::Address(addr);
            let group_asn = store.group(group).and_then(|g| g.remote_asn());
            if !negate && store.peer(&id).is_none() && group_asn.is_some() {
                store.add_peer(id, None)?;
            }
        }

        let id = match self.resolve_entity(name)? {
            Entity::Peer(id) => id,
            Entity::Group(_) => {
                return Err(NeighborError::UnsupportedOperation(format!(
                    "{} is a peer-group",
                    name
                ))
                .into())
            }
        };
        let store = self.store_mut()?;
        if negate {
            store.leave(&id, group)?;
        } else {
            store.join(&id, group)?;
        }
        Ok(())
    }

    fn neighbor_attribute(
        &mut self,
        negate: bool,
        name: &str,
        args: &[&str],
    ) -> Result<(), CommandError> {
        let (def, consumed) = match_tokens(args)
            .ok_or_else(|| NeighborError::UnknownAttribute(args.join(" ")))?;
        let rest = &args[consumed..];
        let entity = self.resolve_entity(name)?;
        let scope = if def.is_af_scoped() {
            Scope::af(self.af.unwrap_or(AfiSafi::IPV4_UNICAST))
        } else {
            Scope::GLOBAL
        };

        let store = self.store_mut()?;
        match def.kind {
            AttrKind::GlobalFlag(_) | AttrKind::AfFlag(_) => {
                // the form matching the entity's polarity undoes a configured
                // setting; without one it is kept as an explicit override
                let configuring = negate == def.inverted_for(&entity);
                if !configuring && store.get(&entity, def.name, scope)?.is_configured() {
                    store.clear_direct(&entity, def.name, scope)?;
                } else {
                    let argument = (!rest.is_empty()).then(|| rest.join(" "));
                    store.set_direct(
                        &entity,
                        def.name,
                        scope,
                        AttrValue::Flag {
                            enabled: !negate,
                            argument,
                        },
                    )?;
                }
            }
            AttrKind::AfFilter(filter) => {
                let (list, direction) = filter_args(def, filter.has_direction(), negate, rest)?;
                let scope = match direction {
                    Some(direction) => scope.with_direction(direction),
                    None => scope,
                };
                match list {
                    Some(list) if !negate => {
                        store.set_direct(&entity, def.name, scope, AttrValue::List(list))?
                    }
                    _ => store.clear_direct(&entity, def.name, scope)?,
                }
            }
            AttrKind::Custom(custom) => {
                if negate {
                    store.clear_direct(&entity, def.name, scope)?;
                } else {
                    let value =
                        custom
                            .parse(rest)
                            .map_err(|reason| NeighborError::InvalidArgument {
                                attr: def.name.to_string(),
                                reason,
                            })?;
                    store.set_direct(&entity, def.name, scope, AttrValue::Number(value))?;
                }
            }
        }
        Ok(())
    }

    /// Name to entity: an address is a peer, otherwise a peer-group of that
    /// name, otherwise an interface peer.
    fn resolve_entity(&self, name: &str) -> Result<Entity, CommandError> {
        let store = self.store.as_ref().ok_or(CommandError::NoInstance)?;
        if let Ok(addr) = name.parse::<IpAddr>() {
            let entity = Entity::Peer(PeerId::Address(addr));
            if store.contains(&entity) {
                return Ok(entity);
            }
        } else {
            let group = Entity::Group(name.to_string());
            if store.contains(&group) {
                return Ok(group);
            }
            let iface = Entity::Peer(PeerId::Interface(name.to_string()));
            if store.contains(&iface) {
                return Ok(iface);
            }
        }
        Err(NeighborError::InvalidEntityState(format!("unknown neighbor {}", name)).into())
    }
}

/// Split filter arguments into list name and direction. The `no` form may
/// leave out the list name.
fn filter_args(
    def: &AttrDef,
    has_direction: bool,
    negate: bool,
    args: &[&str],
) -> Result<(Option<String>, Option<FilterDirection>), CommandError> {
    let parse_direction = |s: &str| {
        s.parse::<FilterDirection>()
            .map_err(|reason| NeighborError::InvalidArgument {
                attr: def.name.to_string(),
                reason,
            })
    };
    let parsed = match (has_direction, args) {
        (true, [list, direction]) => (Some(list.to_string()), Some(parse_direction(*direction)?)),
        (true, [direction]) if negate => (None, Some(parse_direction(*direction)?)),
        (false, [list]) => (Some(list.to_string()), None),
        (false, []) if negate => (None, None),
        _ => {
            let usage = if has_direction { "NAME in|out" } else { "NAME" };
            return Err(NeighborError::InvalidArgument {
                attr: def.name.to_string(),
                reason: format!("expected {}, got: {}", usage, args.join(" ")),
            }
            .into());
        }
    };
    Ok(parsed)
}

fn parse_asn(s: &str) -> Result<u32, CommandError> {
    match s.parse::<u32>() {
        Ok(asn) if asn != 0 => Ok(asn),
        _ => Err(CommandError::Syntax(format!("invalid AS number: {}", s))),
    }
}
