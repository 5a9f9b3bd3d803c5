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

use super::catalog::{entries, lookup, validate_list_name, AttrDef, AttrKind, FilterType};
use super::flags::{AfFlags, PeerFlags};
use super::{AttrState, AttrValue, Entity, NeighborError, PeerId, Scope, SessionType};
use crate::bgp::multiprotocol::AfiSafi;
use crate::log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::{IpAddr, Ipv4Addr};

/// Unit of storage. Compound attributes occupy one slot per flag bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Slot {
    Peer(PeerFlags),
    Af(AfFlags),
    Filter(FilterType),
    Custom(&'static str),
}

impl Slot {
    /// Raw flag bit of the slot when it belongs to `scope`'s flag space.
    fn flag_bit(&self, scope: Scope) -> Option<u32> {
        match self {
            Slot::Peer(flag) if scope.afi_safi.is_none() => Some(flag.0),
            Slot::Af(flag) if scope.afi_safi.is_some() => Some(flag.0),
            _ => None,
        }
    }

    pub(crate) fn for_attr(def: &AttrDef) -> Vec<Slot> {
        match def.kind {
            AttrKind::GlobalFlag(flags) => flags.bits().map(Slot::Peer).collect(),
            AttrKind::AfFlag(flags) => flags.bits().map(Slot::Af).collect(),
            AttrKind::AfFilter(filter) => vec![Slot::Filter(filter)],
            AttrKind::Custom(_) => vec![Slot::Custom(def.name)],
        }
    }
}

/// Explicit configuration held by a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Setting {
    /// `configured` is the logical setting, before the entity's inversion
    /// polarity is applied.
    Flag {
        configured: bool,
        argument: Option<String>,
    },
    List(String),
    Number(u32),
}

/// Attribute settings and activated families of a peer or group.
#[derive(Debug, Clone, Default)]
pub(crate) struct NeighborConf {
    pub(crate) settings: HashMap<(Slot, Scope), Setting>,
    pub(crate) activated: BTreeSet<AfiSafi>,
    /// Custom values a peer keeps installed after removing its own setting
    /// while its group still configures the attribute.
    pub(crate) retained: HashMap<&'static str, u32>,
}

impl NeighborConf {
    pub(crate) fn setting(&self, slot: Slot, scope: Scope) -> Option<&Setting> {
        self.settings.get(&(slot, scope))
    }

    /// Flag bits held in `scope` whose logical setting is `configured`.
    pub(crate) fn flag_bits(&self, scope: Scope, configured: bool) -> u32 {
        self.settings
            .iter()
            .filter(|((_, slot_scope), setting)| {
                *slot_scope == scope
                    && matches!(setting, Setting::Flag { configured: c, .. } if *c == configured)
            })
            .filter_map(|((slot, _), _)| slot.flag_bit(scope))
            .fold(0, |mask, bit| mask | bit)
    }

    /// Drop flag bits in `scope` that no catalog command covers any more,
    /// like the `all` bit of `remove-private-AS all` once
    /// `remove-private-AS` is cleared. Returns the dropped bits.
    fn prune_flags(&mut self, scope: Scope) -> u32 {
        let in_af = scope.afi_safi.is_some();
        let mut dropped = 0;
        for configured in [true, false] {
            let held = self.flag_bits(scope, configured);
            let covered = entries()
                .iter()
                .filter(|def| def.is_af_scoped() == in_af)
                .filter_map(AttrDef::flag_mask)
                .filter(|mask| held & mask == *mask)
                .fold(0, |acc, mask| acc | mask);
            dropped |= held & !covered;
        }
        if dropped != 0 {
            self.settings.retain(|(slot, slot_scope), _| {
                *slot_scope != scope || slot.flag_bit(scope).map_or(true, |bit| bit & dropped == 0)
            });
        }
        dropped
    }
}

#[derive(Debug, Clone)]
pub struct Peer {
    pub(super) id: PeerId,
    pub(super) remote_asn: Option<u32>,
    pub(super) group: Option<String>,
    pub(super) conf: NeighborConf,
}

impl Peer {
    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn remote_asn(&self) -> Option<u32> {
        self.remote_asn
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.id, PeerId::Interface(_))
    }

    pub fn is_activated(&self, afi_safi: AfiSafi) -> bool {
        self.conf.activated.contains(&afi_safi)
    }

    pub fn entity(&self) -> Entity {
        Entity::Peer(self.id.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub(super) name: String,
    pub(super) remote_asn: Option<u32>,
    pub(super) conf: NeighborConf,
}

impl Group {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn remote_asn(&self) -> Option<u32> {
        self.remote_asn
    }

    pub fn is_activated(&self, afi_safi: AfiSafi) -> bool {
        self.conf.activated.contains(&afi_safi)
    }

    pub fn entity(&self) -> Entity {
        Entity::Group(self.name.clone())
    }
}

/// Peers and peer-groups of one BGP instance.
///
/// Only explicit configuration is stored. Inherited values are computed on
/// every query (see [`NeighborStore::effective`]), so a change on a group is
/// visible on its members immediately and a peer leaving a group keeps
/// exactly what it configured itself.
#[derive(Debug, Clone)]
pub struct NeighborStore {
    pub(super) local_asn: u32,
    pub(super) router_id: Option<Ipv4Addr>,
    pub(super) default_ipv4_unicast: bool,
    pub(super) peers: BTreeMap<PeerId, Peer>,
    pub(super) groups: BTreeMap<String, Group>,
}

impl NeighborStore {
    pub fn new(local_asn: u32) -> Self {
        NeighborStore {
            local_asn,
            router_id: None,
            default_ipv4_unicast: true,
            peers: BTreeMap::new(),
            groups: BTreeMap::new(),
        }
    }

    pub fn local_asn(&self) -> u32 {
        self.local_asn
    }

    pub fn router_id(&self) -> Option<Ipv4Addr> {
        self.router_id
    }

    pub fn set_router_id(&mut self, router_id: Option<Ipv4Addr>) {
        self.router_id = router_id;
    }

    /// Whether peers created from now on start out activated for IPv4
    /// unicast.
    pub fn default_ipv4_unicast(&self) -> bool {
        self.default_ipv4_unicast
    }

    pub fn set_default_ipv4_unicast(&mut self, enabled: bool) {
        self.default_ipv4_unicast = enabled;
    }

    pub fn peer(&self, id: &PeerId) -> Option<&Peer> {
        self.peers.get(id)
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn contains(&self, entity: &Entity) -> bool {
        self.conf(entity).is_ok()
    }

    pub fn add_peer(&mut self, id: PeerId, remote_asn: Option<u32>) -> Result<(), NeighborError> {
        if self.peers.contains_key(&id) {
            return Err(NeighborError::InvalidEntityState(format!(
                "peer {} already exists",
                id
            )));
        }
        if let PeerId::Interface(name) = &id {
            if self.groups.contains_key(name) {
                return Err(NeighborError::InvalidEntityState(format!(
                    "{} is already a peer-group",
                    name
                )));
            }
        }

        let mut conf = NeighborConf::default();
        if self.default_ipv4_unicast {
            conf.activated.insert(AfiSafi::IPV4_UNICAST);
        }
        debug!(peer = %id, ?remote_asn, "peer created");
        self.peers.insert(
            id.clone(),
            Peer {
                id,
                remote_asn,
                group: None,
                conf,
            },
        );
        Ok(())
    }

    pub fn add_group(&mut self, name: &str) -> Result<(), NeighborError> {
        if name.is_empty() || name.parse::<IpAddr>().is_ok() {
            return Err(NeighborError::InvalidEntityState(format!(
                "invalid peer-group name: {}",
                name
            )));
        }
        if self.groups.contains_key(name) {
            return Err(NeighborError::InvalidEntityState(format!(
                "peer-group {} already exists",
                name
            )));
        }
        if self.peers.contains_key(&PeerId::Interface(name.to_string())) {
            return Err(NeighborError::InvalidEntityState(format!(
                "{} is already an interface peer",
                name
            )));
        }

        debug!(group = name, "peer-group created");
        self.groups.insert(
            name.to_string(),
            Group {
                name: name.to_string(),
                remote_asn: None,
                conf: NeighborConf::default(),
            },
        );
        Ok(())
    }

    /// Change the remote AS of an existing peer or group. A grouped peer
    /// cannot disagree with a remote AS configured on its group.
    pub fn set_remote_as(&mut self, entity: &Entity, asn: u32) -> Result<(), NeighborError> {
        match entity {
            Entity::Peer(id) => {
                let peer = self.peers.get(id).ok_or_else(|| unknown_entity(entity))?;
                let group_asn = peer
                    .group
                    .as_ref()
                    .and_then(|name| self.groups.get(name))
                    .and_then(|group| group.remote_asn);
                if matches!(group_asn, Some(group_asn) if group_asn != asn) {
                    return Err(NeighborError::InvalidEntityState(format!(
                        "peer {} is a member of a peer-group with a different remote-as",
                        id
                    )));
                }
                if let Some(peer) = self.peers.get_mut(id) {
                    peer.remote_asn = Some(asn);
                }
            }
            Entity::Group(name) => {
                if !self.groups.contains_key(name) {
                    return Err(unknown_entity(entity));
                }
                let conflict = self.peers.values().any(|peer| {
                    peer.group.as_deref() == Some(name.as_str())
                        && matches!(peer.remote_asn, Some(peer_asn) if peer_asn != asn)
                });
                if conflict {
                    return Err(NeighborError::InvalidEntityState(format!(
                        "peer-group {} has members with a different remote-as",
                        name
                    )));
                }
                if let Some(group) = self.groups.get_mut(name) {
                    group.remote_asn = Some(asn);
                }
            }
        }
        debug!(%entity, asn, "remote-as set");
        Ok(())
    }

    /// Activate or deactivate an address family. Activation is tracked per
    /// entity and is not inherited.
    pub fn activate(
        &mut self,
        entity: &Entity,
        afi_safi: AfiSafi,
        active: bool,
    ) -> Result<(), NeighborError> {
        let conf = self.conf_mut(entity)?;
        if active {
            conf.activated.insert(afi_safi);
        } else {
            conf.activated.remove(&afi_safi);
        }
        debug!(%entity, %afi_safi, active, "address family activation changed");
        Ok(())
    }

    /// Remote AS of an entity. Peers without their own fall back to their
    /// group's.
    pub fn remote_asn(&self, entity: &Entity) -> Result<Option<u32>, NeighborError> {
        match entity {
            Entity::Peer(id) => {
                let peer = self.peers.get(id).ok_or_else(|| unknown_entity(entity))?;
                Ok(peer.remote_asn.or_else(|| {
                    peer.group
                        .as_ref()
                        .and_then(|name| self.groups.get(name))
                        .and_then(|group| group.remote_asn)
                }))
            }
            Entity::Group(name) => self
                .groups
                .get(name)
                .map(|group| group.remote_asn)
                .ok_or_else(|| unknown_entity(entity)),
        }
    }

    /// Session type of an entity. Without a known remote AS the session is
    /// treated as external.
    pub fn session_type(&self, entity: &Entity) -> Result<SessionType, NeighborError> {
        Ok(self
            .remote_asn(entity)?
            .map(|asn| SessionType::from_asns(self.local_asn, asn))
            .unwrap_or(SessionType::Ebgp))
    }

    /// Store an explicit setting on `entity`. The whole attribute is
    /// validated before anything is written.
    pub fn set_direct(
        &mut self,
        entity: &Entity,
        attr: &str,
        scope: Scope,
        value: AttrValue,
    ) -> Result<(), NeighborError> {
        let def = lookup(attr)?;
        check_scope(def, &scope)?;
        self.conf(entity)?;
        self.check_session(entity, def)?;

        let setting = match (def.kind, value) {
            (AttrKind::GlobalFlag(_) | AttrKind::AfFlag(_), AttrValue::Flag { enabled, argument }) => {
                let configured = enabled != def.inverted_for(entity);
                let argument = if configured {
                    def.argument.validate(def.name, argument.as_deref())?
                } else {
                    None
                };
                Setting::Flag {
                    configured,
                    argument,
                }
            }
            (AttrKind::AfFilter(_), AttrValue::List(name)) => {
                validate_list_name(&name).map_err(|reason| NeighborError::InvalidArgument {
                    attr: def.name.to_string(),
                    reason,
                })?;
                Setting::List(name)
            }
            (AttrKind::Custom(custom), AttrValue::Number(value)) => {
                custom
                    .validate(value)
                    .map_err(|reason| NeighborError::InvalidArgument {
                        attr: def.name.to_string(),
                        reason,
                    })?;
                Setting::Number(value)
            }
            (_, value) => {
                return Err(NeighborError::UnsupportedOperation(format!(
                    "{} does not accept {:?}",
                    def.name, value
                )))
            }
        };

        debug!(%entity, attr, %scope, ?setting, "attribute set");
        let conf = self.conf_mut(entity)?;
        for slot in Slot::for_attr(def) {
            conf.settings.insert((slot, scope), setting.clone());
        }
        if let AttrKind::Custom(_) = def.kind {
            conf.retained.remove(def.name);
        }
        Self::prune(entity, conf, def, scope);
        Ok(())
    }

    /// Remove explicit settings. A grouped peer goes back to inheriting,
    /// anything else back to the default. Clearing an unset attribute is
    /// not an error.
    pub fn clear_direct(
        &mut self,
        entity: &Entity,
        attr: &str,
        scope: Scope,
    ) -> Result<(), NeighborError> {
        let def = lookup(attr)?;
        check_scope(def, &scope)?;
        let group_sets = match def.kind {
            AttrKind::Custom(_) => self
                .parent(entity)?
                .is_some_and(|conf| conf.setting(Slot::Custom(def.name), scope).is_some()),
            _ => false,
        };

        let conf = self.conf_mut(entity)?;
        for slot in Slot::for_attr(def) {
            if let Some(Setting::Number(value)) = conf.settings.remove(&(slot, scope)) {
                if group_sets {
                    conf.retained.insert(def.name, value);
                } else {
                    conf.retained.remove(def.name);
                }
            }
        }
        debug!(%entity, attr, %scope, "attribute cleared");
        Self::prune(entity, conf, def, scope);

        if let (AttrKind::Custom(_), Entity::Group(name)) = (def.kind, entity) {
            for peer in self.peers.values_mut() {
                if peer.group.as_deref() == Some(name.as_str()) {
                    peer.conf.retained.remove(def.name);
                }
            }
        }
        Ok(())
    }

    fn prune(entity: &Entity, conf: &mut NeighborConf, def: &AttrDef, scope: Scope) {
        if def.flag_mask().is_none() {
            return;
        }
        let dropped = conf.prune_flags(scope);
        if dropped != 0 {
            debug!(%entity, attr = def.name, %scope, dropped, "orphaned flag bits dropped");
        }
    }

    /// State stored on the entity itself, ignoring inheritance.
    pub fn get(&self, entity: &Entity, attr: &str, scope: Scope) -> Result<AttrState, NeighborError> {
        let def = lookup(attr)?;
        check_scope(def, &scope)?;
        self.resolve(entity, def, scope, false)
    }

    pub(crate) fn conf(&self, entity: &Entity) -> Result<&NeighborConf, NeighborError> {
        match entity {
            Entity::Peer(id) => self.peers.get(id).map(|peer| &peer.conf),
            Entity::Group(name) => self.groups.get(name).map(|group| &group.conf),
        }
        .ok_or_else(|| unknown_entity(entity))
    }

    fn conf_mut(&mut self, entity: &Entity) -> Result<&mut NeighborConf, NeighborError> {
        match entity {
            Entity::Peer(id) => self.peers.get_mut(id).map(|peer| &mut peer.conf),
            Entity::Group(name) => self.groups.get_mut(name).map(|group| &mut group.conf),
        }
        .ok_or_else(|| unknown_entity(entity))
    }

    fn check_session(&self, entity: &Entity, def: &AttrDef) -> Result<(), NeighborError> {
        if !def.ibgp_only {
            return Ok(());
        }
        match self.remote_asn(entity)? {
            Some(asn) if SessionType::from_asns(self.local_asn, asn) == SessionType::Ebgp => {
                Err(NeighborError::UnsupportedOperation(format!(
                    "{} is only valid for iBGP neighbors",
                    def.name
                )))
            }
            _ => Ok(()),
        }
    }
}

pub(crate) fn unknown_entity(entity: &Entity) -> NeighborError {
    match entity {
        Entity::Peer(id) => NeighborError::InvalidEntityState(format!("unknown peer {}", id)),
        Entity::Group(name) => {
            NeighborError::InvalidEntityState(format!("unknown peer-group {}", name))
        }
    }
}

/// Reject scopes that do not fit the attribute kind.
pub(crate) fn check_scope(def: &AttrDef, scope: &Scope) -> Result<(), NeighborError> {
    let reason = match (def.kind, scope.afi_safi, scope.direction) {
        (AttrKind::GlobalFlag(_) | AttrKind::Custom(_), Some(_), _)
        | (AttrKind::GlobalFlag(_) | AttrKind::Custom(_), _, Some(_)) => {
            "is not address-family specific"
        }
        (AttrKind::AfFlag(_) | AttrKind::AfFilter(_), None, _) => "requires an address family",
        (AttrKind::AfFlag(_), _, Some(_)) => "does not take a direction",
        (AttrKind::AfFilter(filter), _, None) if filter.has_direction() => {
            "requires a direction"
        }
        (AttrKind::AfFilter(filter), _, Some(_)) if !filter.has_direction() => {
            "does not take a direction"
        }
        _ => return Ok(()),
    };
    Err(NeighborError::UnsupportedOperation(format!(
        "{} {}",
        def.name, reason
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbor::FilterDirection;
    use crate::test_helpers::*;

    #[test]
    fn test_add_entities() {
        let mut store = create_test_store();
        assert!(store.contains(&peer()));
        assert!(store.contains(&group()));
        assert_eq!(store.peer(&peer_id()).unwrap().remote_asn(), Some(PEER_ASN));
        assert!(store.peer(&peer_id()).unwrap().group().is_none());

        assert!(matches!(
            store.add_peer(peer_id(), None),
            Err(NeighborError::InvalidEntityState(_))
        ));
        assert!(matches!(
            store.add_group(GROUP),
            Err(NeighborError::InvalidEntityState(_))
        ));
        assert!(store.add_group("10.0.0.1").is_err());
        assert!(store
            .add_peer(PeerId::Interface(GROUP.to_string()), None)
            .is_err());

        store
            .add_peer(PeerId::Interface("eth0".to_string()), None)
            .unwrap();
        assert!(store.add_group("eth0").is_err());
    }

    #[test]
    fn test_default_ipv4_unicast_activation() {
        let mut store = NeighborStore::new(LOCAL_ASN);
        store.add_peer(peer_id(), Some(PEER_ASN)).unwrap();
        assert!(store.peer(&peer_id()).unwrap().is_activated(ipv4_unicast()));

        let mut store = NeighborStore::new(LOCAL_ASN);
        store.set_default_ipv4_unicast(false);
        store.add_peer(peer_id(), Some(PEER_ASN)).unwrap();
        assert!(!store.peer(&peer_id()).unwrap().is_activated(ipv4_unicast()));

        store.activate(&peer(), AfiSafi::IPV6_UNICAST, true).unwrap();
        assert!(store.peer(&peer_id()).unwrap().is_activated(AfiSafi::IPV6_UNICAST));
        store.activate(&peer(), AfiSafi::IPV6_UNICAST, false).unwrap();
        assert!(!store.peer(&peer_id()).unwrap().is_activated(AfiSafi::IPV6_UNICAST));
    }

    #[test]
    fn test_session_type() {
        let mut store = create_test_store();
        assert_eq!(store.session_type(&peer()).unwrap(), SessionType::Ebgp);
        assert_eq!(store.session_type(&group()).unwrap(), SessionType::Ebgp);

        store.set_remote_as(&peer(), LOCAL_ASN).unwrap();
        assert_eq!(store.session_type(&peer()).unwrap(), SessionType::Ibgp);

        let unknown = Entity::Group("NOPE".to_string());
        assert!(store.session_type(&unknown).is_err());
    }

    #[test]
    fn test_set_direct_stores_logical_value() {
        let mut store = create_test_store();
        let scope = Scope::af(ipv4_unicast());

        // send-community is on by default; clearing the bit configures it
        store
            .set_direct(&peer(), "send-community", scope, AttrValue::flag(false))
            .unwrap();
        let conf = store.conf(&peer()).unwrap();
        assert_eq!(
            conf.setting(Slot::Af(AfFlags::SEND_COMMUNITY), scope),
            Some(&Setting::Flag {
                configured: true,
                argument: None
            })
        );

        let state = store.get(&peer(), "send-community", scope).unwrap();
        assert!(!state.value);
        assert!(state.inverted);
        assert!(state.overridden);
        assert!(state.is_configured());
    }

    #[test]
    fn test_set_direct_compound() {
        let mut store = create_test_store();
        let scope = Scope::af(ipv4_unicast());
        store
            .set_direct(
                &peer(),
                "attribute-unchanged as-path med",
                scope,
                AttrValue::flag(true),
            )
            .unwrap();

        let conf = store.conf(&peer()).unwrap();
        assert_eq!(conf.settings.len(), 2);
        assert!(conf
            .setting(Slot::Af(AfFlags::AS_PATH_UNCHANGED), scope)
            .is_some());
        assert!(conf.setting(Slot::Af(AfFlags::MED_UNCHANGED), scope).is_some());
        assert!(store
            .get(&peer(), "attribute-unchanged med", scope)
            .unwrap()
            .value);
        assert!(!store
            .get(&peer(), "attribute-unchanged next-hop", scope)
            .unwrap()
            .value);

        store
            .clear_direct(&peer(), "attribute-unchanged as-path", scope)
            .unwrap();
        assert_eq!(store.conf(&peer()).unwrap().settings.len(), 1);
    }

    #[test]
    fn test_clearing_compound_base_drops_siblings() {
        let mut store = create_test_store();
        let scope = Scope::af(ipv4_unicast());
        for compound in ["remove-private-AS all", "remove-private-AS replace-AS"] {
            store
                .set_direct(&peer(), compound, scope, AttrValue::flag(true))
                .unwrap();
            store
                .clear_direct(&peer(), "remove-private-AS", scope)
                .unwrap();

            assert!(store.conf(&peer()).unwrap().settings.is_empty(), "{}", compound);
            let state = store.effective(&peer(), compound, scope).unwrap();
            assert!(!state.value && !state.overridden, "{}", compound);
        }

        // `all replace-AS` is a command of its own and survives
        store
            .set_direct(&peer(), "remove-private-AS all replace-AS", scope, AttrValue::flag(true))
            .unwrap();
        store
            .clear_direct(&peer(), "remove-private-AS", scope)
            .unwrap();
        assert!(store
            .effective(&peer(), "remove-private-AS all replace-AS", scope)
            .unwrap()
            .value);
    }

    #[test]
    fn test_explicit_off_drops_siblings() {
        let mut store = create_test_store();
        let scope = Scope::af(ipv4_unicast());
        store
            .set_direct(&peer(), "remove-private-AS all", scope, AttrValue::flag(true))
            .unwrap();
        store
            .set_direct(&peer(), "remove-private-AS", scope, AttrValue::flag(false))
            .unwrap();

        let conf = store.conf(&peer()).unwrap();
        assert_eq!(conf.settings.len(), 1);
        assert_eq!(conf.flag_bits(scope, false), AfFlags::REMOVE_PRIVATE_AS.0);
        assert!(!store
            .effective(&peer(), "remove-private-AS all", scope)
            .unwrap()
            .value);
    }

    #[test]
    fn test_set_direct_scope_errors() {
        let mut store = create_test_store();
        let af = Scope::af(ipv4_unicast());

        assert!(matches!(
            store.set_direct(&peer(), "passive", af, AttrValue::flag(true)),
            Err(NeighborError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            store.set_direct(&peer(), "next-hop-self", Scope::GLOBAL, AttrValue::flag(true)),
            Err(NeighborError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            store.set_direct(&peer(), "prefix-list", af, AttrValue::List("PL".into())),
            Err(NeighborError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            store.set_direct(
                &peer(),
                "unsuppress-map",
                af.with_direction(FilterDirection::In),
                AttrValue::List("UM".into())
            ),
            Err(NeighborError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            store.set_direct(&peer(), "bogus", af, AttrValue::flag(true)),
            Err(NeighborError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn test_set_direct_value_errors() {
        let mut store = create_test_store();
        let af = Scope::af(ipv4_unicast());

        assert!(matches!(
            store.set_direct(&peer(), "advertisement-interval", Scope::GLOBAL, AttrValue::flag(true)),
            Err(NeighborError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            store.set_direct(&peer(), "advertisement-interval", Scope::GLOBAL, AttrValue::Number(601)),
            Err(NeighborError::InvalidArgument { .. })
        ));
        assert!(matches!(
            store.set_direct(&peer(), "weight", af, AttrValue::flag(true)),
            Err(NeighborError::InvalidArgument { .. })
        ));
        assert!(matches!(
            store.set_direct(
                &peer(),
                "route-map",
                af.with_direction(FilterDirection::In),
                AttrValue::List("bad name".into())
            ),
            Err(NeighborError::InvalidArgument { .. })
        ));

        // nothing was written by the failed calls
        assert!(store.conf(&peer()).unwrap().settings.is_empty());
    }

    #[test]
    fn test_unknown_entity() {
        let mut store = create_test_store();
        let unknown = Entity::Peer(PeerId::Interface("eth9".to_string()));
        assert!(matches!(
            store.set_direct(&unknown, "passive", Scope::GLOBAL, AttrValue::flag(true)),
            Err(NeighborError::InvalidEntityState(_))
        ));
        assert!(matches!(
            store.clear_direct(&unknown, "passive", Scope::GLOBAL),
            Err(NeighborError::InvalidEntityState(_))
        ));
    }

    #[test]
    fn test_ibgp_only() {
        let mut store = create_test_store();
        let af = Scope::af(ipv4_unicast());

        assert!(matches!(
            store.set_direct(&peer(), "route-reflector-client", af, AttrValue::flag(true)),
            Err(NeighborError::UnsupportedOperation(_))
        ));

        // group without a remote-as accepts it
        store
            .set_direct(&group(), "route-reflector-client", af, AttrValue::flag(true))
            .unwrap();

        store.set_remote_as(&peer(), LOCAL_ASN).unwrap();
        store
            .set_direct(&peer(), "route-reflector-client", af, AttrValue::flag(true))
            .unwrap();
    }

    #[test]
    fn test_set_remote_as_conflicts() {
        let mut store = create_test_store();
        store.set_remote_as(&group(), PEER_ASN).unwrap();
        store.join(&peer_id(), GROUP).unwrap();

        assert!(matches!(
            store.set_remote_as(&peer(), 300),
            Err(NeighborError::InvalidEntityState(_))
        ));
        assert!(matches!(
            store.set_remote_as(&group(), 300),
            Err(NeighborError::InvalidEntityState(_))
        ));
        assert_eq!(store.remote_asn(&peer()).unwrap(), Some(PEER_ASN));
    }

    #[test]
    fn test_clear_direct_is_idempotent() {
        let mut store = create_test_store();
        store
            .set_direct(&peer(), "passive", Scope::GLOBAL, AttrValue::flag(true))
            .unwrap();
        store.clear_direct(&peer(), "passive", Scope::GLOBAL).unwrap();
        store.clear_direct(&peer(), "passive", Scope::GLOBAL).unwrap();

        let state = store.get(&peer(), "passive", Scope::GLOBAL).unwrap();
        assert!(!state.value);
        assert!(!state.overridden);
    }
}
