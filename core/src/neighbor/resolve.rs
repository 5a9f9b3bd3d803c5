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

use super::catalog::{lookup, AttrDef, AttrKind};
use super::store::{check_scope, unknown_entity, NeighborConf, Setting, Slot};
use super::{AttrState, Entity, NeighborError, NeighborStore, Scope};

impl NeighborStore {
    /// Effective state of an attribute on an entity.
    ///
    /// Per flag bit, a peer's own setting wins, then its group's, then the
    /// default. What is inherited is the logical setting; each entity
    /// reports it through its own inversion polarity, so a group and its
    /// member may show opposite stored bits for the same configuration.
    /// Compound attributes count as set (and overridden) when any of their
    /// bits is.
    pub fn effective(
        &self,
        entity: &Entity,
        attr: &str,
        scope: Scope,
    ) -> Result<AttrState, NeighborError> {
        let def = lookup(attr)?;
        check_scope(def, &scope)?;
        self.resolve(entity, def, scope, true)
    }

    /// Value of a custom attribute installed on the entity: its own
    /// setting, else the default for its session type. A peer never takes
    /// its group's value; one that removes its own setting while the group
    /// still configures the attribute keeps the value it had.
    pub fn custom_value(&self, entity: &Entity, attr: &str) -> Result<u32, NeighborError> {
        let def = lookup(attr)?;
        let AttrKind::Custom(custom) = def.kind else {
            return Err(NeighborError::UnsupportedOperation(format!(
                "{} is not a custom attribute",
                def.name
            )));
        };

        let slot = Slot::Custom(def.name);
        let conf = self.conf(entity)?;
        if let Some(Setting::Number(value)) = conf.setting(slot, Scope::GLOBAL) {
            return Ok(*value);
        }
        let group_sets = self
            .parent(entity)?
            .is_some_and(|parent| parent.setting(slot, Scope::GLOBAL).is_some());
        match conf.retained.get(def.name) {
            Some(value) if group_sets => Ok(*value),
            _ => Ok(custom.default_value(self.session_type(entity)?)),
        }
    }

    /// Configuration of the group a peer is bound to.
    pub(super) fn parent(&self, entity: &Entity) -> Result<Option<&NeighborConf>, NeighborError> {
        let Entity::Peer(id) = entity else {
            return Ok(None);
        };
        let peer = self.peers.get(id).ok_or_else(|| unknown_entity(entity))?;
        let Some(name) = peer.group.as_ref() else {
            return Ok(None);
        };
        match self.groups.get(name) {
            Some(group) => Ok(Some(&group.conf)),
            None => Err(NeighborError::InvalidEntityState(format!(
                "peer {} refers to unknown peer-group {}",
                id, name
            ))),
        }
    }

    pub(super) fn resolve(
        &self,
        entity: &Entity,
        def: &AttrDef,
        scope: Scope,
        inherit: bool,
    ) -> Result<AttrState, NeighborError> {
        let own = self.conf(entity)?;
        let parent = if inherit { self.parent(entity)? } else { None };
        let inverted = def.inverted_for(entity);

        let mut configured = false;
        let mut overridden = false;
        let mut argument = None;
        for slot in Slot::for_attr(def) {
            let setting = match own.setting(slot, scope) {
                Some(setting) => {
                    overridden |= !entity.is_group();
                    Some(setting)
                }
                None => parent.and_then(|conf| conf.setting(slot, scope)),
            };
            match setting {
                Some(Setting::Flag {
                    configured: true,
                    argument: arg,
                }) => {
                    configured = true;
                    argument = argument.or_else(|| arg.clone());
                }
                Some(Setting::List(name)) => {
                    configured = true;
                    argument = Some(name.clone());
                }
                Some(Setting::Number(value)) => {
                    configured = true;
                    argument = Some(value.to_string());
                }
                Some(Setting::Flag {
                    configured: false, ..
                })
                | None => {}
            }
        }

        if let AttrKind::Custom(custom) = def.kind {
            if argument.is_none() {
                argument = Some(custom.default_value(self.session_type(entity)?).to_string());
            }
        }

        Ok(AttrState {
            value: configured != inverted,
            overridden,
            inverted,
            argument,
        })
    }
}
