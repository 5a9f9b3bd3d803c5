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

//! Writes a [`NeighborStore`] back out as `router bgp` configuration.
//!
//! Only explicit settings are written, so a grouped peer shows just its
//! overrides. An explicit "not configured" setting is written in the
//! entity's default form. Feeding the output to a fresh
//! [`CommandSession`](crate::command::CommandSession) rebuilds a store with
//! the same effective state.

use crate::bgp::multiprotocol::AfiSafi;
use crate::neighbor::store::{NeighborConf, Setting, Slot};
use crate::neighbor::{
    entries, AttrDef, AttrKind, Entity, FilterDirection, NeighborStore, PeerId, Scope,
};

pub fn render(store: &NeighborStore) -> String {
    let mut out = String::new();
    out.push_str(&format!("router bgp {}\n", store.local_asn()));
    if let Some(router_id) = store.router_id() {
        out.push_str(&format!(" bgp router-id {}\n", router_id));
    }
    if !store.default_ipv4_unicast() {
        out.push_str(" no bgp default ipv4-unicast\n");
    }

    for group in store.groups() {
        out.push_str(&format!(" neighbor {} peer-group\n", group.name()));
        if let Some(asn) = group.remote_asn() {
            out.push_str(&format!(" neighbor {} remote-as {}\n", group.name(), asn));
        }
    }
    for peer in store.peers() {
        let id = peer.id();
        match (id, peer.group()) {
            (PeerId::Interface(_), Some(group)) => {
                out.push_str(&format!(" neighbor {} interface peer-group {}\n", id, group))
            }
            (PeerId::Interface(_), None) => out.push_str(&format!(" neighbor {} interface\n", id)),
            (PeerId::Address(_), _) => {}
        }
        if let Some(asn) = peer.remote_asn() {
            out.push_str(&format!(" neighbor {} remote-as {}\n", id, asn));
        }
        if let (PeerId::Address(_), Some(group)) = (id, peer.group()) {
            out.push_str(&format!(" neighbor {} peer-group {}\n", id, group));
        }
    }

    for entity in entities(store) {
        if let Ok(conf) = store.conf(&entity) {
            for line in attribute_lines(&entity, conf, Scope::GLOBAL) {
                out.push_str(&format!(" {}\n", line));
            }
        }
    }

    for afi_safi in AfiSafi::ALL {
        let mut block = Vec::new();
        for entity in entities(store) {
            let Ok(conf) = store.conf(&entity) else {
                continue;
            };
            if let Some(line) = activation_line(store, &entity, conf, afi_safi) {
                block.push(line);
            }
            block.extend(attribute_lines(&entity, conf, Scope::af(afi_safi)));
        }
        if block.is_empty() {
            continue;
        }
        out.push_str(" !\n");
        out.push_str(&format!(" address-family {}\n", afi_safi.keywords()));
        for line in block {
            out.push_str(&format!("  {}\n", line));
        }
        out.push_str(" exit-address-family\n");
    }
    out.push_str("!\n");
    out
}

/// Groups first, so members can refer to them.
fn entities(store: &NeighborStore) -> Vec<Entity> {
    store
        .groups()
        .map(|group| group.entity())
        .chain(store.peers().map(|peer| peer.entity()))
        .collect()
}

/// Peers start out active in IPv4 unicast while `bgp default ipv4-unicast`
/// is on; only the exception is written for them.
fn activation_line(
    store: &NeighborStore,
    entity: &Entity,
    conf: &NeighborConf,
    afi_safi: AfiSafi,
) -> Option<String> {
    let active = conf.activated.contains(&afi_safi);
    let implied = !entity.is_group()
        && afi_safi == AfiSafi::IPV4_UNICAST
        && store.default_ipv4_unicast();
    match (active, implied) {
        (true, false) => Some(format!("neighbor {} activate", entity)),
        (false, true) => Some(format!("no neighbor {} activate", entity)),
        _ => None,
    }
}

/// Lines for every attribute configured on `entity` in `scope`, in catalog
/// order.
fn attribute_lines(entity: &Entity, conf: &NeighborConf, scope: Scope) -> Vec<String> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    let in_af = scope.afi_safi.is_some();

    for configured in [true, false] {
        for (idx, def) in covering_flags(conf, scope, configured) {
            // an explicit "not configured" override is written in the
            // entity's default form
            let prefix = if def.inverted_for(entity) == configured { "no " } else { "" };
            let mut line = format!("{}neighbor {} {}", prefix, entity, def.name);
            if let Some(Setting::Flag {
                argument: Some(argument),
                ..
            }) = first_bit_setting(def, conf, scope)
            {
                line.push(' ');
                line.push_str(argument);
            }
            lines.push((idx, line));
        }
    }

    for (idx, def) in entries().iter().enumerate() {
        match def.kind {
            AttrKind::AfFilter(filter) if in_af => {
                let directions: Vec<Option<FilterDirection>> = if filter.has_direction() {
                    FilterDirection::BOTH.iter().copied().map(Some).collect()
                } else {
                    vec![None]
                };
                for direction in directions {
                    let scope = Scope { direction, ..scope };
                    if let Some(Setting::List(name)) = conf.setting(Slot::Filter(filter), scope) {
                        let line = match direction {
                            Some(direction) => {
                                format!("neighbor {} {} {} {}", entity, def.name, name, direction)
                            }
                            None => format!("neighbor {} {} {}", entity, def.name, name),
                        };
                        lines.push((idx, line));
                    }
                }
            }
            AttrKind::Custom(_) if !in_af => {
                if let Some(Setting::Number(value)) = conf.setting(Slot::Custom(def.name), scope) {
                    lines.push((idx, format!("neighbor {} {} {}", entity, def.name, value)));
                }
            }
            _ => {}
        }
    }

    lines.sort_by_key(|(idx, _)| *idx);
    lines.into_iter().map(|(_, line)| line).collect()
}

/// Smallest set of catalog commands whose bits cover the flags held with
/// the given logical setting. Larger compounds are tried first; a command
/// is only used when all of its bits are held.
fn covering_flags(
    conf: &NeighborConf,
    scope: Scope,
    configured: bool,
) -> Vec<(usize, &'static AttrDef)> {
    let held = conf.flag_bits(scope, configured);
    if held == 0 {
        return Vec::new();
    }

    let in_af = scope.afi_safi.is_some();
    let mut candidates: Vec<(usize, &'static AttrDef, u32)> = entries()
        .iter()
        .enumerate()
        .filter(|(_, def)| def.is_af_scoped() == in_af)
        .filter_map(|(idx, def)| def.flag_mask().map(|mask| (idx, def, mask)))
        .collect();
    candidates.sort_by_key(|(_, _, mask)| std::cmp::Reverse(mask.count_ones()));

    let mut covered = 0;
    let mut chosen = Vec::new();
    for (idx, def, mask) in candidates {
        if held & mask == mask && mask & !covered != 0 {
            covered |= mask;
            chosen.push((idx, def));
        }
    }
    chosen
}

fn first_bit_setting<'a>(
    def: &AttrDef,
    conf: &'a NeighborConf,
    scope: Scope,
) -> Option<&'a Setting> {
    Slot::for_attr(def)
        .into_iter()
        .find_map(|slot| conf.setting(slot, scope))
}
