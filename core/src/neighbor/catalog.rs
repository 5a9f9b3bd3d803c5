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

//! Static table of every neighbor attribute the engine understands.
//!
//! Each entry is keyed by its command keyword (`send-community extended`,
//! `remove-private-AS all`, ...). Compound entries share flag bits with
//! their simpler siblings; state is stored per bit so that setting
//! `attribute-unchanged as-path` and then `attribute-unchanged med` ends up
//! in the same place as setting `attribute-unchanged as-path med` once.

use super::custom::{AdvertisementInterval, CustomAttr};
use super::flags::{AfFlags, PeerFlags};
use super::{Entity, NeighborError, PeerId};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterType {
    DistributeList,
    FilterList,
    PrefixList,
    RouteMap,
    UnsuppressMap,
}

impl FilterType {
    /// Unsuppress-map binds a single list; every other filter binds one per direction.
    pub fn has_direction(&self) -> bool {
        !matches!(self, FilterType::UnsuppressMap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterDirection {
    In,
    Out,
}

impl FilterDirection {
    pub const BOTH: [FilterDirection; 2] = [FilterDirection::In, FilterDirection::Out];
}

impl fmt::Display for FilterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterDirection::In => write!(f, "in"),
            FilterDirection::Out => write!(f, "out"),
        }
    }
}

impl FromStr for FilterDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(FilterDirection::In),
            "out" => Ok(FilterDirection::Out),
            _ => Err(format!("invalid filter direction: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum AttrKind {
    GlobalFlag(PeerFlags),
    AfFlag(AfFlags),
    AfFilter(FilterType),
    Custom(&'static dyn CustomAttr),
}

/// When the stored bit of an attribute on a peer is the negation of the
/// configured state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerInversion {
    Never,
    Always,
    /// Only peers identified by interface name (unnumbered peers).
    InterfaceOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgGrammar {
    /// A single integer within the inclusive range.
    Range { min: u32, max: u32 },
    /// `route-map NAME`
    RouteMap,
    /// `MAX [THRESHOLD] [restart MINUTES | warning-only]`
    MaximumPrefix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    None,
    Optional(ArgGrammar),
    Required(ArgGrammar),
}

impl Argument {
    /// Validate command arguments and return their canonical form.
    pub fn validate(&self, attr: &str, arg: Option<&str>) -> Result<Option<String>, NeighborError> {
        let tokens: Vec<&str> = arg.map(|a| a.split_whitespace().collect()).unwrap_or_default();
        let invalid = |reason: String| NeighborError::InvalidArgument {
            attr: attr.to_string(),
            reason,
        };

        let grammar = match (self, tokens.is_empty()) {
            (_, true) if matches!(self, Argument::Required(_)) => {
                return Err(invalid("argument required".to_string()))
            }
            (_, true) => return Ok(None),
            (Argument::None, false) => {
                return Err(invalid(format!("unexpected argument: {}", tokens.join(" "))))
            }
            (Argument::Optional(grammar) | Argument::Required(grammar), false) => grammar,
        };

        grammar.check(&tokens).map_err(invalid)?;
        Ok(Some(tokens.join(" ")))
    }
}

impl ArgGrammar {
    fn check(&self, tokens: &[&str]) -> Result<(), String> {
        match self {
            ArgGrammar::Range { min, max } => match tokens {
                [value] => parse_in_range(value, *min, *max).map(|_| ()),
                _ => Err(format!("expected one number, got: {}", tokens.join(" "))),
            },
            ArgGrammar::RouteMap => match tokens {
                ["route-map", name] => validate_list_name(name),
                _ => Err(format!("expected route-map NAME, got: {}", tokens.join(" "))),
            },
            ArgGrammar::MaximumPrefix => {
                let (max, rest) = tokens
                    .split_first()
                    .ok_or_else(|| "missing prefix limit".to_string())?;
                parse_in_range(max, 1, u32::MAX)?;
                let rest = match rest.split_first() {
                    Some((threshold, rest)) if threshold.parse::<u32>().is_ok() => {
                        parse_in_range(threshold, 1, 100)?;
                        rest
                    }
                    _ => rest,
                };
                match rest {
                    [] | ["warning-only"] => Ok(()),
                    ["restart", minutes] => parse_in_range(minutes, 1, 65535).map(|_| ()),
                    _ => Err(format!("unexpected maximum-prefix options: {}", rest.join(" "))),
                }
            }
        }
    }
}

fn parse_in_range(value: &str, min: u32, max: u32) -> Result<u32, String> {
    let parsed = value
        .parse::<u32>()
        .map_err(|_| format!("invalid number: {}", value))?;
    if parsed < min || parsed > max {
        return Err(format!("{} out of range {}..{}", parsed, min, max));
    }
    Ok(parsed)
}

const LIST_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.:-]*$";

static LIST_NAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(LIST_NAME_PATTERN));

/// Names of access lists, prefix lists, AS path lists and route maps.
pub fn validate_list_name(name: &str) -> Result<(), String> {
    let re = LIST_NAME
        .as_ref()
        .map_err(|e| format!("invalid list name pattern '{}': {}", LIST_NAME_PATTERN, e))?;
    if re.is_match(name) {
        Ok(())
    } else {
        Err(format!("invalid list name: {}", name))
    }
}

/// Catalog entry. Immutable; obtained through [`lookup`].
#[derive(Debug, Clone, Copy)]
pub struct AttrDef {
    pub name: &'static str,
    pub kind: AttrKind,
    pub invert_peer: PeerInversion,
    pub invert_group: bool,
    pub argument: Argument,
    /// Only valid on internal (same AS) sessions.
    pub ibgp_only: bool,
}

impl AttrDef {
    const fn new(name: &'static str, kind: AttrKind) -> Self {
        AttrDef {
            name,
            kind,
            invert_peer: PeerInversion::Never,
            invert_group: false,
            argument: Argument::None,
            ibgp_only: false,
        }
    }

    const fn global(name: &'static str, flags: PeerFlags) -> Self {
        AttrDef::new(name, AttrKind::GlobalFlag(flags))
    }

    const fn af(name: &'static str, flags: AfFlags) -> Self {
        AttrDef::new(name, AttrKind::AfFlag(flags))
    }

    const fn filter(name: &'static str, filter: FilterType) -> Self {
        AttrDef::new(name, AttrKind::AfFilter(filter))
    }

    const fn custom(name: &'static str, custom: &'static dyn CustomAttr) -> Self {
        AttrDef::new(name, AttrKind::Custom(custom))
    }

    const fn inverted(self, peer: PeerInversion, group: bool) -> Self {
        AttrDef {
            invert_peer: peer,
            invert_group: group,
            ..self
        }
    }

    const fn with_argument(self, argument: Argument) -> Self {
        AttrDef { argument, ..self }
    }

    const fn internal_only(self) -> Self {
        AttrDef {
            ibgp_only: true,
            ..self
        }
    }

    /// True for attributes configured per AFI/SAFI.
    pub fn is_af_scoped(&self) -> bool {
        matches!(self.kind, AttrKind::AfFlag(_) | AttrKind::AfFilter(_))
    }

    /// Raw bits of a flag attribute.
    pub fn flag_mask(&self) -> Option<u32> {
        match self.kind {
            AttrKind::GlobalFlag(flags) => Some(flags.0),
            AttrKind::AfFlag(flags) => Some(flags.0),
            AttrKind::AfFilter(_) | AttrKind::Custom(_) => None,
        }
    }

    /// Inversion polarity of this attribute on `entity`. The rule is
    /// cataloged per attribute and per side; it is not symmetric.
    pub fn inverted_for(&self, entity: &Entity) -> bool {
        match entity {
            Entity::Group(_) => self.invert_group,
            Entity::Peer(id) => match self.invert_peer {
                PeerInversion::Never => false,
                PeerInversion::Always => true,
                PeerInversion::InterfaceOnly => matches!(id, PeerId::Interface(_)),
            },
        }
    }
}

const fn af_union(a: AfFlags, b: AfFlags) -> AfFlags {
    AfFlags(a.0 | b.0)
}

const UNCHANGED_AS_PATH: AfFlags = AfFlags::AS_PATH_UNCHANGED;
const UNCHANGED_NEXTHOP: AfFlags = AfFlags::NEXTHOP_UNCHANGED;
const UNCHANGED_MED: AfFlags = AfFlags::MED_UNCHANGED;

static CATALOG: &[AttrDef] = &[
    AttrDef::custom("advertisement-interval", &AdvertisementInterval),
    AttrDef::global("capability dynamic", PeerFlags::DYNAMIC_CAPABILITY),
    AttrDef::global("capability extended-nexthop", PeerFlags::CAPABILITY_ENHE)
        .inverted(PeerInversion::InterfaceOnly, false),
    AttrDef::global("disable-connected-check", PeerFlags::DISABLE_CONNECTED_CHECK),
    AttrDef::global("dont-capability-negotiate", PeerFlags::DONT_CAPABILITY),
    AttrDef::global("enforce-first-as", PeerFlags::ENFORCE_FIRST_AS),
    AttrDef::global("override-capability", PeerFlags::OVERRIDE_CAPABILITY),
    AttrDef::global("passive", PeerFlags::PASSIVE),
    AttrDef::global("shutdown", PeerFlags::SHUTDOWN),
    AttrDef::global("strict-capability-match", PeerFlags::STRICT_CAP_MATCH),
    AttrDef::af("addpath-tx-all-paths", AfFlags::ADDPATH_TX_ALL_PATHS),
    AttrDef::af("addpath-tx-bestpath-per-AS", AfFlags::ADDPATH_TX_BESTPATH_PER_AS),
    AttrDef::af("allowas-in", AfFlags::ALLOWAS_IN)
        .with_argument(Argument::Optional(ArgGrammar::Range { min: 1, max: 10 })),
    AttrDef::af("allowas-in origin", AfFlags::ALLOWAS_IN_ORIGIN),
    AttrDef::af("as-override", AfFlags::AS_OVERRIDE),
    AttrDef::af(
        "attribute-unchanged as-path next-hop med",
        af_union(af_union(UNCHANGED_AS_PATH, UNCHANGED_NEXTHOP), UNCHANGED_MED),
    ),
    AttrDef::af(
        "attribute-unchanged as-path next-hop",
        af_union(UNCHANGED_AS_PATH, UNCHANGED_NEXTHOP),
    ),
    AttrDef::af(
        "attribute-unchanged as-path med",
        af_union(UNCHANGED_AS_PATH, UNCHANGED_MED),
    ),
    AttrDef::af(
        "attribute-unchanged next-hop med",
        af_union(UNCHANGED_NEXTHOP, UNCHANGED_MED),
    ),
    AttrDef::af("attribute-unchanged as-path", UNCHANGED_AS_PATH),
    AttrDef::af("attribute-unchanged next-hop", UNCHANGED_NEXTHOP),
    AttrDef::af("attribute-unchanged med", UNCHANGED_MED),
    AttrDef::af(
        "capability orf prefix-list both",
        af_union(AfFlags::ORF_PREFIX_SM, AfFlags::ORF_PREFIX_RM),
    ),
    AttrDef::af("capability orf prefix-list send", AfFlags::ORF_PREFIX_SM),
    AttrDef::af("capability orf prefix-list receive", AfFlags::ORF_PREFIX_RM),
    AttrDef::af("default-originate", AfFlags::DEFAULT_ORIGINATE)
        .with_argument(Argument::Optional(ArgGrammar::RouteMap)),
    AttrDef::filter("distribute-list", FilterType::DistributeList),
    AttrDef::filter("filter-list", FilterType::FilterList),
    AttrDef::af("maximum-prefix", AfFlags::MAX_PREFIX)
        .with_argument(Argument::Required(ArgGrammar::MaximumPrefix)),
    AttrDef::af("next-hop-self", AfFlags::NEXTHOP_SELF),
    AttrDef::af("next-hop-self force", AfFlags::FORCE_NEXTHOP_SELF),
    AttrDef::filter("prefix-list", FilterType::PrefixList),
    AttrDef::af(
        "remove-private-AS all replace-AS",
        AfFlags::REMOVE_PRIVATE_AS_ALL_REPLACE,
    ),
    AttrDef::af(
        "remove-private-AS all",
        af_union(AfFlags::REMOVE_PRIVATE_AS, AfFlags::REMOVE_PRIVATE_AS_ALL),
    ),
    AttrDef::af(
        "remove-private-AS replace-AS",
        af_union(AfFlags::REMOVE_PRIVATE_AS, AfFlags::REMOVE_PRIVATE_AS_REPLACE),
    ),
    AttrDef::af("remove-private-AS", AfFlags::REMOVE_PRIVATE_AS),
    AttrDef::filter("route-map", FilterType::RouteMap),
    AttrDef::af("route-reflector-client", AfFlags::REFLECTOR_CLIENT).internal_only(),
    AttrDef::af("route-server-client", AfFlags::RSERVER_CLIENT),
    AttrDef::af("send-community", AfFlags::SEND_COMMUNITY).inverted(PeerInversion::Always, true),
    AttrDef::af("send-community extended", AfFlags::SEND_EXT_COMMUNITY)
        .inverted(PeerInversion::Always, true),
    AttrDef::af("send-community large", AfFlags::SEND_LARGE_COMMUNITY)
        .inverted(PeerInversion::Always, true),
    AttrDef::af("soft-reconfiguration inbound", AfFlags::SOFT_RECONFIG),
    AttrDef::filter("unsuppress-map", FilterType::UnsuppressMap),
    AttrDef::af("weight", AfFlags::WEIGHT)
        .with_argument(Argument::Required(ArgGrammar::Range { min: 0, max: 65535 })),
];

/// Every catalog entry, in rendering order.
pub fn entries() -> &'static [AttrDef] {
    CATALOG
}

pub fn lookup(name: &str) -> Result<&'static AttrDef, NeighborError> {
    CATALOG
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| NeighborError::UnknownAttribute(name.to_string()))
}

/// Longest catalog entry whose keywords start `tokens`, together with the
/// number of tokens it consumed.
pub fn match_tokens(tokens: &[&str]) -> Option<(&'static AttrDef, usize)> {
    CATALOG
        .iter()
        .filter_map(|def| {
            let words: Vec<&str> = def.name.split(' ').collect();
            let matches = words.len() <= tokens.len()
                && words.iter().zip(tokens).all(|(word, token)| word == token);
            matches.then_some((def, words.len()))
        })
        .max_by_key(|(_, consumed)| *consumed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let def = lookup("send-community large").unwrap();
        assert!(matches!(def.kind, AttrKind::AfFlag(flags) if flags == AfFlags::SEND_LARGE_COMMUNITY));
        assert!(def.is_af_scoped());

        let def = lookup("passive").unwrap();
        assert!(!def.is_af_scoped());

        assert!(matches!(
            lookup("send-community standard"),
            Err(NeighborError::UnknownAttribute(name)) if name == "send-community standard"
        ));
    }

    #[test]
    fn test_catalog_names_unique() {
        for (i, def) in CATALOG.iter().enumerate() {
            assert!(
                CATALOG[i + 1..].iter().all(|other| other.name != def.name),
                "duplicate catalog entry {}",
                def.name
            );
        }
    }

    #[test]
    fn test_match_tokens_prefers_longest() {
        let (def, consumed) = match_tokens(&["allowas-in", "origin"]).unwrap();
        assert_eq!(def.name, "allowas-in origin");
        assert_eq!(consumed, 2);

        let (def, consumed) = match_tokens(&["allowas-in", "3"]).unwrap();
        assert_eq!(def.name, "allowas-in");
        assert_eq!(consumed, 1);

        let (def, _) = match_tokens(&["remove-private-AS", "all", "replace-AS"]).unwrap();
        assert_eq!(def.name, "remove-private-AS all replace-AS");

        let (def, consumed) = match_tokens(&["distribute-list", "FL-PEER", "in"]).unwrap();
        assert_eq!(def.name, "distribute-list");
        assert_eq!(consumed, 1);

        assert!(match_tokens(&["bogus"]).is_none());
        assert!(match_tokens(&["capability", "orf"]).is_none());
    }

    #[test]
    fn test_inversion_is_per_side() {
        let peer = Entity::Peer(PeerId::Address("1.1.1.1".parse().unwrap()));
        let iface = Entity::Peer(PeerId::Interface("eth0".to_string()));
        let group = Entity::Group("PG".to_string());

        let community = lookup("send-community").unwrap();
        assert!(community.inverted_for(&peer));
        assert!(community.inverted_for(&iface));
        assert!(community.inverted_for(&group));

        let enhe = lookup("capability extended-nexthop").unwrap();
        assert!(!enhe.inverted_for(&peer));
        assert!(enhe.inverted_for(&iface));
        assert!(!enhe.inverted_for(&group));

        let passive = lookup("passive").unwrap();
        assert!(!passive.inverted_for(&iface));
        assert!(!passive.inverted_for(&group));
    }

    #[test]
    fn test_argument_validation() {
        let allowas = lookup("allowas-in").unwrap();
        assert_eq!(allowas.argument.validate("allowas-in", None).unwrap(), None);
        assert_eq!(
            allowas.argument.validate("allowas-in", Some("3")).unwrap(),
            Some("3".to_string())
        );
        assert!(allowas.argument.validate("allowas-in", Some("11")).is_err());

        let weight = lookup("weight").unwrap();
        assert!(matches!(
            weight.argument.validate("weight", None),
            Err(NeighborError::InvalidArgument { .. })
        ));

        let passive = lookup("passive").unwrap();
        assert!(passive.argument.validate("passive", Some("1")).is_err());

        let originate = lookup("default-originate").unwrap();
        assert_eq!(
            originate
                .argument
                .validate("default-originate", Some("route-map   RM-PEER"))
                .unwrap(),
            Some("route-map RM-PEER".to_string())
        );
        assert!(originate
            .argument
            .validate("default-originate", Some("route-map"))
            .is_err());
    }

    #[test]
    fn test_maximum_prefix_grammar() {
        let grammar = ArgGrammar::MaximumPrefix;
        assert!(grammar.check(&["10"]).is_ok());
        assert!(grammar.check(&["10", "restart", "100"]).is_ok());
        assert!(grammar.check(&["10", "1", "restart", "100"]).is_ok());
        assert!(grammar.check(&["10", "warning-only"]).is_ok());
        assert!(grammar.check(&["10", "1", "warning-only"]).is_ok());
        assert!(grammar.check(&[]).is_err());
        assert!(grammar.check(&["0"]).is_err());
        assert!(grammar.check(&["10", "101"]).is_err());
        assert!(grammar.check(&["10", "restart"]).is_err());
        assert!(grammar.check(&["10", "warning-only", "restart", "5"]).is_err());
    }

    #[test]
    fn test_list_names() {
        assert!(validate_list_name("RM-PEER").is_ok());
        assert!(validate_list_name("fl_1.v4").is_ok());
        assert!(validate_list_name("-bad").is_err());
        assert!(validate_list_name("has space").is_err());
        assert!(validate_list_name("").is_err());
    }

    #[test]
    fn test_list_name_pattern_compiles_once() {
        assert!(LIST_NAME.is_ok());
        let first: *const Regex = LIST_NAME.as_ref().unwrap();
        assert!(validate_list_name("PL-1").is_ok());
        let second: *const Regex = LIST_NAME.as_ref().unwrap();
        assert_eq!(first, second);
    }
}
