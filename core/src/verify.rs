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

//! Attribute scenarios run through the command and render boundaries.
//!
//! Every scenario drives one attribute through the same sequence of
//! configuration changes on a peer and a peer-group (set, join, unset at
//! either level, re-join) and checks after each step that the rendered
//! configuration and the effective state of both entities are what an
//! operator would expect.

use crate::bgp::multiprotocol::AfiSafi;
use crate::command::CommandSession;
use crate::log::{debug, warn};
use crate::neighbor::{
    lookup, AdvertisementInterval, AttrDef, AttrKind, Entity, FilterDirection, NeighborStore,
    PeerId, Scope,
};
use crate::render::render;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

const LOCAL_ASN: u32 = 100;
const PEER_ASN: u32 = 200;
const PEER_ADDRESS: Ipv4Addr = Ipv4Addr::new(1, 1, 1, 1);
const PEER_INTERFACE: &str = "IP-TEST";
const PEER_GROUP: &str = "PG-TEST";

const SYMBOL_INFO: &str = "\u{25ba}";
const SYMBOL_OK: &str = "\u{2714}";
const SYMBOL_NOK: &str = "\u{2716}";

/// Whether the peer-group transfer cases at the start of a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipPolicy {
    RunAll,
    /// Skip the cases that configure the peer before it joins the group.
    SkipTransfer,
}

/// Extra check run after every step, for attributes whose state is not a
/// flag or filter. Arguments: store, peer, group, peer_set, group_set.
pub type CustomCheck = fn(&NeighborStore, &Entity, &Entity, bool, bool) -> Result<(), String>;

#[derive(Debug, Clone)]
pub struct Scenario {
    /// Catalog attribute exercised.
    pub attr: &'static str,
    /// Label used in the description and for the absence checks.
    pub name: &'static str,
    pub peer_args: Option<&'static str>,
    pub group_args: Option<&'static str>,
    pub afi_safi: Option<AfiSafi>,
    /// Expected inversion polarity on the peer.
    pub invert_peer: bool,
    /// Expected inversion polarity on the group.
    pub invert_group: bool,
    pub use_ibgp: bool,
    pub use_iface_peer: bool,
    pub skip: SkipPolicy,
    pub custom: Option<CustomCheck>,
}

impl Scenario {
    pub fn new(attr: &'static str) -> Self {
        Scenario {
            attr,
            name: attr,
            peer_args: None,
            group_args: None,
            afi_safi: None,
            invert_peer: false,
            invert_group: false,
            use_ibgp: false,
            use_iface_peer: false,
            skip: SkipPolicy::RunAll,
            custom: None,
        }
    }

    pub fn named(self, name: &'static str) -> Self {
        Scenario { name, ..self }
    }

    pub fn with_args(self, peer: &'static str, group: &'static str) -> Self {
        Scenario {
            peer_args: Some(peer),
            group_args: Some(group),
            ..self
        }
    }

    pub fn inverted(self, peer: bool, group: bool) -> Self {
        Scenario {
            invert_peer: peer,
            invert_group: group,
            ..self
        }
    }

    pub fn ibgp(self) -> Self {
        Scenario {
            use_ibgp: true,
            ..self
        }
    }

    pub fn interface_peer(self) -> Self {
        Scenario {
            use_iface_peer: true,
            ..self
        }
    }

    pub fn with_skip(self, skip: SkipPolicy) -> Self {
        Scenario { skip, ..self }
    }

    pub fn with_custom(self, custom: CustomCheck) -> Self {
        Scenario {
            custom: Some(custom),
            ..self
        }
    }

    pub fn for_family(self, afi_safi: AfiSafi) -> Self {
        Scenario {
            afi_safi: Some(afi_safi),
            ..self
        }
    }

    pub fn description(&self) -> String {
        match self.afi_safi {
            Some(afi_safi) => format!(
                "peer\\{}-{}\\{}",
                afi_safi.afi.keyword(),
                afi_safi.safi.keyword(),
                self.name
            ),
            None => format!("peer\\{}", self.name),
        }
    }

    fn peer_cmd(&self) -> String {
        command_with_args(self.attr, self.peer_args)
    }

    fn group_cmd(&self) -> String {
        command_with_args(self.attr, self.group_args)
    }

    fn peer_id(&self) -> PeerId {
        if self.use_iface_peer {
            PeerId::Interface(PEER_INTERFACE.to_string())
        } else {
            PeerId::Address(IpAddr::V4(PEER_ADDRESS))
        }
    }

    fn peer_name(&self) -> String {
        self.peer_id().to_string()
    }

    fn peer_entity(&self) -> Entity {
        Entity::Peer(self.peer_id())
    }

    fn scope(&self, def: &AttrDef) -> Scope {
        let Some(afi_safi) = self.afi_safi else {
            return Scope::GLOBAL;
        };
        let scope = Scope::af(afi_safi);
        let direction = self
            .peer_args
            .and_then(|args| args.split_whitespace().last())
            .and_then(|token| token.parse::<FilterDirection>().ok());
        match (def.kind, direction) {
            (AttrKind::AfFilter(filter), Some(direction)) if filter.has_direction() => {
                scope.with_direction(direction)
            }
            _ => scope,
        }
    }

    /// Run the scenario from a fresh BGP instance.
    pub fn run(&self) -> ScenarioReport {
        let report = match lookup(self.attr) {
            Ok(def) => Runner::new(self, def).run(),
            Err(e) => ScenarioReport {
                description: self.description(),
                log: Vec::new(),
                outcome: Outcome::CommandError(e.to_string()),
            },
        };
        match &report.outcome {
            Outcome::Ok => debug!(scenario = %report.description, "scenario passed"),
            outcome => warn!(scenario = %report.description, ?outcome, "scenario failed"),
        }
        report
    }
}

fn command_with_args(attr: &str, args: Option<&str>) -> String {
    match args {
        Some(args) => format!("{} {}", attr, args),
        None => attr.to_string(),
    }
}

fn check_advertisement_interval(
    store: &NeighborStore,
    peer: &Entity,
    group: &Entity,
    peer_set: bool,
    group_set: bool,
) -> Result<(), String> {
    let default = AdvertisementInterval::DEFAULT_EBGP;
    // a peer keeps its own value while the group configures one
    let expected_peer = if peer_set || group_set { 10 } else { default };
    let expected_group = if group_set { 20 } else { default };

    let attr = "advertisement-interval";
    let current_peer = store.custom_value(peer, attr).map_err(|e| e.to_string())?;
    let current_group = store.custom_value(group, attr).map_err(|e| e.to_string())?;
    expect_eq(peer, "advertisement-interval", current_peer, expected_peer)?;
    expect_eq(group, "advertisement-interval", current_group, expected_group)
}

fn expect_eq<T: PartialEq + fmt::Display>(
    entity: &Entity,
    what: &str,
    current: T,
    expected: T,
) -> Result<(), String> {
    if current == expected {
        Ok(())
    } else {
        Err(format!(
            "assertion failed: {} {}[{}] == [{}]",
            entity, what, current, expected
        ))
    }
}

/// Every attribute with the arguments used to exercise it. AF attributes
/// are expanded to all families by [`default_scenarios`].
fn templates() -> Vec<Scenario> {
    vec![
        Scenario::new("advertisement-interval")
            .with_args("10", "20")
            .with_custom(check_advertisement_interval),
        Scenario::new("capability dynamic"),
        Scenario::new("capability extended-nexthop"),
        Scenario::new("capability extended-nexthop")
            .inverted(true, false)
            .interface_peer(),
        Scenario::new("disable-connected-check"),
        Scenario::new("dont-capability-negotiate"),
        Scenario::new("enforce-first-as"),
        Scenario::new("override-capability"),
        Scenario::new("passive"),
        Scenario::new("shutdown"),
        Scenario::new("strict-capability-match"),
        Scenario::new("addpath-tx-all-paths"),
        Scenario::new("addpath-tx-bestpath-per-AS"),
        Scenario::new("allowas-in").with_args("1", "2"),
        Scenario::new("allowas-in origin"),
        Scenario::new("as-override"),
        Scenario::new("attribute-unchanged as-path"),
        Scenario::new("attribute-unchanged next-hop"),
        Scenario::new("attribute-unchanged med"),
        Scenario::new("attribute-unchanged as-path next-hop"),
        Scenario::new("attribute-unchanged as-path med"),
        Scenario::new("attribute-unchanged next-hop med"),
        Scenario::new("attribute-unchanged as-path next-hop med"),
        Scenario::new("capability orf prefix-list send"),
        Scenario::new("capability orf prefix-list receive"),
        Scenario::new("capability orf prefix-list both"),
        Scenario::new("default-originate"),
        Scenario::new("default-originate")
            .named("default-originate route-map")
            .with_args("route-map RM-PEER", "route-map RM-GROUP"),
        Scenario::new("distribute-list").with_args("FL-PEER in", "FL-GROUP in"),
        Scenario::new("distribute-list").with_args("FL-PEER out", "FL-GROUP out"),
        Scenario::new("filter-list").with_args("FL-PEER in", "FL-GROUP in"),
        Scenario::new("filter-list").with_args("FL-PEER out", "FL-GROUP out"),
        Scenario::new("maximum-prefix").with_args("10", "20"),
        Scenario::new("maximum-prefix").with_args("10 restart 100", "20 restart 200"),
        Scenario::new("maximum-prefix").with_args("10 1 restart 100", "20 2 restart 200"),
        Scenario::new("maximum-prefix").with_args("10 warning-only", "20 warning-only"),
        Scenario::new("maximum-prefix").with_args("10 1 warning-only", "20 2 warning-only"),
        Scenario::new("next-hop-self"),
        Scenario::new("next-hop-self force"),
        Scenario::new("prefix-list").with_args("PL-PEER in", "PL-GROUP in"),
        Scenario::new("prefix-list").with_args("PL-PEER out", "PL-GROUP out"),
        Scenario::new("remove-private-AS"),
        Scenario::new("remove-private-AS all"),
        Scenario::new("remove-private-AS replace-AS"),
        Scenario::new("remove-private-AS all replace-AS"),
        Scenario::new("route-map").with_args("RM-PEER in", "RM-GROUP in"),
        Scenario::new("route-map").with_args("RM-PEER out", "RM-GROUP out"),
        Scenario::new("route-reflector-client")
            .ibgp()
            .with_skip(SkipPolicy::SkipTransfer),
        Scenario::new("route-server-client"),
        Scenario::new("send-community").inverted(true, true),
        Scenario::new("send-community extended").inverted(true, true),
        Scenario::new("send-community large").inverted(true, true),
        Scenario::new("soft-reconfiguration inbound"),
        Scenario::new("unsuppress-map").with_args("UM-PEER", "UM-GROUP"),
        Scenario::new("weight").with_args("100", "200"),
    ]
}

/// All scenarios, address-family attributes once per family.
pub fn default_scenarios() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    for template in templates() {
        let af_scoped = lookup(template.attr)
            .map(|def| def.is_af_scoped())
            .unwrap_or(false);
        if af_scoped {
            scenarios.extend(
                AfiSafi::ALL
                    .iter()
                    .map(|afi_safi| template.clone().for_family(*afi_safi)),
            );
        } else {
            scenarios.push(template);
        }
    }
    scenarios
}

/// Run scenarios in order and collect their reports.
pub fn run_all(scenarios: &[Scenario]) -> Vec<ScenarioReport> {
    scenarios.iter().map(Scenario::run).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    /// A configuration command was rejected.
    CommandError(String),
    /// Rendered configuration lacked an expected line or had an unexpected one.
    ConfigError(String),
    /// Effective state differed from the expectation.
    AssertError(String),
    /// The scenario's custom check failed.
    CustomError(String),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Ok => None,
            Outcome::CommandError(e)
            | Outcome::ConfigError(e)
            | Outcome::AssertError(e)
            | Outcome::CustomError(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub description: String,
    pub log: Vec<String>,
    pub outcome: Outcome,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = if self.outcome.is_ok() {
            SYMBOL_OK
        } else {
            SYMBOL_NOK
        };
        writeln!(f, "{} [test] {}", symbol, self.description)?;
        for msg in &self.log {
            writeln!(f, "{} {}", SYMBOL_INFO, msg)?;
        }
        if let Some(error) = self.outcome.error() {
            writeln!(f, "{} error: {}", SYMBOL_INFO, error)?;
        }
        write!(f, "{}", if self.outcome.is_ok() { "OK" } else { "failed" })
    }
}

struct Runner<'a> {
    scenario: &'a Scenario,
    def: &'static AttrDef,
    session: CommandSession,
    log: Vec<String>,
    outcome: Outcome,
    skipping: bool,
    initialized: bool,
}

impl<'a> Runner<'a> {
    fn new(scenario: &'a Scenario, def: &'static AttrDef) -> Self {
        Runner {
            scenario,
            def,
            session: CommandSession::new(),
            log: Vec::new(),
            outcome: Outcome::Ok,
            skipping: false,
            initialized: false,
        }
    }

    fn active(&self) -> bool {
        self.outcome.is_ok() && !self.skipping
    }

    fn log(&mut self, msg: String) {
        if self.active() {
            self.log.push(msg);
        }
    }

    fn execute(&mut self, cmd: String) {
        if !self.active() {
            return;
        }
        if let Err(e) = self.session.execute(&cmd) {
            self.outcome =
                Outcome::CommandError(format!("execution of command [{}] has failed: {}", cmd, e));
        }
    }

    fn config(&mut self, matcher: String, present: bool) {
        if !self.active() {
            return;
        }
        let config = self.session.store().map(render).unwrap_or_default();
        match (config.contains(&matcher), present) {
            (false, true) => {
                self.outcome =
                    Outcome::ConfigError(format!("expected config [{}] to be present", matcher))
            }
            (true, false) => {
                self.outcome =
                    Outcome::ConfigError(format!("expected config [{}] to be absent", matcher))
            }
            _ => {}
        }
    }

    fn config_present(&mut self, matcher: String) {
        self.config(matcher, true);
    }

    fn config_absent(&mut self, matcher: String) {
        self.config(matcher, false);
    }

    fn initialize(&mut self) {
        let again = if self.initialized { "re-" } else { "" };
        self.log(format!("prepare: {}initialize bgp test environment", again));
        self.initialized = true;

        let scenario = self.scenario;
        let remote_asn = if scenario.use_ibgp { LOCAL_ASN } else { PEER_ASN };
        self.execute("no router bgp".to_string());
        self.execute(format!("router bgp {}", LOCAL_ASN));
        self.execute("no bgp default ipv4-unicast".to_string());
        self.execute(format!("neighbor {} peer-group", PEER_GROUP));
        if scenario.use_iface_peer {
            self.execute(format!("neighbor {} interface", PEER_INTERFACE));
        }
        self.execute(format!(
            "neighbor {} remote-as {}",
            scenario.peer_name(),
            remote_asn
        ));
    }

    fn prepare_address_family(&mut self) {
        let Some(afi_safi) = self.scenario.afi_safi else {
            return;
        };
        self.log(format!("prepare: switch address-family to [{}]", afi_safi));
        self.execute(format!("address-family {}", afi_safi.keywords()));
        self.execute(format!("neighbor {} activate", PEER_GROUP));
        self.execute(format!("neighbor {} activate", self.scenario.peer_name()));
    }

    fn process(&mut self, peer_set: bool, group_set: bool) {
        if !self.active() {
            return;
        }
        let scenario = self.scenario;
        let peer = scenario.peer_entity();
        let group = Entity::Group(PEER_GROUP.to_string());
        let Some(store) = self.session.store() else {
            self.outcome = Outcome::AssertError("no BGP instance".to_string());
            return;
        };

        let scope = scenario.scope(self.def);
        let attr = self.def.name;
        let result = match self.def.kind {
            AttrKind::GlobalFlag(_) | AttrKind::AfFlag(_) => check_flag(
                store,
                &peer,
                attr,
                scope,
                scenario.invert_peer,
                peer_set || group_set,
                peer_set,
            )
            .and_then(|_| {
                check_flag(
                    store,
                    &group,
                    attr,
                    scope,
                    scenario.invert_group,
                    group_set,
                    false,
                )
            }),
            AttrKind::AfFilter(_) => {
                check_filter(store, &peer, attr, scope, peer_set || group_set, peer_set)
                    .and_then(|_| check_filter(store, &group, attr, scope, group_set, false))
            }
            AttrKind::Custom(_) => Ok(()),
        };
        if let Err(e) = result {
            self.outcome = Outcome::AssertError(e);
            return;
        }

        if let Some(custom) = scenario.custom {
            if let Err(e) = custom(store, &peer, &group, peer_set, group_set) {
                self.outcome = Outcome::CustomError(format!("custom handler failed: {}", e));
            }
        }
    }

    fn kind_label(&self) -> &'static str {
        match self.def.kind {
            AttrKind::GlobalFlag(_) => "peer-flag",
            AttrKind::AfFlag(_) => "af-flag",
            AttrKind::AfFilter(_) => "af-filter",
            AttrKind::Custom(_) => "custom",
        }
    }

    fn run(mut self) -> ScenarioReport {
        let scenario = self.scenario;
        let kind = self.kind_label();
        let (p, g) = (scenario.peer_name(), PEER_GROUP);
        let (ecp, dcp) = if scenario.invert_peer { ("no ", "") } else { ("", "no ") };
        let (ecg, dcg) = if scenario.invert_group { ("no ", "") } else { ("", "no ") };
        let peer_cmd = scenario.peer_cmd();
        let group_cmd = scenario.group_cmd();
        let cmd = scenario.name;
        let join_prefix = if scenario.use_iface_peer { "interface " } else { "" };
        let mut tc = 1;

        self.initialize();
        self.prepare_address_family();

        if scenario.skip == SkipPolicy::SkipTransfer {
            self.skipping = true;
        }

        // set on peer
        self.log(format!("case {:02}: set {} [{}] on [{}]", tc, kind, peer_cmd, p));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_absent(format!("neighbor {} {}", g, cmd));
        self.process(true, false);

        // set on group
        self.log(format!("case {:02}: set {} [{}] on [{}]", tc, kind, group_cmd, g));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", ecg, g, group_cmd));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_present(format!("{}neighbor {} {}", ecg, g, group_cmd));
        self.process(true, true);

        // join
        self.log(format!("case {:02}: add peer [{}] to group [{}]", tc, p, g));
        tc += 1;
        self.execute(format!("neighbor {} peer-group {}", p, g));
        self.config_present(format!("neighbor {} {}peer-group {}", p, join_prefix, g));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_present(format!("{}neighbor {} {}", ecg, g, group_cmd));
        self.process(true, true);

        // unset on group
        self.log(format!("case {:02}: unset {} [{}] on [{}]", tc, kind, group_cmd, g));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", dcg, g, group_cmd));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_absent(format!("neighbor {} {}", g, cmd));
        self.process(true, false);

        self.skipping = false;

        self.initialize();
        self.prepare_address_family();

        // set on peer
        self.log(format!("case {:02}: set {} [{}] on [{}]", tc, kind, peer_cmd, p));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_absent(format!("neighbor {} {}", g, cmd));
        self.process(true, false);

        // join
        self.log(format!("case {:02}: add peer [{}] to group [{}]", tc, p, g));
        tc += 1;
        self.execute(format!("neighbor {} peer-group {}", p, g));
        self.config_present(format!("neighbor {} {}peer-group {}", p, join_prefix, g));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_absent(format!("neighbor {} {}", g, cmd));
        self.process(true, false);

        // join again
        self.log(format!("case {:02}: re-add peer [{}] to group [{}]", tc, p, g));
        tc += 1;
        self.execute(format!("neighbor {} peer-group {}", p, g));
        self.config_present(format!("neighbor {} {}peer-group {}", p, join_prefix, g));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_absent(format!("neighbor {} {}", g, cmd));
        self.process(true, false);

        // set on group
        self.log(format!("case {:02}: set {} [{}] on [{}]", tc, kind, group_cmd, g));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", ecg, g, group_cmd));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_present(format!("{}neighbor {} {}", ecg, g, group_cmd));
        self.process(true, true);

        // unset on group
        self.log(format!("case {:02}: unset {} [{}] on [{}]", tc, kind, group_cmd, g));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", dcg, g, group_cmd));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_absent(format!("neighbor {} {}", g, cmd));
        self.process(true, false);

        // set on group
        self.log(format!("case {:02}: set {} [{}] on [{}]", tc, kind, group_cmd, g));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", ecg, g, group_cmd));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_present(format!("{}neighbor {} {}", ecg, g, group_cmd));
        self.process(true, true);

        // set on peer again
        self.log(format!("case {:02}: re-set {} [{}] on [{}]", tc, kind, peer_cmd, p));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_present(format!("{}neighbor {} {}", ecg, g, group_cmd));
        self.process(true, true);

        // unset on peer
        self.log(format!("case {:02}: unset {} [{}] on [{}]", tc, kind, peer_cmd, p));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", dcp, p, peer_cmd));
        self.config_absent(format!("neighbor {} {}", p, cmd));
        self.config_present(format!("{}neighbor {} {}", ecg, g, group_cmd));
        self.process(false, true);

        // unset on group
        self.log(format!("case {:02}: unset {} [{}] on [{}]", tc, kind, group_cmd, g));
        tc += 1;
        self.execute(format!("{}neighbor {} {}", dcg, g, group_cmd));
        self.config_absent(format!("neighbor {} {}", p, cmd));
        self.config_absent(format!("neighbor {} {}", g, cmd));
        self.process(false, false);

        // set on peer
        self.log(format!("case {:02}: set {} [{}] on [{}]", tc, kind, peer_cmd, p));
        self.execute(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_present(format!("{}neighbor {} {}", ecp, p, peer_cmd));
        self.config_absent(format!("neighbor {} {}", g, cmd));
        self.process(true, false);

        ScenarioReport {
            description: scenario.description(),
            log: self.log,
            outcome: self.outcome,
        }
    }
}

fn check_flag(
    store: &NeighborStore,
    entity: &Entity,
    attr: &str,
    scope: Scope,
    expect_inverted: bool,
    expect_set: bool,
    expect_overridden: bool,
) -> Result<(), String> {
    let state = store
        .effective(entity, attr, scope)
        .map_err(|e| e.to_string())?;
    expect_eq(entity, "value", state.value, expect_set ^ expect_inverted)?;
    expect_eq(entity, "overridden", state.overridden, expect_overridden)?;
    expect_eq(entity, "inverted", state.inverted, expect_inverted)
}

fn check_filter(
    store: &NeighborStore,
    entity: &Entity,
    attr: &str,
    scope: Scope,
    expect_set: bool,
    expect_overridden: bool,
) -> Result<(), String> {
    let state = store
        .effective(entity, attr, scope)
        .map_err(|e| e.to_string())?;
    expect_eq(entity, "overridden", state.overridden, expect_overridden)?;
    expect_eq(entity, "list", state.argument.is_some(), expect_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenarios_expand_families() {
        let scenarios = default_scenarios();
        let send_community: Vec<_> = scenarios
            .iter()
            .filter(|s| s.attr == "send-community")
            .collect();
        assert_eq!(send_community.len(), 4);
        assert!(send_community.iter().all(|s| s.afi_safi.is_some()));

        let passive: Vec<_> = scenarios.iter().filter(|s| s.attr == "passive").collect();
        assert_eq!(passive.len(), 1);
        assert!(passive[0].afi_safi.is_none());
    }

    #[test]
    fn test_every_scenario_attribute_exists() {
        for scenario in default_scenarios() {
            assert!(lookup(scenario.attr).is_ok(), "{}", scenario.attr);
        }
    }

    #[test]
    fn test_description() {
        let scenario = Scenario::new("send-community").for_family(AfiSafi::IPV6_MULTICAST);
        assert_eq!(scenario.description(), "peer\\ipv6-multicast\\send-community");
        assert_eq!(Scenario::new("passive").description(), "peer\\passive");
    }

    #[test]
    fn test_run_flag_scenario() {
        let report = Scenario::new("passive").run();
        assert_eq!(report.outcome, Outcome::Ok, "{}", report);
        assert_eq!(report.log.len(), 16);
        assert_eq!(report.log[0], "prepare: initialize bgp test environment");
        assert_eq!(report.log[1], "case 01: set peer-flag [passive] on [1.1.1.1]");
    }

    #[test]
    fn test_run_inverted_scenario() {
        let report = Scenario::new("send-community")
            .inverted(true, true)
            .for_family(AfiSafi::IPV4_UNICAST)
            .run();
        assert_eq!(report.outcome, Outcome::Ok, "{}", report);
    }

    #[test]
    fn test_skip_transfer() {
        let report = Scenario::new("route-reflector-client")
            .ibgp()
            .with_skip(SkipPolicy::SkipTransfer)
            .for_family(AfiSafi::IPV4_UNICAST)
            .run();
        assert_eq!(report.outcome, Outcome::Ok, "{}", report);
        assert!(report.log.iter().all(|msg| !msg.starts_with("case 01")));
        assert!(report.log.iter().any(|msg| msg.starts_with("case 05")));
    }

    #[test]
    fn test_wrong_expectation_fails() {
        // passive is not inverted: "no neighbor ... passive" only stores an
        // explicit default on the peer
        let report = Scenario::new("passive").inverted(true, false).run();
        assert!(
            matches!(&report.outcome, Outcome::AssertError(e) if e.contains("inverted")),
            "{}",
            report
        );
        assert!(report.to_string().ends_with("failed"));
    }

    #[test]
    fn test_command_failure() {
        let report = Scenario::new("weight")
            .with_args("70000", "200")
            .for_family(AfiSafi::IPV4_UNICAST)
            .run();
        assert!(matches!(report.outcome, Outcome::CommandError(_)));
    }

    #[test]
    fn test_report_display() {
        let report = ScenarioReport {
            description: "peer\\passive".to_string(),
            log: vec!["case 01: set peer-flag [passive] on [1.1.1.1]".to_string()],
            outcome: Outcome::Ok,
        };
        assert_eq!(
            report.to_string(),
            "\u{2714} [test] peer\\passive\n\u{25ba} case 01: set peer-flag [passive] on [1.1.1.1]\nOK"
        );
    }
}
