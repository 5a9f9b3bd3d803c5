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

//! Common test utilities for neighbor configuration testing

#![allow(dead_code)]

use peerattr::command::CommandSession;
use peerattr::neighbor::{Entity, NeighborStore, PeerId};
use peerattr::render::render;

pub const LOCAL_ASN: u32 = 100;
pub const PEER_ASN: u32 = 200;
pub const GROUP: &str = "PG-TEST";

/// Send engine logs to the test harness. Honors RUST_LOG.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn peer_id() -> PeerId {
    PeerId::Address("1.1.1.1".parse().unwrap())
}

pub fn peer() -> Entity {
    Entity::Peer(peer_id())
}

pub fn group() -> Entity {
    Entity::Group(GROUP.to_string())
}

/// Store built from configuration lines. Panics on the first rejected line.
pub fn store_from(config: &str) -> NeighborStore {
    let mut session = CommandSession::new();
    session
        .execute_all(config)
        .unwrap_or_else(|e| panic!("config rejected: {}", e));
    session.store().cloned().expect("no BGP instance configured")
}

/// Instance with PG-TEST and an eBGP peer 1.1.1.1 that is not yet bound.
pub fn setup_peer_and_group() -> NeighborStore {
    store_from(
        "router bgp 100\n\
         no bgp default ipv4-unicast\n\
         neighbor PG-TEST peer-group\n\
         neighbor PG-TEST remote-as 200\n\
         neighbor 1.1.1.1 remote-as 200\n",
    )
}

/// Render `store` and load the output into a fresh instance.
pub fn reload(store: &NeighborStore) -> NeighborStore {
    store_from(&render(store))
}
