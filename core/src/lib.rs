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

//! Peer and peer-group attribute inheritance for a BGP daemon's neighbor
//! configuration.
//!
//! Attributes are configured on individual peers or on peer-groups. The
//! [`neighbor::NeighborStore`] keeps what was configured where, resolves the
//! effective value of every attribute for every peer, and keeps explicit
//! peer settings intact while peers join and leave groups. The
//! [`command`] and [`render`] modules translate between the store and the
//! daemon's `router bgp` configuration text.

pub mod bgp;
pub mod command;
pub mod config;
pub mod log;
pub mod neighbor;
pub mod render;
pub mod verify;
