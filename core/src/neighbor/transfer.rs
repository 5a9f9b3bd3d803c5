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

use super::store::unknown_entity;
use super::{Entity, NeighborError, NeighborStore, Peer, PeerId};
use crate::log::{debug, info};

impl NeighborStore {
    /// Bind a peer to a peer-group.
    ///
    /// The peer keeps everything it configured itself and inherits the
    /// rest from the group from now on. Joining the current group again
    /// changes nothing; joining another group moves the peer.
    pub fn join(&mut self, id: &PeerId, group: &str) -> Result<(), NeighborError> {
        let peer = self
            .peers
            .get(id)
            .ok_or_else(|| unknown_entity(&Entity::Peer(id.clone())))?;
        let target = self
            .groups
            .get(group)
            .ok_or_else(|| unknown_entity(&Entity::Group(group.to_string())))?;

        if let (Some(peer_asn), Some(group_asn)) = (peer.remote_asn, target.remote_asn) {
            if peer_asn != group_asn {
                return Err(NeighborError::InvalidEntityState(format!(
                    "peer {} has remote-as {} but peer-group {} has remote-as {}",
                    id, peer_asn, group, group_asn
                )));
            }
        }

        let previous = peer.group.clone();
        if previous.as_deref() == Some(group) {
            debug!(peer = %id, group, "peer already in peer-group");
            return Ok(());
        }

        if let Some(peer) = self.peers.get_mut(id) {
            peer.group = Some(group.to_string());
            peer.conf.retained.clear();
        }
        match previous {
            Some(previous) => info!(peer = %id, from = %previous, to = group, "peer moved to peer-group"),
            None => info!(peer = %id, group, "peer joined peer-group"),
        }
        Ok(())
    }

    /// Unbind a peer from its peer-group. The peer's own settings are
    /// untouched; whatever it inherited simply stops applying.
    pub fn leave(&mut self, id: &PeerId, group: &str) -> Result<(), NeighborError> {
        let peer = self
            .peers
            .get_mut(id)
            .ok_or_else(|| unknown_entity(&Entity::Peer(id.clone())))?;
        if peer.group.as_deref() != Some(group) {
            return Err(NeighborError::InvalidEntityState(format!(
                "peer {} is not a member of peer-group {}",
                id, group
            )));
        }

        peer.group = None;
        peer.conf.retained.clear();
        info!(peer = %id, group, "peer left peer-group");
        Ok(())
    }

    /// Peers currently bound to `group`.
    pub fn members<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Peer> + 'a {
        self.peers
            .values()
            .filter(move |peer| peer.group.as_deref() == Some(group))
    }
}
