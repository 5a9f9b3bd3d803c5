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

use crate::bgp::multiprotocol::AfiSafi;
use crate::command::CommandSession;
use crate::neighbor::NeighborStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};

/// Per address family neighbor configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AddressFamilyConfig {
    /// Some(true) activates the family, Some(false) deactivates it.
    #[serde(default)]
    pub activate: Option<bool>,
    /// Attribute commands without the `neighbor NAME` prefix, e.g.
    /// `next-hop-self` or `no send-community`.
    #[serde(default)]
    pub settings: Vec<String>,
}

/// Peer-group in YAML config file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PeerGroupConfig {
    pub name: String,
    #[serde(default)]
    pub remote_as: Option<u32>,
    /// Session-wide attribute commands.
    #[serde(default)]
    pub settings: Vec<String>,
    /// Keyed by family, e.g. `ipv4-unicast`.
    #[serde(default, rename = "address-families")]
    pub address_families: BTreeMap<String, AddressFamilyConfig>,
}

/// Peer in YAML config file. Exactly one of `address` and `interface`
/// identifies it.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PeerConfig {
    #[serde(default)]
    pub address: Option<IpAddr>,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub remote_as: Option<u32>,
    #[serde(default, rename = "peer-group")]
    pub peer_group: Option<String>,
    #[serde(default)]
    pub settings: Vec<String>,
    #[serde(default, rename = "address-families")]
    pub address_families: BTreeMap<String, AddressFamilyConfig>,
}

impl PeerConfig {
    /// Name the peer is addressed by in commands.
    pub fn name(&self) -> Result<String, String> {
        match (&self.address, &self.interface) {
            (Some(addr), None) => Ok(addr.to_string()),
            (None, Some(name)) => Ok(name.clone()),
            (Some(addr), Some(name)) => Err(format!(
                "peer {} has both an address and an interface ({})",
                addr, name
            )),
            (None, None) => Err("peer needs an address or an interface".to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub asn: u32,
    #[serde(default)]
    pub router_id: Option<Ipv4Addr>,
    /// Activate new peers for IPv4 unicast automatically.
    #[serde(default = "default_ipv4_unicast")]
    pub default_ipv4_unicast: bool,
    /// Log level: "error", "warn", "info" (default), "debug"
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default, rename = "peer-groups")]
    pub peer_groups: Vec<PeerGroupConfig>,
    #[serde(default)]
    pub peers: Vec<PeerConfig>,
}

fn default_ipv4_unicast() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn new(asn: u32) -> Self {
        Config {
            asn,
            router_id: None,
            default_ipv4_unicast: default_ipv4_unicast(),
            log_level: default_log_level(),
            peer_groups: Vec::new(),
            peers: Vec::new(),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// The configuration as `router bgp` command lines.
    pub fn to_commands(&self) -> Result<Vec<String>, String> {
        let mut commands = vec![format!("router bgp {}", self.asn)];
        if let Some(router_id) = self.router_id {
            commands.push(format!("bgp router-id {}", router_id));
        }
        if !self.default_ipv4_unicast {
            commands.push("no bgp default ipv4-unicast".to_string());
        }

        for group in &self.peer_groups {
            commands.push(format!("neighbor {} peer-group", group.name));
            if let Some(asn) = group.remote_as {
                commands.push(format!("neighbor {} remote-as {}", group.name, asn));
            }
        }

        for peer in &self.peers {
            let name = peer.name()?;
            if peer.interface.is_some() {
                match &peer.peer_group {
                    Some(group) => {
                        commands.push(format!("neighbor {} interface peer-group {}", name, group))
                    }
                    None => commands.push(format!("neighbor {} interface", name)),
                }
                if let Some(asn) = peer.remote_as {
                    commands.push(format!("neighbor {} remote-as {}", name, asn));
                }
                continue;
            }

            match (peer.remote_as, &peer.peer_group) {
                (None, None) => {
                    return Err(format!("peer {} needs a remote_as or a peer-group", name))
                }
                (asn, group) => {
                    if let Some(asn) = asn {
                        commands.push(format!("neighbor {} remote-as {}", name, asn));
                    }
                    if let Some(group) = group {
                        commands.push(format!("neighbor {} peer-group {}", name, group));
                    }
                }
            }
        }

        for group in &self.peer_groups {
            attribute_commands(&mut commands, &group.name, &group.settings, &group.address_families)?;
        }
        for peer in &self.peers {
            attribute_commands(&mut commands, &peer.name()?, &peer.settings, &peer.address_families)?;
        }
        Ok(commands)
    }

    /// Build the neighbor store this configuration describes.
    pub fn build_store(&self) -> Result<NeighborStore, Box<dyn std::error::Error>> {
        let mut session = CommandSession::new();
        for command in self.to_commands()? {
            session.execute(&command)?;
        }
        session
            .into_store()
            .ok_or_else(|| "configuration did not create a BGP instance".into())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(65000)
    }
}

fn neighbor_command(name: &str, setting: &str) -> String {
    match setting.trim().strip_prefix("no ") {
        Some(rest) => format!("no neighbor {} {}", name, rest.trim()),
        None => format!("neighbor {} {}", name, setting.trim()),
    }
}

fn attribute_commands(
    commands: &mut Vec<String>,
    name: &str,
    settings: &[String],
    families: &BTreeMap<String, AddressFamilyConfig>,
) -> Result<(), String> {
    for setting in settings {
        commands.push(neighbor_command(name, setting));
    }
    for (family, af) in families {
        let afi_safi: AfiSafi = family.parse()?;
        commands.push(format!("address-family {}", afi_safi.keywords()));
        match af.activate {
            Some(true) => commands.push(format!("neighbor {} activate", name)),
            Some(false) => commands.push(format!("no neighbor {} activate", name)),
            None => {}
        }
        for setting in &af.settings {
            commands.push(neighbor_command(name, setting));
        }
        commands.push("exit-address-family".to_string());
    }
    Ok(())
}
