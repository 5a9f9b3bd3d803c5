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

use clap::{Parser, Subcommand};
use peerattr::bgp::multiprotocol::AfiSafi;
use peerattr::config::Config;
use peerattr::log::{self, LogLevel};
use peerattr::neighbor::{Entity, FilterDirection, NeighborStore, PeerId, Scope};
use peerattr::render::render;
use peerattr::verify::{default_scenarios, run_all};

#[derive(Parser)]
#[command(name = "peerattr")]
#[command(about = "BGP neighbor attribute inheritance tool", version)]
struct Cli {
    /// Log level: error, warn, info, debug [default: the config file's
    /// log_level, else warn]
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the attribute inheritance scenarios
    Check {
        /// Only run scenarios for this attribute
        #[arg(long)]
        attr: Option<String>,
        /// Print reports of passing scenarios too
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the running configuration a YAML config file produces
    Render {
        /// Path to YAML config file
        config: String,
    },

    /// Show the effective state of one attribute as JSON
    Show {
        /// Path to YAML config file
        config: String,
        /// Peer address, interface name or peer-group name
        neighbor: String,
        /// Attribute name, e.g. "send-community"
        attr: String,
        /// Address family, e.g. ipv4-unicast
        #[arg(long)]
        afi_safi: Option<String>,
        /// Filter direction: in or out
        #[arg(long)]
        direction: Option<String>,
    },
}

const DEFAULT_LOG_LEVEL: &str = "warn";

impl Commands {
    fn config_path(&self) -> Option<&str> {
        match self {
            Commands::Check { .. } => None,
            Commands::Render { config } | Commands::Show { config, .. } => Some(config.as_str()),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match cli.command.config_path() {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    log::init(LogLevel::from_str(log_level(
        cli.log_level.as_deref(),
        config.as_ref(),
    ))?);

    match cli.command {
        Commands::Check { attr, verbose } => {
            let scenarios: Vec<_> = default_scenarios()
                .into_iter()
                .filter(|s| attr.as_deref().map_or(true, |a| s.attr == a))
                .collect();
            if scenarios.is_empty() {
                return Err(format!("no scenarios for attribute {:?}", attr).into());
            }

            let reports = run_all(&scenarios);
            let failed = reports.iter().filter(|r| !r.outcome.is_ok()).count();
            for report in &reports {
                if verbose || !report.outcome.is_ok() {
                    println!("{}", report);
                }
            }
            println!("{} scenarios, {} failed", reports.len(), failed);
            if failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::Render { .. } => {
            let store = build_store(config)?;
            print!("{}", render(&store));
        }

        Commands::Show {
            neighbor,
            attr,
            afi_safi,
            direction,
            ..
        } => {
            let store = build_store(config)?;
            let entity = neighbor_entity(&store, &neighbor)?;
            let scope = parse_scope(afi_safi.as_deref(), direction.as_deref())?;
            let state = store.effective(&entity, &attr, scope)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }

    Ok(())
}

fn load_config(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::from_file(path)
        .map_err(|e| format!("Failed to load config from {}: {}", path, e))?)
}

fn build_store(config: Option<Config>) -> Result<NeighborStore, Box<dyn std::error::Error>> {
    config.ok_or("no config file given")?.build_store()
}

/// The command line wins over the config file.
fn log_level<'a>(flag: Option<&'a str>, config: Option<&'a Config>) -> &'a str {
    flag.or(config.map(|config| config.log_level.as_str()))
        .unwrap_or(DEFAULT_LOG_LEVEL)
}

/// Peer-groups shadow interface names, addresses always mean peers.
fn neighbor_entity(store: &NeighborStore, name: &str) -> Result<Entity, String> {
    let id: PeerId = name.parse()?;
    if let PeerId::Interface(_) = id {
        if store.group(name).is_some() {
            return Ok(Entity::Group(name.to_string()));
        }
    }
    Ok(Entity::Peer(id))
}

fn parse_scope(afi_safi: Option<&str>, direction: Option<&str>) -> Result<Scope, String> {
    let scope = match afi_safi {
        Some(afi_safi) => Scope::af(afi_safi.parse::<AfiSafi>()?),
        None => Scope::GLOBAL,
    };
    match direction {
        Some(direction) => Ok(scope.with_direction(direction.parse::<FilterDirection>()?)),
        None => Ok(scope),
    }
}
