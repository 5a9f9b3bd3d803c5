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

use super::SessionType;
use std::fmt;

/// Attribute whose effective value is a number rather than a flag bit.
///
/// Implementations are resolved through [`NeighborStore::custom_value`]
/// (peer setting, then group setting, then [`CustomAttr::default_value`])
/// and also show up in [`NeighborStore::effective`] with the resolved value
/// as the state's argument.
///
/// [`NeighborStore::custom_value`]: super::NeighborStore::custom_value
/// [`NeighborStore::effective`]: super::NeighborStore::effective
pub trait CustomAttr: fmt::Debug + Sync {
    /// Check a value before it is stored.
    fn validate(&self, value: u32) -> Result<(), String>;

    /// Value in effect when neither the entity nor its group configures one.
    fn default_value(&self, session: SessionType) -> u32;

    /// Parse command arguments into a value.
    fn parse(&self, args: &[&str]) -> Result<u32, String> {
        let [arg] = args else {
            return Err(format!("expected exactly one value, got {}", args.len()));
        };
        let value = arg
            .parse::<u32>()
            .map_err(|_| format!("invalid number: {}", arg))?;
        self.validate(value)?;
        Ok(value)
    }
}

/// MinRouteAdvertisementIntervalTimer (RFC 4271 9.2.1.1), in seconds.
#[derive(Debug)]
pub struct AdvertisementInterval;

impl AdvertisementInterval {
    pub const MAX: u32 = 600;
    pub const DEFAULT_EBGP: u32 = 30;
    pub const DEFAULT_IBGP: u32 = 5;
}

impl CustomAttr for AdvertisementInterval {
    fn validate(&self, value: u32) -> Result<(), String> {
        if value > Self::MAX {
            return Err(format!("interval {} out of range 0..{}", value, Self::MAX));
        }
        Ok(())
    }

    fn default_value(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Ebgp => Self::DEFAULT_EBGP,
            SessionType::Ibgp => Self::DEFAULT_IBGP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advertisement_interval_parse() {
        assert_eq!(AdvertisementInterval.parse(&["10"]).unwrap(), 10);
        assert_eq!(AdvertisementInterval.parse(&["0"]).unwrap(), 0);
        assert!(AdvertisementInterval.parse(&["601"]).is_err());
        assert!(AdvertisementInterval.parse(&["ten"]).is_err());
        assert!(AdvertisementInterval.parse(&[]).is_err());
        assert!(AdvertisementInterval.parse(&["10", "20"]).is_err());
    }

    #[test]
    fn test_advertisement_interval_defaults() {
        assert_eq!(AdvertisementInterval.default_value(SessionType::Ebgp), 30);
        assert_eq!(AdvertisementInterval.default_value(SessionType::Ibgp), 5);
    }
}
