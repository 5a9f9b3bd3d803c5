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

use std::fmt;
use std::ops::BitOr;

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident { $($flag:ident = $bit:expr,)+ }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub u32);

        impl $name {
            pub const NONE: $name = $name(0);
            $(pub const $flag: $name = $name(1 << $bit);)+

            const NAMES: &'static [(&'static str, $name)] = &[$((stringify!($flag), $name::$flag),)+];

            pub fn is_empty(&self) -> bool {
                self.0 == 0
            }

            pub fn contains(&self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn intersects(&self, other: $name) -> bool {
                self.0 & other.0 != 0
            }

            pub fn count(&self) -> u32 {
                self.0.count_ones()
            }

            /// Single-bit masks making up this set, lowest bit first.
            pub fn bits(self) -> impl Iterator<Item = $name> {
                (0..u32::BITS)
                    .map(|i| 1u32 << i)
                    .filter(move |bit| self.0 & bit != 0)
                    .map($name)
            }
        }

        impl BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let names: Vec<&str> = Self::NAMES
                    .iter()
                    .filter(|(_, flag)| self.contains(*flag))
                    .map(|(name, _)| *name)
                    .collect();
                write!(f, "{}({})", stringify!($name), names.join(" | "))
            }
        }
    };
}

flag_set! {
    /// Session-wide neighbor flags.
    PeerFlags {
        PASSIVE = 0,
        SHUTDOWN = 1,
        DONT_CAPABILITY = 2,
        OVERRIDE_CAPABILITY = 3,
        STRICT_CAP_MATCH = 4,
        DYNAMIC_CAPABILITY = 5,
        DISABLE_CONNECTED_CHECK = 6,
        ENFORCE_FIRST_AS = 7,
        CAPABILITY_ENHE = 8,
    }
}

flag_set! {
    /// Neighbor flags scoped to one AFI/SAFI.
    AfFlags {
        SEND_COMMUNITY = 0,
        SEND_EXT_COMMUNITY = 1,
        SEND_LARGE_COMMUNITY = 2,
        NEXTHOP_SELF = 3,
        FORCE_NEXTHOP_SELF = 4,
        REFLECTOR_CLIENT = 5,
        RSERVER_CLIENT = 6,
        SOFT_RECONFIG = 7,
        AS_PATH_UNCHANGED = 8,
        NEXTHOP_UNCHANGED = 9,
        MED_UNCHANGED = 10,
        DEFAULT_ORIGINATE = 11,
        REMOVE_PRIVATE_AS = 12,
        REMOVE_PRIVATE_AS_ALL = 13,
        REMOVE_PRIVATE_AS_REPLACE = 14,
        REMOVE_PRIVATE_AS_ALL_REPLACE = 15,
        ALLOWAS_IN = 16,
        ALLOWAS_IN_ORIGIN = 17,
        ORF_PREFIX_SM = 18,
        ORF_PREFIX_RM = 19,
        MAX_PREFIX = 20,
        AS_OVERRIDE = 21,
        WEIGHT = 22,
        ADDPATH_TX_ALL_PATHS = 23,
        ADDPATH_TX_BESTPATH_PER_AS = 24,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_split_compound_mask() {
        let mask = AfFlags::AS_PATH_UNCHANGED | AfFlags::MED_UNCHANGED;
        let bits: Vec<AfFlags> = mask.bits().collect();
        assert_eq!(
            bits,
            vec![AfFlags::AS_PATH_UNCHANGED, AfFlags::MED_UNCHANGED]
        );
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn test_contains_and_intersects() {
        let mask = PeerFlags::PASSIVE | PeerFlags::SHUTDOWN;
        assert!(mask.contains(PeerFlags::PASSIVE));
        assert!(!mask.contains(PeerFlags::PASSIVE | PeerFlags::CAPABILITY_ENHE));
        assert!(mask.intersects(PeerFlags::SHUTDOWN | PeerFlags::CAPABILITY_ENHE));
        assert!(PeerFlags::NONE.is_empty());
    }

    #[test]
    fn test_debug_lists_flag_names() {
        let mask = AfFlags::ORF_PREFIX_SM | AfFlags::ORF_PREFIX_RM;
        assert_eq!(format!("{:?}", mask), "AfFlags(ORF_PREFIX_SM | ORF_PREFIX_RM)");
    }
}
