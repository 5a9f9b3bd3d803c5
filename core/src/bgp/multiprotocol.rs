use std::fmt;
use std::str::FromStr;

/// Address Family Identifier per IANA registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum Afi {
    Ipv4 = 1,
    Ipv6 = 2,
}

impl Afi {
    /// Keyword used by the configuration language (`address-family ipv4 ...`).
    pub fn keyword(&self) -> &'static str {
        match self {
            Afi::Ipv4 => "ipv4",
            Afi::Ipv6 => "ipv6",
        }
    }
}

impl fmt::Display for Afi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Afi::Ipv4 => write!(f, "IPv4"),
            Afi::Ipv6 => write!(f, "IPv6"),
        }
    }
}

impl FromStr for Afi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ipv4" => Ok(Afi::Ipv4),
            "ipv6" => Ok(Afi::Ipv6),
            _ => Err(format!("invalid address family: {}", s)),
        }
    }
}

/// Subsequent Address Family Identifier per IANA registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Safi {
    Unicast = 1,
    Multicast = 2,
}

impl Safi {
    pub fn keyword(&self) -> &'static str {
        match self {
            Safi::Unicast => "unicast",
            Safi::Multicast => "multicast",
        }
    }
}

impl fmt::Display for Safi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Safi::Unicast => write!(f, "Unicast"),
            Safi::Multicast => write!(f, "Multicast"),
        }
    }
}

impl FromStr for Safi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unicast" => Ok(Safi::Unicast),
            "multicast" => Ok(Safi::Multicast),
            _ => Err(format!("invalid subsequent address family: {}", s)),
        }
    }
}

/// Combined AFI/SAFI, the scope of address-family specific neighbor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AfiSafi {
    pub afi: Afi,
    pub safi: Safi,
}

impl AfiSafi {
    pub const IPV4_UNICAST: AfiSafi = AfiSafi::new(Afi::Ipv4, Safi::Unicast);
    pub const IPV4_MULTICAST: AfiSafi = AfiSafi::new(Afi::Ipv4, Safi::Multicast);
    pub const IPV6_UNICAST: AfiSafi = AfiSafi::new(Afi::Ipv6, Safi::Unicast);
    pub const IPV6_MULTICAST: AfiSafi = AfiSafi::new(Afi::Ipv6, Safi::Multicast);

    /// Every family a neighbor can be configured for.
    pub const ALL: [AfiSafi; 4] = [
        AfiSafi::IPV4_UNICAST,
        AfiSafi::IPV4_MULTICAST,
        AfiSafi::IPV6_UNICAST,
        AfiSafi::IPV6_MULTICAST,
    ];

    pub const fn new(afi: Afi, safi: Safi) -> Self {
        AfiSafi { afi, safi }
    }

    /// Parse the two keywords of `address-family <afi> <safi>`.
    pub fn from_keywords(afi: &str, safi: &str) -> Result<Self, String> {
        Ok(AfiSafi::new(afi.parse()?, safi.parse()?))
    }

    /// Configuration form, e.g. `ipv6 multicast`.
    pub fn keywords(&self) -> String {
        format!("{} {}", self.afi.keyword(), self.safi.keyword())
    }
}

impl fmt::Display for AfiSafi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.afi, self.safi)
    }
}

/// Accepts `ipv4-unicast`, `ipv4 unicast` and `ipv4/unicast`.
impl FromStr for AfiSafi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(['-', ' ', '/']).filter(|p| !p.is_empty());
        match (parts.next(), parts.next(), parts.next()) {
            (Some(afi), Some(safi), None) => AfiSafi::from_keywords(afi, safi),
            _ => Err(format!("invalid AFI/SAFI: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_afi_from_str() {
        assert_eq!("ipv4".parse::<Afi>().unwrap(), Afi::Ipv4);
        assert_eq!("IPv6".parse::<Afi>().unwrap(), Afi::Ipv6);
        assert!("ipx".parse::<Afi>().is_err());
    }

    #[test]
    fn test_safi_from_str() {
        assert_eq!("unicast".parse::<Safi>().unwrap(), Safi::Unicast);
        assert_eq!("multicast".parse::<Safi>().unwrap(), Safi::Multicast);
        assert!("labeled-unicast".parse::<Safi>().is_err());
    }

    #[test]
    fn test_afi_safi_from_str() {
        assert_eq!(
            "ipv4-unicast".parse::<AfiSafi>().unwrap(),
            AfiSafi::IPV4_UNICAST
        );
        assert_eq!(
            "ipv6 multicast".parse::<AfiSafi>().unwrap(),
            AfiSafi::IPV6_MULTICAST
        );
        assert_eq!(
            "ipv6/unicast".parse::<AfiSafi>().unwrap(),
            AfiSafi::IPV6_UNICAST
        );
        assert!("ipv4".parse::<AfiSafi>().is_err());
        assert!("ipv4 unicast extra".parse::<AfiSafi>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Afi::Ipv4), "IPv4");
        assert_eq!(format!("{}", Safi::Multicast), "Multicast");
        assert_eq!(format!("{}", AfiSafi::IPV6_UNICAST), "IPv6/Unicast");
        assert_eq!(AfiSafi::IPV6_MULTICAST.keywords(), "ipv6 multicast");
    }
}
