//! List of directory mirrors that ships with this tool, for descriptor
//! downloads.
//!
//! A client with no cached directory information has to know *someone* on
//! the network to ask. The directory authorities publish their addresses
//! out of band, and every Tor distribution compiles a copy in; we do the
//! same. From time to time the list changes, and this module has to be
//! regenerated against the authority list in the Tor source.

use std::net::Ipv4Addr;

/// A directory whose location ships with this tool, and which we can use
/// for fetching descriptors when we don't know anything else about the
/// network.
#[derive(Debug, Clone)]
pub struct FallbackDir {
    /// Nickname of the directory, for log messages.
    nickname: &'static str,
    /// IPv4 address of the directory.
    addr: Ipv4Addr,
    /// Port on which the directory serves HTTP directory requests.
    dir_port: u16,
}

impl FallbackDir {
    /// Construct a new FallbackDir.
    const fn new(nickname: &'static str, addr: Ipv4Addr, dir_port: u16) -> Self {
        FallbackDir {
            nickname,
            addr,
            dir_port,
        }
    }

    /// Return the nickname of this directory.
    pub fn nickname(&self) -> &str {
        self.nickname
    }

    /// Return the address of this directory.
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// Return the port on which this directory serves directory requests.
    pub fn dir_port(&self) -> u16 {
        self.dir_port
    }

    /// Return the URL at which this directory serves `resource`.
    pub fn dir_url(&self, resource: &str) -> String {
        format!("http://{}:{}{}", self.addr, self.dir_port, resource)
    }

    /// Return the compiled-in mirror list.
    pub fn defaults() -> &'static [FallbackDir] {
        &DEFAULT_FALLBACKS
    }
}

/// The directory authorities, which double as always-available mirrors.
static DEFAULT_FALLBACKS: [FallbackDir; 8] = [
    FallbackDir::new("moria1", Ipv4Addr::new(128, 31, 0, 39), 9131),
    FallbackDir::new("dizum", Ipv4Addr::new(45, 66, 35, 11), 80),
    FallbackDir::new("gabelmoo", Ipv4Addr::new(131, 188, 40, 189), 80),
    FallbackDir::new("dannenberg", Ipv4Addr::new(193, 23, 244, 244), 80),
    FallbackDir::new("maatuska", Ipv4Addr::new(171, 25, 193, 9), 443),
    FallbackDir::new("longclaw", Ipv4Addr::new(199, 58, 81, 140), 80),
    FallbackDir::new("bastet", Ipv4Addr::new(204, 13, 164, 118), 80),
    FallbackDir::new("faravahar", Ipv4Addr::new(154, 35, 175, 225), 80),
];
