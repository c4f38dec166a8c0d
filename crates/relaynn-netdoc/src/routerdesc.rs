//! Parsing for server descriptors.
//!
//! A "server descriptor" is a statement that a relay publishes about
//! itself, describing its keys, its capabilities, its location, and its
//! status. Directory caches serve the full set of them at
//! `/tor/server/all`, concatenated into one stream.
//!
//! This module extracts only the configuration-shaped subset of fields
//! that relaynn compares between relays. Certificates, keys, and
//! signatures are tokenized (so the parser stays aligned with the
//! document) but never examined.

use std::net::Ipv4Addr;

use tracing::warn;

use crate::tokenize::{Item, Reader};
use crate::types::{
    AddrPolicy, Fingerprint, Iso8601TimeSp, Nickname, PolicyRule, RelayPlatform, RuleKind,
};
use crate::{Error, Result};

/// A relay's self-reported bandwidth figures, in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct RelayBandwidth {
    /// Volume the relay is willing to sustain over long periods.
    pub average: u64,
    /// Volume the relay is willing to sustain in short bursts.
    pub burst: u64,
    /// Estimate of the largest volume the relay actually moved in any
    /// recent ten-second period.
    pub observed: u64,
}

/// Information about a relay, parsed from a server descriptor.
///
/// This type does not hold all the information in a descriptor: only the
/// fields that describe the relay's configuration and observed behaviour,
/// which is what relaynn compares. In particular no key material is kept.
#[derive(Debug, Clone)]
pub struct ServerDesc {
    /// Human-readable nickname for this relay.
    ///
    /// This is not secure, and not guaranteed to be unique.
    nickname: Nickname,
    /// IPv4 address for this relay.
    ipv4addr: Ipv4Addr,
    /// IPv4 ORPort for this relay.
    orport: u16,
    /// Directory port for contacting this relay for direct HTTP
    /// directory downloads. `None` if the relay advertises none
    /// (written as port 0 in the document).
    dirport: Option<u16>,
    /// RSA identity fingerprint of this relay.
    fingerprint: Fingerprint,
    /// Software and version that this relay says it's running.
    platform: Option<RelayPlatform>,
    /// Time when this descriptor was published.
    published: Iso8601TimeSp,
    /// Declared uptime for this relay, in seconds.
    uptime: Option<u64>,
    /// Self-reported bandwidth figures.
    bandwidth: RelayBandwidth,
    /// The relay's IPv4 exit policy, in declaration order.
    exit_policy: AddrPolicy,
    /// Contact information for the operator, if any was published.
    contact: Option<String>,
}

impl ServerDesc {
    /// Return this relay's nickname.
    pub fn nickname(&self) -> &Nickname {
        &self.nickname
    }

    /// Return this relay's IPv4 address.
    pub fn addr(&self) -> Ipv4Addr {
        self.ipv4addr
    }

    /// Return this relay's ORPort.
    pub fn or_port(&self) -> u16 {
        self.orport
    }

    /// Return this relay's directory port, if it advertises one.
    pub fn dir_port(&self) -> Option<u16> {
        self.dirport
    }

    /// Return this relay's identity fingerprint.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Return the platform this relay says it runs, if it said one.
    pub fn platform(&self) -> Option<&RelayPlatform> {
        self.platform.as_ref()
    }

    /// Return the publication time of this descriptor.
    pub fn published(&self) -> Iso8601TimeSp {
        self.published
    }

    /// Return this relay's declared uptime in seconds, if it declared one.
    pub fn uptime(&self) -> Option<u64> {
        self.uptime
    }

    /// Return this relay's self-reported bandwidth figures.
    pub fn bandwidth(&self) -> &RelayBandwidth {
        &self.bandwidth
    }

    /// Return this relay's exit policy.
    pub fn exit_policy(&self) -> &AddrPolicy {
        &self.exit_policy
    }

    /// Return the operator's contact line, if one was published.
    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    /// Try to parse `s` as a single server descriptor.
    ///
    /// Leading `@`-annotations (as added by caches and archive tooling)
    /// are ignored.
    pub fn parse(s: &str) -> Result<ServerDesc> {
        let items = Reader::new(s).into_items()?;
        Self::from_items(&items)
    }

    /// Helper: find the single item with keyword `kwd`, if there is one.
    fn find<'a, 'b>(items: &'a [Item<'b>], kwd: &str) -> Option<&'a Item<'b>> {
        items.iter().find(|item| item.kwd() == kwd)
    }

    /// Helper: as `find`, but give an error if the item is absent.
    fn find_required<'a, 'b>(items: &'a [Item<'b>], kwd: &'static str) -> Result<&'a Item<'b>> {
        Self::find(items, kwd).ok_or(Error::MissingItem(kwd))
    }

    /// Helper: assemble a ServerDesc from the items of one document.
    fn from_items(items: &[Item<'_>]) -> Result<ServerDesc> {
        // router nickname ipv4addr orport socksport dirport
        let (nickname, ipv4addr, orport, dirport) = {
            let rtrline = Self::find_required(items, "router")?;
            let dirport = match rtrline.parse_arg::<u16>(4)? {
                0 => None,
                port => Some(port),
            };
            (
                rtrline.parse_arg::<Nickname>(0)?,
                rtrline.parse_arg::<Ipv4Addr>(1)?,
                rtrline.parse_arg::<u16>(2)?,
                // Skipping socksport, which modern relays always set to 0.
                dirport,
            )
        };

        let fingerprint = Self::find_required(items, "fingerprint")?
            .args_as_str()
            .parse::<Fingerprint>()?;

        let platform = Self::find(items, "platform")
            .map(|item| item.args_as_str().parse::<RelayPlatform>())
            .transpose()?;

        let published = Self::find_required(items, "published")?
            .args_as_str()
            .parse::<Iso8601TimeSp>()?;

        let uptime = Self::find(items, "uptime")
            .map(|item| item.parse_arg::<u64>(0))
            .transpose()?;

        let bandwidth = {
            let bw = Self::find_required(items, "bandwidth")?;
            RelayBandwidth {
                average: bw.parse_arg(0)?,
                burst: bw.parse_arg(1)?,
                observed: bw.parse_arg(2)?,
            }
        };

        // accept and reject items form the exit policy, in order.
        let mut exit_policy = AddrPolicy::new();
        for item in items {
            let kind = match item.kwd() {
                "accept" => RuleKind::Accept,
                "reject" => RuleKind::Reject,
                _ => continue,
            };
            let pattern = item.required_arg(0)?;
            exit_policy.push(PolicyRule::new(kind, pattern)?);
        }

        // The whole remainder of the line is the contact string; it may be
        // empty, which is still different from no contact item at all.
        let contact = Self::find(items, "contact").map(|item| item.args_as_str().to_string());

        Ok(ServerDesc {
            nickname,
            ipv4addr,
            orport,
            dirport,
            fingerprint,
            platform,
            published,
            uptime,
            bandwidth,
            exit_policy,
            contact,
        })
    }
}

/// Parse a stream of concatenated server descriptors, as served at
/// `/tor/server/all`.
///
/// Descriptors that fail to parse are skipped with a warning rather than
/// failing the batch: the tool runs over whatever usable subset of the
/// network it managed to fetch, and one relay publishing garbage should
/// not abort an entire run.
pub fn parse_all(s: &str) -> Vec<ServerDesc> {
    let mut parsed = Vec::new();
    let mut skipped = 0_usize;
    for chunk in split_descriptors(s) {
        match ServerDesc::parse(chunk) {
            Ok(desc) => parsed.push(desc),
            Err(e) => {
                skipped += 1;
                warn!("Skipping unparseable descriptor: {}", e);
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} unparseable descriptors.", skipped);
    }
    parsed
}

/// Split a descriptor stream into per-descriptor chunks.
///
/// Each descriptor begins with a `router` item at the start of a line.
/// Base64 object bodies cannot contain a space, and begin/end tags start
/// with a dash, so this boundary test cannot fire inside an object.
/// Anything before the first `router` line (annotations, stray headers)
/// is dropped.
fn split_descriptors(s: &str) -> Vec<&str> {
    /// The item keyword that opens every server descriptor.
    const BOUNDARY: &str = "router ";

    let mut starts = Vec::new();
    if s.starts_with(BOUNDARY) {
        starts.push(0);
    }
    starts.extend(s.match_indices(&format!("\n{}", BOUNDARY)).map(|(i, _)| i + 1));

    let mut chunks = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(s.len());
        chunks.push(&s[start..end]);
    }
    chunks
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use super::*;

    /// A server descriptor with the keys and signatures shortened; the
    /// fields this crate parses are realistic.
    const TESTDESC: &str = "\
router ferrum 185.220.101.34 9001 0 9030
identity-ed25519
-----BEGIN ED25519 CERT-----
AQQABt3PAXNlbGYtc2lnbmVk
-----END ED25519 CERT-----
platform Tor 0.4.8.12 on Linux
proto Cons=1-2 Desc=1-2 DirCache=2 FlowCtrl=1-2
published 2026-07-30 11:52:07
fingerprint 9695 DFC3 5FFE B861 329B 9F1A B04C 4639 7020 CE31
uptime 2451980
bandwidth 10485760 20971520 14680064
onion-key
-----BEGIN RSA PUBLIC KEY-----
MIGJAoGBAMYkU6Im
-----END RSA PUBLIC KEY-----
signing-key
-----BEGIN RSA PUBLIC KEY-----
MIGJAoGBAL1ecOQQ
-----END RSA PUBLIC KEY-----
hidden-service-dir
contact abuse@ferrum.example <tor at example dot net>
ntor-onion-key i3yoiCEz1H1wc1w5AXyAgNhZoltkcQhKao0l6MGpaUM=
reject 0.0.0.0/8:*
reject 169.254.0.0/16:*
accept *:80
accept *:443
reject *:*
router-signature
-----BEGIN SIGNATURE-----
Yh9sQsLcQR7N5nCn
-----END SIGNATURE-----
";

    #[test]
    fn parse_one() {
        let desc = ServerDesc::parse(TESTDESC).unwrap();
        assert_eq!(desc.nickname().as_str(), "ferrum");
        assert_eq!(desc.addr(), "185.220.101.34".parse::<Ipv4Addr>().unwrap());
        assert_eq!(desc.or_port(), 9001);
        assert_eq!(desc.dir_port(), Some(9030));
        assert_eq!(
            desc.fingerprint().to_string(),
            "9695DFC35FFEB861329B9F1AB04C46397020CE31"
        );
        assert_eq!(desc.platform().unwrap().version_str(), "0.4.8.12");
        assert_eq!(desc.platform().unwrap().os_str(), "Linux");
        assert_eq!(desc.published().to_string(), "2026-07-30 11:52:07");
        assert_eq!(desc.uptime(), Some(2451980));
        assert_eq!(desc.bandwidth().average, 10485760);
        assert_eq!(desc.bandwidth().burst, 20971520);
        assert_eq!(desc.bandwidth().observed, 14680064);
        assert_eq!(desc.exit_policy().len(), 5);
        assert_eq!(
            desc.contact(),
            Some("abuse@ferrum.example <tor at example dot net>")
        );
    }

    #[test]
    fn dirport_zero_is_none() {
        let doc = TESTDESC.replace(
            "router ferrum 185.220.101.34 9001 0 9030",
            "router ferrum 185.220.101.34 9001 0 0",
        );
        let desc = ServerDesc::parse(&doc).unwrap();
        assert_eq!(desc.dir_port(), None);
    }

    #[test]
    fn optional_items_absent() {
        let doc: String = TESTDESC
            .lines()
            .filter(|l| {
                !l.starts_with("platform ")
                    && !l.starts_with("uptime ")
                    && !l.starts_with("contact ")
            })
            .map(|l| format!("{}\n", l))
            .collect();
        let desc = ServerDesc::parse(&doc).unwrap();
        assert!(desc.platform().is_none());
        assert_eq!(desc.uptime(), None);
        assert_eq!(desc.contact(), None);
    }

    #[test]
    fn missing_required_item() {
        let doc: String = TESTDESC
            .lines()
            .filter(|l| !l.starts_with("published "))
            .map(|l| format!("{}\n", l))
            .collect();
        assert!(matches!(
            ServerDesc::parse(&doc),
            Err(Error::MissingItem("published"))
        ));
    }

    #[test]
    fn annotations_are_ignored() {
        let doc = format!("@type server-descriptor 1.0\n{}", TESTDESC);
        // Only the whole-stream parser skips the annotation prefix.
        let descs = parse_all(&doc);
        assert_eq!(descs.len(), 1);
        assert_eq!(descs[0].nickname().as_str(), "ferrum");
    }

    #[test]
    fn parse_all_splits_and_skips() {
        let second = TESTDESC
            .replace("router ferrum", "router cuprum")
            .replace("9695 DFC3", "1111 DFC3");
        // A descriptor with a corrupt fingerprint parses to an error and
        // is dropped without taking its neighbours with it.
        let corrupt = TESTDESC.replace("9695 DFC3", "WXYZ DFC3");
        let stream = format!("{}{}{}", TESTDESC, corrupt, second);

        let descs = parse_all(&stream);
        assert_eq!(descs.len(), 2);
        assert_eq!(descs[0].nickname().as_str(), "ferrum");
        assert_eq!(descs[1].nickname().as_str(), "cuprum");
    }

    #[test]
    fn parse_all_on_empty_input() {
        assert!(parse_all("").is_empty());
        assert!(parse_all("@type server-descriptor 1.0\n").is_empty());
    }
}
