//! Types used to represent the fields of a server descriptor.
//!
//! Each type knows how to parse itself from the string form used in
//! directory documents, and renders itself back in the same form via
//! `Display`. The `Display` forms matter: the canonical relay string that
//! `relaynn` feeds to the edit-distance computation is assembled from them.

pub use fingerprint::Fingerprint;
pub use nickname::Nickname;
pub use platform::RelayPlatform;
pub use policy::{AddrPolicy, PolicyError, PolicyRule, RuleKind};
pub use timeimpl::Iso8601TimeSp;

/// A type for relay nicknames.
mod nickname {
    use crate::{Error, Result};

    /// This is a strange limit, but it comes from Tor.
    const MAX_NICKNAME_LEN: usize = 19;

    /// The nickname of a Tor relay.
    ///
    /// Nicknames are a legacy mechanism that's occasionally useful in
    /// debugging. They should *never* be used to uniquely identify relays;
    /// nothing prevents two relays from having the same nickname.
    ///
    /// Nicknames are required to be ASCII, alphanumeric, and between 1 and
    /// 19 characters inclusive.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Nickname(String);

    impl Nickname {
        /// Return a view of this nickname as a string slice.
        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl std::fmt::Display for Nickname {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            self.as_str().fmt(f)
        }
    }

    impl std::str::FromStr for Nickname {
        type Err = Error;

        fn from_str(s: &str) -> Result<Self> {
            if (1..=MAX_NICKNAME_LEN).contains(&s.len())
                && s.chars().all(|c| c.is_ascii_alphanumeric())
            {
                Ok(Nickname(s.to_string()))
            } else {
                Err(Error::BadNickname)
            }
        }
    }
}

/// A type for relay identity fingerprints.
mod fingerprint {
    use crate::{Error, Result};

    /// The RSA identity fingerprint of a relay: 20 bytes, written as 40
    /// hexadecimal digits.
    ///
    /// Descriptors render it in space-separated groups of four digits
    /// (`fingerprint 9695 DFC3 ...`); both that form and the compact form
    /// are accepted.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Fingerprint([u8; 20]);

    impl Fingerprint {
        /// Return the raw bytes of this fingerprint.
        pub fn as_bytes(&self) -> &[u8; 20] {
            &self.0
        }
    }

    impl std::fmt::Display for Fingerprint {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", hex::encode_upper(self.0))
        }
    }

    impl std::str::FromStr for Fingerprint {
        type Err = Error;

        fn from_str(s: &str) -> Result<Self> {
            let compact: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            let mut bytes = [0_u8; 20];
            hex::decode_to_slice(&compact, &mut bytes).map_err(|_| Error::BadFingerprint)?;
            Ok(Fingerprint(bytes))
        }
    }
}

/// Types for decoding times and dates.
mod timeimpl {
    use std::time::SystemTime;
    use time::{
        format_description::FormatItem, macros::format_description, OffsetDateTime,
        PrimitiveDateTime,
    };

    use crate::{Error, Result};

    /// A wall-clock time, encoded in Iso8601 format with an intervening
    /// space between the date and time.
    ///
    /// (Example: "2020-10-09 17:38:12")
    #[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
    pub struct Iso8601TimeSp(SystemTime);

    /// Formatting object for parsing the space-separated Iso8601 format.
    const ISO_8601SP_FMT: &[FormatItem] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    impl std::str::FromStr for Iso8601TimeSp {
        type Err = Error;
        fn from_str(s: &str) -> Result<Iso8601TimeSp> {
            let d = PrimitiveDateTime::parse(s, &ISO_8601SP_FMT)
                .map_err(|e| Error::BadTimestamp(e.to_string()))?;
            Ok(Iso8601TimeSp(d.assume_utc().into()))
        }
    }

    impl std::fmt::Display for Iso8601TimeSp {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let formatted = OffsetDateTime::from(self.0)
                .format(ISO_8601SP_FMT)
                .map_err(|_| std::fmt::Error)?;
            write!(f, "{}", formatted)
        }
    }

    impl From<Iso8601TimeSp> for SystemTime {
        fn from(t: Iso8601TimeSp) -> SystemTime {
            t.0
        }
    }
}

/// A type for the contents of a `platform` item.
mod platform {
    use crate::{Error, Result};

    /// Description of the software a relay is running.
    #[derive(Debug, Clone, PartialEq, Eq)]
    #[non_exhaustive]
    pub enum RelayPlatform {
        /// Software advertised to be some version of Tor, on some platform.
        Tor(String, String),
        /// Software not advertised to be Tor.
        Other(String),
    }

    impl RelayPlatform {
        /// Return the advertised Tor version, or "" if the software does
        /// not claim to be Tor.
        pub fn version_str(&self) -> &str {
            match self {
                RelayPlatform::Tor(version, _) => version.as_str(),
                RelayPlatform::Other(_) => "",
            }
        }

        /// Return the advertised operating system.
        ///
        /// For non-Tor software the whole platform string stands in for
        /// the operating system, which is all the descriptor tells us.
        pub fn os_str(&self) -> &str {
            match self {
                RelayPlatform::Tor(_, os) => os.as_str(),
                RelayPlatform::Other(platform) => platform.as_str(),
            }
        }
    }

    impl std::str::FromStr for RelayPlatform {
        type Err = Error;
        fn from_str(args: &str) -> Result<Self> {
            if args.starts_with("Tor ") {
                let v: Vec<_> = args.splitn(4, ' ').collect();
                match &v[..] {
                    ["Tor", ver, "on", p] => {
                        Ok(RelayPlatform::Tor((*ver).to_string(), (*p).to_string()))
                    }
                    ["Tor", ver, ..] => Ok(RelayPlatform::Tor((*ver).to_string(), String::new())),
                    _ => Ok(RelayPlatform::Other(args.to_string())),
                }
            } else {
                Ok(RelayPlatform::Other(args.to_string()))
            }
        }
    }
}

/// Implement address-based exit policies.
mod policy {
    use thiserror::Error;

    /// An error from an unparsable policy rule.
    #[derive(Debug, Clone, Error, PartialEq, Eq)]
    #[non_exhaustive]
    pub enum PolicyError {
        /// A rule had a keyword other than accept or reject.
        #[error("invalid policy rule keyword")]
        InvalidKeyword,
        /// A rule's pattern was not in `addr:port` form.
        #[error("invalid policy pattern")]
        InvalidPattern,
    }

    /// What a policy rule does with the addresses it matches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[non_exhaustive]
    pub enum RuleKind {
        /// Matching connections are permitted.
        Accept,
        /// Matching connections are refused.
        Reject,
    }

    impl RuleKind {
        /// Return the keyword for this kind, as it appears in descriptors.
        fn keyword(self) -> &'static str {
            match self {
                RuleKind::Accept => "accept",
                RuleKind::Reject => "reject",
            }
        }
    }

    /// A single rule in an exit policy: a disposition plus an
    /// address-and-port pattern such as `*:80` or `18.0.0.0/8:*`.
    ///
    /// The pattern is kept in its string form: relaynn compares policies
    /// textually, and never asks whether a given address would match.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PolicyRule {
        /// Whether matching connections are accepted or rejected.
        kind: RuleKind,
        /// The `addr:port` pattern this rule applies to.
        pattern: String,
    }

    impl PolicyRule {
        /// Construct a rule from a disposition and a pattern.
        pub fn new(kind: RuleKind, pattern: &str) -> Result<Self, PolicyError> {
            if pattern.is_empty() || !pattern.contains(':') || pattern.contains(char::is_whitespace)
            {
                return Err(PolicyError::InvalidPattern);
            }
            Ok(PolicyRule {
                kind,
                pattern: pattern.to_string(),
            })
        }

        /// Return whether this rule accepts or rejects.
        pub fn kind(&self) -> RuleKind {
            self.kind
        }
    }

    impl std::fmt::Display for PolicyRule {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{} {}", self.kind.keyword(), self.pattern)
        }
    }

    impl std::str::FromStr for PolicyRule {
        type Err = PolicyError;
        fn from_str(s: &str) -> Result<Self, PolicyError> {
            let (kwd, pattern) = s.split_once(' ').ok_or(PolicyError::InvalidPattern)?;
            let kind = match kwd {
                "accept" => RuleKind::Accept,
                "reject" => RuleKind::Reject,
                _ => return Err(PolicyError::InvalidKeyword),
            };
            PolicyRule::new(kind, pattern)
        }
    }

    /// A relay's exit policy: an ordered list of rules, matched first to
    /// last.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct AddrPolicy {
        /// The rules, in the order they appeared in the descriptor.
        rules: Vec<PolicyRule>,
    }

    impl AddrPolicy {
        /// Return a new, empty AddrPolicy.
        pub fn new() -> Self {
            AddrPolicy::default()
        }

        /// Add a rule to the end of this policy.
        pub fn push(&mut self, rule: PolicyRule) {
            self.rules.push(rule);
        }

        /// Return the number of rules in this policy.
        pub fn len(&self) -> usize {
            self.rules.len()
        }

        /// Return true if this policy has no rules.
        pub fn is_empty(&self) -> bool {
            self.rules.is_empty()
        }
    }

    impl std::fmt::Display for AddrPolicy {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let mut comma = "";
            for rule in &self.rules {
                write!(f, "{}{}", comma, rule)?;
                comma = ", ";
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn nickname() {
        let nick: Nickname = "Unnamed9".parse().unwrap();
        assert_eq!(nick.as_str(), "Unnamed9");
        assert_eq!(nick.to_string(), "Unnamed9");

        assert!("".parse::<Nickname>().is_err());
        assert!("twentycharactersxxxx".parse::<Nickname>().is_err());
        assert!("under_score".parse::<Nickname>().is_err());
        assert!("non ascii".parse::<Nickname>().is_err());
    }

    #[test]
    fn fingerprint() {
        let compact = "9695DFC35FFEB861329B9F1AB04C46397020CE31";
        let spaced = "9695 DFC3 5FFE B861 329B 9F1A B04C 4639 7020 CE31";
        let fp1: Fingerprint = compact.parse().unwrap();
        let fp2: Fingerprint = spaced.parse().unwrap();
        assert_eq!(fp1, fp2);
        assert_eq!(fp1.to_string(), compact);

        assert!("9695DFC3".parse::<Fingerprint>().is_err());
        assert!("X695DFC35FFEB861329B9F1AB04C46397020CE31"
            .parse::<Fingerprint>()
            .is_err());
    }

    #[test]
    fn fingerprint_ordering_is_hex_ordering() {
        let a: Fingerprint = "0000000000000000000000000000000000000001".parse().unwrap();
        let b: Fingerprint = "00000000000000000000000000000000000000FF".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn iso_time_roundtrip() {
        let t: Iso8601TimeSp = "2020-09-29 13:36:33".parse().unwrap();
        assert_eq!(t.to_string(), "2020-09-29 13:36:33");

        assert!("2020-09-29T13:36:33".parse::<Iso8601TimeSp>().is_err());
        assert!("2020-09-29".parse::<Iso8601TimeSp>().is_err());
    }

    #[test]
    fn platform() {
        let p: RelayPlatform = "Tor 0.4.8.12 on Linux".parse().unwrap();
        assert_eq!(p, RelayPlatform::Tor("0.4.8.12".into(), "Linux".into()));
        assert_eq!(p.version_str(), "0.4.8.12");
        assert_eq!(p.os_str(), "Linux");

        let p: RelayPlatform = "Tor 0.4.8.12".parse().unwrap();
        assert_eq!(p.version_str(), "0.4.8.12");
        assert_eq!(p.os_str(), "");

        let p: RelayPlatform = "nonstandard relay".parse().unwrap();
        assert_eq!(p.version_str(), "");
        assert_eq!(p.os_str(), "nonstandard relay");
    }

    #[test]
    fn policy_display() {
        let mut policy = AddrPolicy::new();
        policy.push(PolicyRule::new(RuleKind::Accept, "*:80").unwrap());
        policy.push(PolicyRule::new(RuleKind::Accept, "*:443").unwrap());
        policy.push(PolicyRule::new(RuleKind::Reject, "*:*").unwrap());
        assert_eq!(policy.len(), 3);
        assert_eq!(policy.to_string(), "accept *:80, accept *:443, reject *:*");

        assert_eq!(AddrPolicy::new().to_string(), "");
    }

    #[test]
    fn policy_parsing() {
        let rule: PolicyRule = "accept 18.0.0.0/8:80".parse().unwrap();
        assert_eq!(rule.kind(), RuleKind::Accept);
        assert_eq!(rule.to_string(), "accept 18.0.0.0/8:80");

        assert_eq!(
            "allow *:80".parse::<PolicyRule>(),
            Err(PolicyError::InvalidKeyword)
        );
        assert_eq!(
            "accept noport".parse::<PolicyRule>(),
            Err(PolicyError::InvalidPattern)
        );
        assert_eq!("accept".parse::<PolicyRule>(), Err(PolicyError::InvalidPattern));
    }
}
