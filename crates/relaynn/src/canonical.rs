//! Canonical string renderings of server descriptors.
//!
//! Two renderings exist and they are not interchangeable:
//!
//! * [`canonical_repr`] is the comparison form: a fixed-order,
//!   delimiter-free concatenation of the comparable fields. Every edit
//!   distance this tool computes is over this string and only this
//!   string.
//! * [`display_fields`] is the presentation form: the per-column cell
//!   values the table renderer shows. It includes the fingerprint (which
//!   must never influence distance: identity is not configuration) and
//!   omits the exit policy and publication time, which are too wide to
//!   print usefully.

use relaynn_netdoc::ServerDesc;

/// Render `desc` as the canonical string used for distance computation.
///
/// Deterministic: equal descriptors always produce equal strings. Absent
/// dir-port and uptime render as `0`; an absent platform contributes
/// empty version and OS segments; an absent contact contributes nothing.
/// Numbers are base-10 with no padding, which means numerically adjacent
/// values ("9", "10") share no textual closeness; that approximation is
/// part of the contract, inherited from the metric being purely textual.
pub(crate) fn canonical_repr(desc: &ServerDesc) -> String {
    let version = desc.platform().map_or("", |p| p.version_str());
    let os = desc.platform().map_or("", |p| p.os_str());
    format!(
        "{}{}{}{}{}{}{}{}{}{}{}{}{}",
        desc.nickname(),
        desc.addr(),
        desc.or_port(),
        desc.dir_port().unwrap_or(0),
        version,
        desc.exit_policy(),
        desc.bandwidth().average,
        desc.bandwidth().burst,
        desc.bandwidth().observed,
        os,
        desc.published(),
        desc.uptime().unwrap_or(0),
        desc.contact().unwrap_or(""),
    )
}

/// Render `desc` as the list of cells shown in one table row.
///
/// The order matches [`crate::table::HEADER`], minus the leading
/// distance column.
pub(crate) fn display_fields(desc: &ServerDesc) -> Vec<String> {
    let mut fingerprint = desc.fingerprint().to_string();
    fingerprint.truncate(8);
    let version = desc.platform().map_or("", |p| p.version_str());
    let os = desc.platform().map_or("", |p| p.os_str());
    vec![
        fingerprint,
        desc.nickname().to_string(),
        desc.addr().to_string(),
        desc.or_port().to_string(),
        desc.dir_port().unwrap_or(0).to_string(),
        version.to_string(),
        os.to_string(),
        desc.bandwidth().average.to_string(),
        desc.bandwidth().burst.to_string(),
        desc.bandwidth().observed.to_string(),
        desc.uptime().unwrap_or(0).to_string(),
        desc.contact().unwrap_or("").to_string(),
    ]
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_fixtures::{parse_fixture, FIXTURE};

    #[test]
    fn exact_canonical_string() {
        let desc = parse_fixture(FIXTURE);
        let expected = concat!(
            "ferrum",
            "185.220.101.34",
            "9001",
            "9030",
            "0.4.8.12",
            "reject 0.0.0.0/8:*, accept *:80, accept *:443, reject *:*",
            "10485760",
            "20971520",
            "14680064",
            "Linux",
            "2026-07-30 11:52:07",
            "2451980",
            "tor-operator@example.net",
        );
        assert_eq!(canonical_repr(&desc), expected);
    }

    #[test]
    fn canonical_is_deterministic() {
        let desc = parse_fixture(FIXTURE);
        assert_eq!(canonical_repr(&desc), canonical_repr(&desc));
        assert_eq!(canonical_repr(&desc), canonical_repr(&desc.clone()));
    }

    #[test]
    fn absent_dirport_renders_as_zero() {
        let doc = FIXTURE.replace(
            "router ferrum 185.220.101.34 9001 0 9030",
            "router ferrum 185.220.101.34 9001 0 0",
        );
        let desc = parse_fixture(&doc);
        assert_eq!(desc.dir_port(), None);
        assert!(canonical_repr(&desc).contains("90010"));
        assert_eq!(display_fields(&desc)[4], "0");
    }

    #[test]
    fn absent_optionals_render_empty_or_zero() {
        let doc: String = FIXTURE
            .lines()
            .filter(|l| {
                !l.starts_with("platform ")
                    && !l.starts_with("uptime ")
                    && !l.starts_with("contact ")
            })
            .map(|l| format!("{}\n", l))
            .collect();
        let desc = parse_fixture(&doc);
        let repr = canonical_repr(&desc);
        assert!(repr.ends_with("2026-07-30 11:52:070"));
        let fields = display_fields(&desc);
        assert_eq!(fields[5], "");
        assert_eq!(fields[6], "");
        assert_eq!(fields[11], "");
    }

    #[test]
    fn display_fields_truncate_fingerprint() {
        let fields = display_fields(&parse_fixture(FIXTURE));
        assert_eq!(fields[0], "9695DFC3");
        assert_eq!(fields.len(), crate::table::HEADER.len() - 1);
    }
}
