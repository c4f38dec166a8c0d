//! Render the ranking as a table on standard output.

use std::collections::HashMap;

use crossterm::style::Stylize;
use itertools::{EitherOrBoth, Itertools};

use relaynn_netdoc::types::Fingerprint;
use relaynn_netdoc::ServerDesc;

use crate::canonical::display_fields;

/// The column names, in output order.
pub(crate) const HEADER: [&str; 13] = [
    "distance",
    "fingerprint",
    "nickname",
    "addr",
    "orport",
    "dirport",
    "version",
    "os",
    "avgbw",
    "burstbw",
    "obsbw",
    "uptime",
    "contact",
];

/// A table cell: the text used for layout, and the (possibly colourised)
/// text actually emitted. The two differ only by ANSI escapes, which must
/// not count toward column widths.
struct Cell {
    /// The cell's text without any styling.
    plain: String,
    /// The cell's text as emitted.
    painted: String,
}

impl Cell {
    /// Make a cell with no styling at all.
    fn verbatim(s: &str) -> Self {
        Cell {
            plain: s.to_string(),
            painted: s.to_string(),
        }
    }
}

/// Render at most `num_results` rows of `ranking` as an aligned table.
///
/// Every candidate field is compared character-by-character against the
/// reference relay's same field; when `use_colour` is set, characters
/// that agree position-for-position are shown in red. A candidate field
/// shorter than the reference's is padded with spaces to the reference
/// length, which keeps the character alignment honest between rows.
pub(crate) fn render(
    ranking: &[(Fingerprint, usize)],
    descs: &HashMap<Fingerprint, ServerDesc>,
    reference: &ServerDesc,
    num_results: usize,
    use_colour: bool,
) -> String {
    let reference_fields = display_fields(reference);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    rows.push(HEADER.iter().map(|h| Cell::verbatim(h)).collect());

    for (fingerprint, dist) in ranking.iter().take(num_results) {
        let Some(desc) = descs.get(fingerprint) else {
            continue;
        };
        let mut row = vec![Cell::verbatim(&format!("{:3}", dist))];
        for (field, reference_field) in display_fields(desc).iter().zip(&reference_fields) {
            row.push(field_cell(field, reference_field, use_colour));
        }
        rows.push(row);
    }

    let mut widths = vec![0_usize; HEADER.len()];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.plain.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            line.push_str(&cell.painted);
            let pad = widths[i] - cell.plain.chars().count() + 2;
            line.extend(std::iter::repeat(' ').take(pad));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Build the cell for one candidate field, aligned against the
/// reference's same field.
fn field_cell(field: &str, reference_field: &str, use_colour: bool) -> Cell {
    let mut plain = String::new();
    let mut painted = String::new();
    for pair in field.chars().zip_longest(reference_field.chars()) {
        let (ch, matches) = match pair {
            EitherOrBoth::Both(c, r) => (c, c == r),
            EitherOrBoth::Left(c) => (c, false),
            EitherOrBoth::Right(_) => (' ', false),
        };
        plain.push(ch);
        if matches && use_colour {
            painted.push_str(&ch.red().to_string());
        } else {
            painted.push(ch);
        }
    }
    Cell { plain, painted }
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_fixtures::fixture_with;

    /// A two-candidate ranking plus its descriptor map.
    fn setup() -> (
        Vec<(Fingerprint, usize)>,
        HashMap<Fingerprint, ServerDesc>,
        Fingerprint,
    ) {
        let a = fixture_with("aaaaaa", "AA01");
        let b = fixture_with("aaabbb", "BB02");
        let reference = *a.fingerprint();
        let ranking = vec![(*a.fingerprint(), 0), (*b.fingerprint(), 3)];
        let descs: HashMap<_, _> = [a, b].into_iter().map(|d| (*d.fingerprint(), d)).collect();
        (ranking, descs, reference)
    }

    #[test]
    fn zero_results_prints_only_the_header() {
        let (ranking, descs, reference) = setup();
        let table = render(&ranking, &descs, &descs[&reference], 0, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("distance"));
        assert!(lines[0].ends_with("contact"));
    }

    #[test]
    fn oversized_top_prints_every_candidate_once() {
        let (ranking, descs, reference) = setup();
        let table = render(&ranking, &descs, &descs[&reference], 100, false);
        assert_eq!(table.lines().count(), 1 + ranking.len());
        assert_eq!(table.matches("aaaaaa").count(), 1);
        assert_eq!(table.matches("aaabbb").count(), 1);
    }

    #[test]
    fn top_limits_rows() {
        let (ranking, descs, reference) = setup();
        let table = render(&ranking, &descs, &descs[&reference], 1, false);
        assert_eq!(table.lines().count(), 2);
        assert!(table.contains("aaaaaa"));
        assert!(!table.contains("aaabbb"));
    }

    #[test]
    fn distance_column_is_width_padded() {
        let (ranking, descs, reference) = setup();
        let table = render(&ranking, &descs, &descs[&reference], 100, false);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[1].starts_with("  0"));
        assert!(lines[2].starts_with("  3"));
    }

    #[test]
    fn columns_align_on_the_widest_cell() {
        let (ranking, descs, reference) = setup();
        let table = render(&ranking, &descs, &descs[&reference], 100, false);
        let lines: Vec<&str> = table.lines().collect();
        let header_nickname = lines[0].find("nickname").unwrap();
        let row_nickname = lines[1].find("aaaaaa").unwrap();
        assert_eq!(header_nickname, row_nickname);
    }

    #[test]
    fn plain_mode_has_no_escapes() {
        let (ranking, descs, reference) = setup();
        let table = render(&ranking, &descs, &descs[&reference], 100, false);
        assert!(!table.contains('\u{1b}'));
    }

    #[test]
    fn colour_mode_marks_matching_positions() {
        let (ranking, descs, reference) = setup();
        let table = render(&ranking, &descs, &descs[&reference], 100, true);
        // The reference row matches itself everywhere, so at minimum it
        // must carry styling; the header never does.
        assert!(table.contains('\u{1b}'));
        assert!(!table.lines().next().unwrap().contains('\u{1b}'));
    }

    #[test]
    fn matching_prefix_is_painted_and_tail_is_not() {
        let cell = field_cell("aaabbb", "aaaaaa", true);
        assert_eq!(cell.plain, "aaabbb");
        let painted_a = 'a'.red().to_string();
        assert!(cell.painted.starts_with(&painted_a.repeat(3)));
        assert!(cell.painted.ends_with("bbb"));
    }

    #[test]
    fn shorter_field_pads_to_reference_length() {
        let cell = field_cell("ab", "abcd", false);
        assert_eq!(cell.plain, "ab  ");
        assert_eq!(cell.painted, "ab  ");
    }
}
