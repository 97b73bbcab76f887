use chrono::{DateTime, Utc};

use crate::elements::error::ParseError;
use crate::elements::types::{ElementCatalog, OrbitalElementSet};

/// Every element line is exactly this wide (68 data columns + checksum).
pub const TLE_LINE_LEN: usize = 69;
/// Catalog number, line 1 columns 3-7.
pub const ID_FIELD: std::ops::Range<usize> = 2..7;
/// Catalog number, line 2 columns 3-7.
pub const LINE2_ID_FIELD: std::ops::Range<usize> = 2..7;
/// Inclination in degrees, line 2 columns 9-16.
pub const INCLINATION_FIELD: std::ops::Range<usize> = 8..16;

struct NumberedLine<'a> {
    number: usize,
    text: &'a str,
}

/// Parse two-line element records into a catalog keyed by catalog number.
///
/// Blank lines are ignored. A record may be preceded by a name line (3LE
/// layout). Any structural problem fails the whole parse with the 1-based
/// index of the offending line.
pub fn parse_elements(content: &str) -> Result<ElementCatalog, ParseError> {
    let lines: Vec<NumberedLine<'_>> = content
        .lines()
        .enumerate()
        .map(|(i, l)| NumberedLine {
            number: i + 1,
            text: l.trim_end(),
        })
        .filter(|l| !l.text.is_empty())
        .collect();

    let mut catalog = ElementCatalog::new();
    let mut i = 0;

    while i < lines.len() {
        let current = &lines[i];

        let (name, first) = if current.text.starts_with("1 ") {
            (None, current)
        } else if current.text.starts_with("2 ") {
            return Err(ParseError::Line(
                current.number,
                "line 2 without a preceding line 1".into(),
            ));
        } else {
            // 3-line layout, current line is the object name
            let next = lines.get(i + 1).ok_or_else(|| {
                ParseError::Line(current.number, "name line without element lines".into())
            })?;
            // a name line is followed by line 1; line 2 here means `current` is a damaged line 1
            if next.text.starts_with("2 ") {
                return Err(ParseError::Line(
                    current.number,
                    "malformed line 1 (expected to start with '1 ')".into(),
                ));
            }
            i += 1;
            (Some(current.text.trim().to_string()), next)
        };

        let second = lines.get(i + 1).ok_or_else(|| {
            ParseError::Line(first.number, "odd number of element lines".into())
        })?;

        let set = parse_record(name, first, second)?;
        if catalog.contains_key(&set.id) {
            return Err(ParseError::Line(
                first.number,
                format!("duplicate identifier {}", set.id),
            ));
        }
        catalog.insert(set.id.clone(), set);
        i += 2;
    }

    Ok(catalog)
}

fn parse_record(
    name: Option<String>,
    line1: &NumberedLine<'_>,
    line2: &NumberedLine<'_>,
) -> Result<OrbitalElementSet, ParseError> {
    check_line(line1, '1')?;
    check_line(line2, '2')?;

    let id = field(line1, ID_FIELD)?.trim().to_string();
    if id.is_empty() {
        return Err(ParseError::Line(line1.number, "empty catalog number".into()));
    }
    let id2 = field(line2, LINE2_ID_FIELD)?.trim();
    if id2 != id {
        return Err(ParseError::Line(
            line2.number,
            format!("catalog number {} does not match line 1 ({})", id2, id),
        ));
    }

    let inclination_deg: f64 = field(line2, INCLINATION_FIELD)?
        .trim()
        .parse()
        .map_err(|e| ParseError::Line(line2.number, format!("invalid inclination: {}", e)))?;

    let elements = sgp4::Elements::from_tle(
        name.clone(),
        line1.text.as_bytes(),
        line2.text.as_bytes(),
    )
    .map_err(|e| ParseError::Line(line1.number, format!("invalid element set: {}", e)))?;

    Ok(OrbitalElementSet {
        id,
        name,
        epoch: DateTime::<Utc>::from_naive_utc_and_offset(elements.datetime, Utc),
        inclination_deg,
        raan_deg: elements.right_ascension,
        eccentricity: elements.eccentricity,
        arg_perigee_deg: elements.argument_of_perigee,
        mean_anomaly_deg: elements.mean_anomaly,
        mean_motion_rev_per_day: elements.mean_motion,
        line1: line1.text.to_string(),
        line2: line2.text.to_string(),
        elements,
    })
}

fn check_line(line: &NumberedLine<'_>, marker: char) -> Result<(), ParseError> {
    if !line.text.is_ascii() {
        return Err(ParseError::Line(line.number, "non-ASCII characters".into()));
    }
    if line.text.len() != TLE_LINE_LEN {
        return Err(ParseError::Line(
            line.number,
            format!(
                "expected {} characters, found {}",
                TLE_LINE_LEN,
                line.text.len()
            ),
        ));
    }
    let mut chars = line.text.chars();
    if chars.next() != Some(marker) || chars.next() != Some(' ') {
        return Err(ParseError::Line(
            line.number,
            format!("expected line {}", marker),
        ));
    }
    Ok(())
}

fn field<'a>(
    line: &NumberedLine<'a>,
    range: std::ops::Range<usize>,
) -> Result<&'a str, ParseError> {
    line.text.get(range.clone()).ok_or_else(|| {
        ParseError::Line(
            line.number,
            format!("missing field at columns {}-{}", range.start + 1, range.end),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RINGS: &str = include_str!("../../tests/data/rings.tle");

    #[test]
    fn parses_pairs_into_catalog() {
        let catalog = parse_elements(RINGS).unwrap();
        let ids: Vec<_> = catalog.keys().cloned().collect();
        assert_eq!(ids, vec!["90001", "90002", "90003"]);

        let ring = &catalog["90002"];
        assert_eq!(ring.inclination_deg, 60.0);
        assert_eq!(ring.raan_deg, 45.0);
        assert!((ring.mean_motion_rev_per_day - 15.2).abs() < 1e-9);
        assert_eq!(ring.epoch.to_rfc3339(), "2024-05-08T00:00:00+00:00");
        assert_eq!(ring.display_name(), "Satellite 90002");
    }

    #[test]
    fn ignores_blank_lines_and_accepts_name_lines() {
        let mut text = String::from("\nEQUATORIAL\n");
        for line in RINGS.lines().take(2) {
            text.push_str(line);
            text.push_str("\n\n");
        }
        let catalog = parse_elements(&text).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog["90001"].name.as_deref(), Some("EQUATORIAL"));
    }

    #[test]
    fn odd_line_count_names_the_unpaired_line() {
        let text: Vec<_> = RINGS.lines().take(3).collect();
        let err = parse_elements(&text.join("\n")).unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn duplicate_identifier_is_rejected() {
        let first: Vec<_> = RINGS.lines().take(2).collect();
        let text = format!("{}\n{}\n", first.join("\n"), first.join("\n"));
        let err = parse_elements(&text).unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("duplicate identifier 90001"));
    }

    #[test]
    fn malformed_inclination_is_rejected() {
        let lines: Vec<_> = RINGS.lines().take(2).collect();
        let mut line2 = lines[1].to_string();
        line2.replace_range(INCLINATION_FIELD, "  6x.000");
        let err = parse_elements(&format!("{}\n{}", lines[0], line2)).unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("inclination"));
    }

    #[test]
    fn truncated_line_fails_on_length() {
        let lines: Vec<_> = RINGS.lines().take(2).collect();
        let err = parse_elements(&format!("{}\n{}", &lines[0][..60], lines[1])).unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert!(err.to_string().contains("expected 69 characters"));
    }

    #[test]
    fn damaged_line_one_is_reported_on_its_own_line() {
        let lines: Vec<_> = RINGS.lines().take(4).collect();
        let text = format!(" {}\n{}\n{}\n{}", lines[0], lines[1], lines[2], lines[3]);
        let err = parse_elements(&text).unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert!(err.to_string().contains("malformed line 1"));
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let lines: Vec<_> = RINGS.lines().take(2).collect();
        let mut line1 = lines[0].to_string();
        line1.replace_range(68..69, "0");
        let err = parse_elements(&format!("{}\n{}", line1, lines[1])).unwrap_err();
        assert_eq!(err.line(), Some(1));
    }
}
