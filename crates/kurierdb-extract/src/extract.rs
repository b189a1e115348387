//! The extraction engine: applies the blueprint table to one raw document.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};

use kurierdb_core::{PriceCategory, RawDocument, Stamp};

use crate::blueprint::{Blueprints, FieldRule, SectionBlueprint, ADDRESS_SECTION};
use crate::record::{RawFields, ScrapedRecord};
use crate::report::Report;

/// Outcome of looking up one field in one section. An out-of-range candidate
/// position or a non-matching line is ordinary data here, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldOutcome {
    Found(String),
    AbsentOptional,
    AbsentRequired,
}

/// Turns raw documents into [`ScrapedRecord`]s using a compiled blueprint
/// table. Extraction is total: it always returns a complete record, plus any
/// reports about required fields that could not be located.
#[derive(Debug, Clone)]
pub struct Extractor {
    blueprints: Blueprints,
}

impl Extractor {
    #[must_use]
    pub fn new(blueprints: Blueprints) -> Self {
        Self { blueprints }
    }

    /// Scrapes one document. Never fails; missing or malformed content
    /// resolves to absent fields and, for required fields, a [`Report`].
    #[must_use]
    pub fn scrape(&self, doc: &RawDocument) -> (ScrapedRecord, Vec<Report>) {
        let html = Html::parse_document(&doc.html);
        let mut reports = Vec::new();

        let mut info = RawFields::new();
        for (name, section) in &self.blueprints.sections {
            if name == ADDRESS_SECTION {
                continue;
            }
            let lines = html
                .select(&section.selector)
                .next()
                .map(stripped_lines)
                .unwrap_or_default();
            scrape_section(section, name, &lines, &doc.stamp, &mut info, &mut reports);
        }

        let mut addresses = Vec::new();
        if let Some(section) = self.blueprints.sections.get(ADDRESS_SECTION) {
            for fragment in html.select(&section.selector) {
                let lines = stripped_lines(fragment);
                let mut fields = RawFields::new();
                scrape_section(
                    section,
                    ADDRESS_SECTION,
                    &lines,
                    &doc.stamp,
                    &mut fields,
                    &mut reports,
                );
                addresses.push(fields);
            }
        }

        let prices = self.scrape_prices(&html, &doc.stamp, &mut reports);

        let record = ScrapedRecord {
            stamp: doc.stamp.clone(),
            info,
            prices,
            addresses,
        };
        (record, reports)
    }

    /// Scrapes the price table into flat (label, amount) pairs and maps each
    /// label onto its canonical category. Unrecognized labels are reported
    /// but never abort extraction.
    fn scrape_prices(
        &self,
        html: &Html,
        stamp: &Stamp,
        reports: &mut Vec<Report>,
    ) -> BTreeMap<PriceCategory, Vec<String>> {
        let mut prices = BTreeMap::new();

        let Some(fragment) = html.select(&self.blueprints.prices.selector).next() else {
            return prices;
        };
        let cells = stripped_lines(fragment);

        for pair in cells.chunks(2) {
            let [label, amount] = pair else {
                reports.push(Report::new(
                    stamp,
                    "prices",
                    &format!("unpaired cell '{}'", pair[0]),
                    &cells,
                ));
                continue;
            };
            match self.blueprints.prices.labels.get(label.as_str()) {
                Some(category) => prices
                    .entry(*category)
                    .or_default()
                    .push(amount.clone()),
                None => {
                    tracing::debug!(stamp = %stamp, label = %label, "unrecognized price label");
                    reports.push(Report::new(
                        stamp,
                        "prices",
                        &format!("label '{label}'"),
                        &cells,
                    ));
                }
            }
        }
        prices
    }
}

fn scrape_section(
    section: &SectionBlueprint,
    name: &str,
    lines: &[String],
    stamp: &Stamp,
    out: &mut RawFields,
    reports: &mut Vec<Report>,
) {
    for rule in &section.fields {
        match scrape_field(rule, lines) {
            FieldOutcome::Found(value) => out.insert(&rule.name, value),
            FieldOutcome::AbsentOptional => {}
            FieldOutcome::AbsentRequired => {
                reports.push(Report::new(stamp, name, &rule.name, lines));
            }
        }
    }
}

/// Tries each candidate line position in order; the first position whose line
/// matches the pattern wins and the search stops.
fn scrape_field(rule: &FieldRule, lines: &[String]) -> FieldOutcome {
    for &position in &rule.positions {
        let Some(index) = resolve_position(position, lines.len()) else {
            continue;
        };
        if let Some(value) = rule
            .pattern
            .captures(&lines[index])
            .and_then(|caps| caps.get(1))
        {
            return FieldOutcome::Found(value.as_str().to_string());
        }
    }
    if rule.optional {
        FieldOutcome::AbsentOptional
    } else {
        FieldOutcome::AbsentRequired
    }
}

/// Maps a candidate position onto a line index, counting negative positions
/// from the end of the section. Out of range resolves to `None`.
fn resolve_position(position: i32, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let position = i64::from(position);
    let index = if position < 0 { len + position } else { position };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

/// The trimmed, non-empty text lines of one HTML fragment, in document order.
fn stripped_lines(fragment: ElementRef<'_>) -> Vec<String> {
    fragment
        .text()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;

    fn rule(positions: Vec<i32>, pattern: &str, optional: bool) -> FieldRule {
        FieldRule {
            name: "field".to_string(),
            positions,
            pattern: Regex::new(pattern).unwrap(),
            optional,
        }
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolve_position_from_start_and_end() {
        assert_eq!(resolve_position(0, 4), Some(0));
        assert_eq!(resolve_position(3, 4), Some(3));
        assert_eq!(resolve_position(-1, 4), Some(3));
        assert_eq!(resolve_position(-4, 4), Some(0));
    }

    #[test]
    fn resolve_position_out_of_range() {
        assert_eq!(resolve_position(4, 4), None);
        assert_eq!(resolve_position(-5, 4), None);
        assert_eq!(resolve_position(0, 0), None);
        assert_eq!(resolve_position(-1, 0), None);
    }

    #[test]
    fn first_matching_candidate_position_wins() {
        let rule = rule(vec![0, 1], r"(\d{5})", false);
        let found = scrape_field(&rule, &lines(&["no digits here", "10785 Berlin"]));
        assert_eq!(found, FieldOutcome::Found("10785".to_string()));

        let first = scrape_field(&rule, &lines(&["10965 first", "10785 second"]));
        assert_eq!(first, FieldOutcome::Found("10965".to_string()));
    }

    #[test]
    fn no_match_resolves_to_absent_not_error() {
        let optional = rule(vec![0], r"ab\s+(\d{2}:\d{2})", true);
        assert_eq!(
            scrape_field(&optional, &lines(&["nothing"])),
            FieldOutcome::AbsentOptional
        );

        let required = rule(vec![7], r"(.+)", false);
        assert_eq!(
            scrape_field(&required, &lines(&["short section"])),
            FieldOutcome::AbsentRequired
        );
    }
}
