//! The blueprint table: declarative rules describing where and how to find
//! each field inside a section of a job document.
//!
//! Blueprints are data, not code. They are loaded from YAML at startup
//! (`config/blueprints.yaml`) so that source-format drift is handled by
//! editing the file. A compiled-in copy of the same file backs
//! [`Blueprints::builtin`] for tests and as a fallback.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::Deserialize;

use kurierdb_core::PriceCategory;

use crate::error::ExtractError;

/// The section blueprints expected by the extractor.
pub(crate) const ADDRESS_SECTION: &str = "address";
const REQUIRED_SECTIONS: [&str; 4] = ["header", "client", "itinerary", ADDRESS_SECTION];

const BUILTIN_YAML: &str = include_str!("../../../config/blueprints.yaml");

// ---------------------------------------------------------------------------
// Raw YAML shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BlueprintFile {
    scope: Option<String>,
    sections: BTreeMap<String, RawSection>,
    prices: RawPrices,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    selector: String,
    fields: BTreeMap<String, RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    positions: Vec<i32>,
    pattern: String,
    #[serde(default)]
    optional: bool,
}

#[derive(Debug, Deserialize)]
struct RawPrices {
    selector: String,
    labels: BTreeMap<String, PriceCategory>,
}

// ---------------------------------------------------------------------------
// Compiled form
// ---------------------------------------------------------------------------

/// How to locate one field: candidate line positions tried in order (negative
/// counts from the end of the section), a pattern with one capture group, and
/// an optionality flag.
#[derive(Debug, Clone)]
pub(crate) struct FieldRule {
    pub(crate) name: String,
    pub(crate) positions: Vec<i32>,
    pub(crate) pattern: Regex,
    pub(crate) optional: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct SectionBlueprint {
    pub(crate) selector: Selector,
    pub(crate) fields: Vec<FieldRule>,
}

#[derive(Debug, Clone)]
pub(crate) struct PriceBlueprint {
    pub(crate) selector: Selector,
    pub(crate) labels: BTreeMap<String, PriceCategory>,
}

/// The full compiled blueprint table, grouped by section name.
#[derive(Debug, Clone)]
pub struct Blueprints {
    pub(crate) sections: BTreeMap<String, SectionBlueprint>,
    pub(crate) prices: PriceBlueprint,
}

impl Blueprints {
    /// Load and compile blueprints from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] if the file cannot be read, is not valid YAML,
    /// or contains an invalid selector, pattern, or position list.
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let content = std::fs::read_to_string(path).map_err(|e| ExtractError::BlueprintIo {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// The compiled-in copy of `config/blueprints.yaml`.
    ///
    /// # Panics
    ///
    /// Panics if the bundled file is invalid, which is caught by tests.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_yaml(BUILTIN_YAML).expect("bundled blueprints.yaml must be valid")
    }

    /// Compile blueprints from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] on parse or validation failure.
    pub fn from_yaml(content: &str) -> Result<Self, ExtractError> {
        let file: BlueprintFile = serde_yaml::from_str(content)?;
        compile(file)
    }
}

fn compile(file: BlueprintFile) -> Result<Blueprints, ExtractError> {
    let scope = file.scope.as_deref().unwrap_or("");

    for name in REQUIRED_SECTIONS {
        if !file.sections.contains_key(name) {
            return Err(ExtractError::BlueprintInvalid {
                context: format!("section '{name}'"),
                reason: "section is missing".to_string(),
            });
        }
    }

    let mut sections = BTreeMap::new();
    for (name, raw) in file.sections {
        let selector = scoped_selector(scope, &raw.selector, &name)?;
        let mut fields = Vec::with_capacity(raw.fields.len());
        for (field_name, rule) in raw.fields {
            fields.push(compile_field(&name, field_name, rule)?);
        }
        sections.insert(name, SectionBlueprint { selector, fields });
    }

    let prices = PriceBlueprint {
        selector: scoped_selector(scope, &file.prices.selector, "prices")?,
        labels: file.prices.labels,
    };

    Ok(Blueprints { sections, prices })
}

fn compile_field(section: &str, name: String, raw: RawField) -> Result<FieldRule, ExtractError> {
    let context = format!("field '{name}' in section '{section}'");

    if raw.positions.is_empty() {
        return Err(ExtractError::BlueprintInvalid {
            context,
            reason: "positions list is empty".to_string(),
        });
    }

    let pattern = Regex::new(&raw.pattern).map_err(|e| ExtractError::BlueprintInvalid {
        context: context.clone(),
        reason: e.to_string(),
    })?;
    if pattern.captures_len() < 2 {
        return Err(ExtractError::BlueprintInvalid {
            context,
            reason: "pattern has no capture group".to_string(),
        });
    }

    Ok(FieldRule {
        name,
        positions: raw.positions,
        pattern,
        optional: raw.optional,
    })
}

fn scoped_selector(scope: &str, selector: &str, context: &str) -> Result<Selector, ExtractError> {
    let full = if scope.is_empty() {
        selector.to_string()
    } else {
        format!("{scope} {selector}")
    };
    Selector::parse(&full).map_err(|e| ExtractError::BlueprintInvalid {
        context: format!("section '{context}'"),
        reason: format!("bad selector '{full}': {e}"),
    })
}
