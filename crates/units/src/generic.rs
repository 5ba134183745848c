use crate::error::Result;
use crate::language::{Language, LanguageAnalyzer};
use crate::relations::generic_relations;
use crate::types::{RelationMap, UnitKind, UnitMatch};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

const MODIFIERS: &str = r"(?:(?:public|private|protected|internal|abstract|final|static|sealed|partial|open|data|readonly|export)\s+)*";

const NAMESPACE_PATTERN: &str = r"(?m)^[ \t]*(?:namespace|package)\s+([\w\\.]+)";
const IMPORT_PATTERN: &str = r"(?m)^(?:use|import|using)\s+[\w\\.]";
const FUNCTION_PATTERN: &str = r"(?m)^([ \t]*)(?:(?:public|private|protected|internal|static|abstract|final|override|open|suspend|async)\s+)*(?:function|fun|def|func)\s+&?(\w+)";
const TYPED_METHOD_PATTERN: &str = r"(?m)^([ \t]+)(?:(?:public|private|protected|internal|static|final|abstract|synchronized|override|virtual|async)\s+)+[\w<>\[\],.? ]+?\s+(\w+)\s*\([^;]*$";

static STRUCTURAL_PATTERNS: Lazy<Vec<String>> = Lazy::new(|| {
    vec![
        NAMESPACE_PATTERN.to_string(),
        IMPORT_PATTERN.to_string(),
        format!(r"(?m)^[ \t]*{MODIFIERS}class\s+(\w+)"),
        format!(r"(?m)^[ \t]*{MODIFIERS}interface\s+(\w+)"),
        format!(r"(?m)^[ \t]*{MODIFIERS}trait\s+(\w+)"),
        format!(r"(?m)^[ \t]*{MODIFIERS}enum\s+(?:class\s+)?(\w+)"),
        FUNCTION_PATTERN.to_string(),
        TYPED_METHOD_PATTERN.to_string(),
    ]
});

static PATTERN_REFS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    STRUCTURAL_PATTERNS
        .iter()
        .map(String::as_str)
        .collect()
});

struct TypePattern {
    regex: Regex,
    kind: UnitKind,
}

static NAMESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(NAMESPACE_PATTERN).expect("valid regex"));
static IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(IMPORT_PATTERN).expect("valid regex"));
static FUNCTION: Lazy<Regex> = Lazy::new(|| Regex::new(FUNCTION_PATTERN).expect("valid regex"));
static TYPED_METHOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(TYPED_METHOD_PATTERN).expect("valid regex"));
static TYPES: Lazy<Vec<TypePattern>> = Lazy::new(|| {
    [
        (2, UnitKind::Class),
        (3, UnitKind::Interface),
        (4, UnitKind::Trait),
        (5, UnitKind::Enum),
    ]
    .into_iter()
    .map(|(idx, kind)| TypePattern {
        regex: Regex::new(&STRUCTURAL_PATTERNS[idx]).expect("valid regex"),
        kind,
    })
    .collect()
});

/// Line-anchored regex analyzer for languages without a bundled grammar
pub struct GenericAnalyzer;

impl GenericAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenericAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for GenericAnalyzer {
    fn language(&self) -> Language {
        Language::Generic
    }

    fn structural_patterns(&self) -> &'static [&'static str] {
        PATTERN_REFS.as_slice()
    }

    fn identify_units(&self, _path: &Path, content: &str) -> Result<Vec<UnitMatch>> {
        // Earlier patterns win when two report the same offset
        let mut by_offset: BTreeMap<usize, UnitMatch> = BTreeMap::new();

        for caps in NAMESPACE.captures_iter(content) {
            if let Some(whole) = caps.get(0) {
                by_offset
                    .entry(whole.start())
                    .or_insert_with(|| UnitMatch::new(whole.start(), UnitKind::Module, Some(caps[1].to_string())));
            }
        }

        for found in IMPORT.find_iter(content) {
            by_offset
                .entry(found.start())
                .or_insert_with(|| UnitMatch::new(found.start(), UnitKind::Import, None));
        }

        for pattern in TYPES.iter() {
            for caps in pattern.regex.captures_iter(content) {
                if let Some(whole) = caps.get(0) {
                    by_offset.entry(whole.start()).or_insert_with(|| {
                        UnitMatch::new(whole.start(), pattern.kind, Some(caps[1].to_string()))
                    });
                }
            }
        }

        for regex in [&*FUNCTION, &*TYPED_METHOD] {
            for caps in regex.captures_iter(content) {
                if let Some(whole) = caps.get(0) {
                    let kind = if caps[1].is_empty() {
                        UnitKind::Function
                    } else {
                        UnitKind::Method
                    };
                    by_offset.entry(whole.start()).or_insert_with(|| {
                        UnitMatch::new(whole.start(), kind, Some(caps[2].to_string()))
                    });
                }
            }
        }

        // Methods belong to the nearest preceding type declaration
        let mut current_type: Option<String> = None;
        let matches = by_offset
            .into_values()
            .map(|unit| match unit.kind {
                UnitKind::Class | UnitKind::Interface | UnitKind::Trait | UnitKind::Enum => {
                    current_type.clone_from(&unit.name);
                    unit
                }
                UnitKind::Method => {
                    let scope = current_type.clone();
                    unit.with_scope(scope)
                }
                _ => unit,
            })
            .collect();

        Ok(matches)
    }

    fn extract_dependencies(&self, content: &str) -> RelationMap {
        generic_relations(content)
    }
}
