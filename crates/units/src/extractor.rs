use crate::error::{Result, UnitsError};
use crate::language::LanguageAnalyzer;
use crate::tokens::estimate_tokens;
use crate::types::{RelationMap, SemanticUnit, UnitId, UnitKind, UnitMatch};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;

/// Cuts files into semantic units
///
/// One extractor serves one run: identifiers are unique across every file it
/// has seen, colliding keys get a `#2`, `#3`, ... suffix.
pub struct UnitExtractor<'a> {
    analyzer: &'a dyn LanguageAnalyzer,
    seen_ids: HashSet<UnitId>,
}

impl<'a> UnitExtractor<'a> {
    pub fn new(analyzer: &'a dyn LanguageAnalyzer) -> Self {
        Self {
            analyzer,
            seen_ids: HashSet::new(),
        }
    }

    /// Extract the ordered units of one file
    ///
    /// A file without structural matches becomes a single `file` unit.
    pub fn extract(
        &mut self,
        source_file: &Path,
        relative_path: &str,
        content: &str,
    ) -> Result<Vec<SemanticUnit>> {
        let mut matches = self.analyzer.identify_units(source_file, content)?;
        matches.retain(|m| m.offset < content.len());
        for unit in &mut matches {
            unit.offset = line_start(content, unit.offset);
        }
        matches.sort_by_key(|m| m.offset);
        matches.dedup_by_key(|m| m.offset);

        if matches.is_empty() {
            log::trace!("{relative_path}: no structural matches, using whole file");
            let unit = self.build_unit(
                source_file,
                relative_path,
                &UnitMatch::new(0, UnitKind::File, None),
                content,
            );
            return Ok(vec![unit]);
        }

        let mut units = Vec::with_capacity(matches.len() + 1);

        let first = matches[0].offset;
        if first > 0 && !content[..first].trim().is_empty() {
            let preamble = UnitMatch::new(0, UnitKind::Other, None);
            units.push(self.build_unit(source_file, relative_path, &preamble, &content[..first]));
        }

        for (idx, unit) in matches.iter().enumerate() {
            let end = matches
                .get(idx + 1)
                .map_or(content.len(), |next| next.offset);
            let text = content.get(unit.offset..end).ok_or_else(|| UnitsError::InvalidSpan {
                path: relative_path.to_string(),
                start: unit.offset,
                end,
            })?;
            units.push(self.build_unit(source_file, relative_path, unit, text));
        }

        log::trace!("{relative_path}: {} units", units.len());
        Ok(units)
    }

    fn build_unit(
        &mut self,
        source_file: &Path,
        relative_path: &str,
        unit: &UnitMatch,
        text: &str,
    ) -> SemanticUnit {
        let relations = if unit.kind.is_structural() {
            self.analyzer.extract_dependencies(text)
        } else {
            RelationMap::new()
        };

        let qualified = match (&unit.scope, &unit.name) {
            (Some(scope), Some(name)) => format!("{scope}::{name}"),
            (None, Some(name)) => name.clone(),
            _ => format!("#{}", content_hash(text)),
        };
        let id = self.unique_id(format!("{relative_path}::{}::{qualified}", unit.kind));

        SemanticUnit {
            id,
            source_file: source_file.to_path_buf(),
            relative_path: relative_path.to_string(),
            kind: unit.kind,
            name: unit.name.clone(),
            scope: unit.scope.clone(),
            content: text.to_string(),
            byte_offset: unit.offset,
            byte_size: text.len(),
            token_estimate: estimate_tokens(text, self.analyzer.comment_prefixes()),
            relations,
        }
    }

    fn unique_id(&mut self, base: String) -> UnitId {
        let mut candidate = UnitId::new(base.clone());
        let mut suffix = 2;
        while self.seen_ids.contains(&candidate) {
            candidate = UnitId::new(format!("{base}#{suffix}"));
            suffix += 1;
        }
        self.seen_ids.insert(candidate.clone());
        candidate
    }
}

/// Move `offset` back to its line start when only indentation precedes it
fn line_start(content: &str, offset: usize) -> usize {
    let head = &content.as_bytes()[..offset];
    let indent = head
        .iter()
        .rev()
        .take_while(|b| **b == b' ' || **b == b'\t')
        .count();
    let candidate = offset - indent;
    if candidate == 0 || head[candidate - 1] == b'\n' {
        candidate
    } else {
        offset
    }
}

/// First 12 hex digits of the SHA-256 of `text`
fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use pretty_assertions::assert_eq;

    fn extract(language: Language, path: &str, content: &str) -> Vec<SemanticUnit> {
        let analyzer = language.analyzer();
        let mut extractor = UnitExtractor::new(analyzer.as_ref());
        extractor
            .extract(Path::new(path), path, content)
            .unwrap()
    }

    #[test]
    fn test_unstructured_file_is_one_unit() {
        let content = "just notes\nnothing else\n";
        let units = extract(Language::Generic, "notes.txt", content);

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::File);
        assert_eq!(units[0].content, content);
        assert_eq!(units[0].byte_offset, 0);
        assert!(units[0].id.as_str().starts_with("notes.txt::file::#"));
    }

    #[test]
    fn test_empty_file_still_yields_a_unit() {
        let units = extract(Language::Generic, "empty.php", "");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].token_estimate, 1);
    }

    #[test]
    fn test_spans_are_adjacent_and_cover_the_file() {
        let content = "<?php\nclass Foo {\n    public function bar() {}\n}\nfunction baz() {}\n";
        let units = extract(Language::Generic, "src/Foo.php", content);

        let kinds: Vec<_> = units.iter().map(|u| u.kind).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::Other,
                UnitKind::Class,
                UnitKind::Method,
                UnitKind::Function
            ]
        );

        let rebuilt: String = units.iter().map(|u| u.content.as_str()).collect();
        assert_eq!(rebuilt, content);

        for pair in units.windows(2) {
            assert_eq!(pair[0].byte_offset + pair[0].byte_size, pair[1].byte_offset);
        }
    }

    #[test]
    fn test_identifiers() {
        let content = "class Foo {\n    function bar() {}\n}\n";
        let units = extract(Language::Generic, "src/Foo.php", content);

        assert_eq!(units[0].id.as_str(), "src/Foo.php::class::Foo");
        assert_eq!(units[1].id.as_str(), "src/Foo.php::method::Foo::bar");
        assert_eq!(units[1].qualified_name().as_deref(), Some("Foo::bar"));
    }

    #[test]
    fn test_colliding_identifiers_get_suffixes() {
        let content = "function dup() {}\nfunction dup() {}\nfunction dup() {}\n";
        let units = extract(Language::Generic, "a.php", content);

        let ids: Vec<_> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "a.php::function::dup",
                "a.php::function::dup#2",
                "a.php::function::dup#3"
            ]
        );
    }

    #[test]
    fn test_relations_only_on_structural_units() {
        let content = "use App\\Base;\nclass Foo extends Base {\n}\n";
        let units = extract(Language::Generic, "Foo.php", content);

        assert_eq!(units[0].kind, UnitKind::Import);
        assert!(units[0].relations.is_empty());
        assert_eq!(units[1].kind, UnitKind::Class);
        assert_eq!(
            units[1].relations.get(crate::types::RelationKind::Extends),
            &["Base".to_string()]
        );
    }

    #[test]
    fn test_whitespace_preamble_is_dropped() {
        let content = "\n\nclass Foo {}\n";
        let units = extract(Language::Generic, "Foo.php", content);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Class);
        assert_eq!(units[0].byte_offset, 2);
    }

    #[test]
    fn test_line_start() {
        assert_eq!(line_start("a\n    fn x", 6), 2);
        assert_eq!(line_start("let y = fn x", 8), 8);
        assert_eq!(line_start("  x", 2), 0);
    }
}
