use crate::error::{Result, UnitsError};
use crate::language::{Language, LanguageAnalyzer};
use crate::relations::{python_relations, rust_relations, script_relations};
use crate::types::{RelationMap, UnitKind, UnitMatch};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

const RUST_PATTERNS: &[&str] = &[
    "function_item",
    "function_signature_item",
    "struct_item",
    "union_item",
    "enum_item",
    "trait_item",
    "impl_item",
    "mod_item",
    "macro_definition",
    "use_declaration",
    "extern_crate_declaration",
];

const PYTHON_PATTERNS: &[&str] = &[
    "function_definition",
    "class_definition",
    "decorated_definition",
    "import_statement",
    "import_from_statement",
    "future_import_statement",
];

const SCRIPT_PATTERNS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "enum_declaration",
    "internal_module",
    "method_definition",
    "method_signature",
    "lexical_declaration",
    "import_statement",
    "export_statement",
];

const RUST_TRIVIA: &[&str] = &["attribute_item", "line_comment", "block_comment"];
const HASH_TRIVIA: &[&str] = &["comment"];

/// Tree-sitter backed analyzer for Rust, Python, TypeScript and JavaScript
pub struct AstAnalyzer {
    language: Language,
}

impl AstAnalyzer {
    /// Create an analyzer for a language with a bundled grammar
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Pick the grammar, switching to TSX for `.tsx` files
    fn grammar(&self, path: &Path) -> Result<tree_sitter::Language> {
        let is_tsx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsx"));

        match self.language {
            Language::Rust => Ok(tree_sitter_rust::LANGUAGE.into()),
            Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            Language::JavaScript => Ok(tree_sitter_javascript::LANGUAGE.into()),
            Language::TypeScript if is_tsx => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
            Language::TypeScript => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Language::Generic => Err(UnitsError::tree_sitter(
                "generic language has no tree-sitter grammar",
            )),
        }
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Tree> {
        let grammar = self.grammar(path)?;
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| UnitsError::tree_sitter(format!("Failed to set language: {e}")))?;

        parser
            .parse(content, None)
            .ok_or_else(|| UnitsError::parse(format!("Failed to parse {}", path.display())))
    }
}

impl LanguageAnalyzer for AstAnalyzer {
    fn language(&self) -> Language {
        self.language
    }

    fn structural_patterns(&self) -> &'static [&'static str] {
        match self.language {
            Language::Rust => RUST_PATTERNS,
            Language::Python => PYTHON_PATTERNS,
            Language::TypeScript | Language::JavaScript | Language::Generic => SCRIPT_PATTERNS,
        }
    }

    fn identify_units(&self, path: &Path, content: &str) -> Result<Vec<UnitMatch>> {
        let tree = self.parse(path, content)?;
        let mut collector = Collector::new(content);
        let root = tree.root_node();

        match self.language {
            Language::Rust => collector.collect_rust(root, None),
            Language::Python => collector.collect_python(root, None),
            Language::TypeScript | Language::JavaScript => collector.collect_script(root, None),
            Language::Generic => {}
        }

        Ok(collector.matches)
    }

    fn extract_dependencies(&self, content: &str) -> RelationMap {
        match self.language {
            Language::Rust => rust_relations(content),
            Language::Python => python_relations(content),
            Language::TypeScript | Language::JavaScript | Language::Generic => {
                script_relations(content)
            }
        }
    }
}

struct Collector<'a> {
    bytes: &'a [u8],
    matches: Vec<UnitMatch>,
}

impl<'a> Collector<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            bytes: content.as_bytes(),
            matches: Vec::new(),
        }
    }

    fn text(&self, node: Node) -> Option<String> {
        node.utf8_text(self.bytes).ok().map(str::to_string)
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field).and_then(|n| self.text(n))
    }

    /// Record a unit anchored at `anchor`, absorbing attached comments and attributes
    fn push(
        &mut self,
        anchor: Node,
        kind: UnitKind,
        name: Option<String>,
        scope: Option<&str>,
        trivia: &[&str],
    ) {
        let offset = leading_start(anchor, self.bytes, trivia);
        self.matches
            .push(UnitMatch::new(offset, kind, name).with_scope(scope.map(str::to_string)));
    }

    fn collect_rust(&mut self, node: Node, scope: Option<&str>) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();

        for child in children {
            let kind = match child.kind() {
                "function_item" | "function_signature_item" if scope.is_some() => UnitKind::Method,
                "function_item" | "function_signature_item" => UnitKind::Function,
                "struct_item" | "union_item" => UnitKind::Class,
                "enum_item" => UnitKind::Enum,
                "trait_item" => {
                    let name = self.field_text(child, "name");
                    self.push(child, UnitKind::Trait, name.clone(), scope, RUST_TRIVIA);
                    if let Some(body) = child.child_by_field_name("body") {
                        let scope = name.unwrap_or_else(|| "trait".to_string());
                        self.collect_rust(body, Some(&scope));
                    }
                    continue;
                }
                "macro_definition" => UnitKind::Other,
                "use_declaration" | "extern_crate_declaration" => UnitKind::Import,
                "impl_item" => {
                    let target = child
                        .child_by_field_name("type")
                        .and_then(|t| self.text(t))
                        .map(|t| base_type_name(&t));
                    self.push(child, UnitKind::Impl, target.clone(), None, RUST_TRIVIA);
                    if let Some(body) = child.child_by_field_name("body") {
                        let scope = target.unwrap_or_else(|| "impl".to_string());
                        self.collect_rust(body, Some(&scope));
                    }
                    continue;
                }
                "mod_item" => {
                    let name = self.field_text(child, "name");
                    self.push(child, UnitKind::Module, name, scope, RUST_TRIVIA);
                    if let Some(body) = child.child_by_field_name("body") {
                        self.collect_rust(body, None);
                    }
                    continue;
                }
                _ => continue,
            };

            let name = match kind {
                UnitKind::Import => None,
                _ => self.field_text(child, "name"),
            };
            self.push(child, kind, name, scope, RUST_TRIVIA);
        }
    }

    fn collect_python(&mut self, node: Node, scope: Option<&str>) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();

        for child in children {
            match child.kind() {
                "function_definition" | "class_definition" => {
                    self.python_definition(child, child, scope);
                }
                "decorated_definition" => {
                    if let Some(definition) = child.child_by_field_name("definition") {
                        self.python_definition(child, definition, scope);
                    }
                }
                "import_statement" | "import_from_statement" | "future_import_statement" => {
                    self.push(child, UnitKind::Import, None, scope, HASH_TRIVIA);
                }
                _ => {}
            }
        }
    }

    fn python_definition(&mut self, anchor: Node, definition: Node, scope: Option<&str>) {
        let name = self.field_text(definition, "name");
        match definition.kind() {
            "function_definition" => {
                let kind = if scope.is_some() {
                    UnitKind::Method
                } else {
                    UnitKind::Function
                };
                self.push(anchor, kind, name, scope, HASH_TRIVIA);
            }
            "class_definition" => {
                self.push(anchor, UnitKind::Class, name.clone(), scope, HASH_TRIVIA);
                if let (Some(body), Some(class_name)) =
                    (definition.child_by_field_name("body"), name)
                {
                    self.collect_python(body, Some(&class_name));
                }
            }
            _ => {}
        }
    }

    fn collect_script(&mut self, node: Node, scope: Option<&str>) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();

        for child in children {
            self.script_item(child, child, scope);
        }
    }

    fn script_item(&mut self, anchor: Node, node: Node, scope: Option<&str>) {
        match node.kind() {
            "export_statement" => {
                if let Some(declaration) = node.child_by_field_name("declaration") {
                    self.script_item(anchor, declaration, scope);
                }
            }
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                let name = self.field_text(node, "name");
                self.push(anchor, UnitKind::Function, name, None, HASH_TRIVIA);
            }
            "class_declaration" | "abstract_class_declaration" => {
                let name = self.field_text(node, "name");
                self.push(anchor, UnitKind::Class, name.clone(), None, HASH_TRIVIA);
                if let (Some(body), Some(class_name)) = (node.child_by_field_name("body"), name) {
                    self.collect_script(body, Some(&class_name));
                }
            }
            "interface_declaration" => {
                let name = self.field_text(node, "name");
                self.push(anchor, UnitKind::Interface, name, None, HASH_TRIVIA);
            }
            "enum_declaration" => {
                let name = self.field_text(node, "name");
                self.push(anchor, UnitKind::Enum, name, None, HASH_TRIVIA);
            }
            "internal_module" | "module" => {
                let name = self.field_text(node, "name");
                self.push(anchor, UnitKind::Module, name, None, HASH_TRIVIA);
            }
            "import_statement" => {
                self.push(anchor, UnitKind::Import, None, None, HASH_TRIVIA);
            }
            "lexical_declaration" | "variable_declaration" => {
                if let Some(name) = self.function_binding(node) {
                    self.push(anchor, UnitKind::Function, Some(name), None, HASH_TRIVIA);
                }
            }
            "method_definition" | "method_signature" | "abstract_method_signature"
                if scope.is_some() =>
            {
                let name = self.field_text(node, "name");
                self.push(anchor, UnitKind::Method, name, scope, HASH_TRIVIA);
            }
            _ => {}
        }
    }

    /// Name of the first declarator bound to a function value (`const f = () => {}`)
    fn function_binding(&self, declaration: Node) -> Option<String> {
        let mut cursor = declaration.walk();
        let declarators: Vec<_> = declaration.named_children(&mut cursor).collect();
        declarators
            .into_iter()
            .filter(|d| d.kind() == "variable_declarator")
            .find(|d| {
                d.child_by_field_name("value").is_some_and(|value| {
                    matches!(
                        value.kind(),
                        "arrow_function" | "function_expression" | "function" | "generator_function"
                    )
                })
            })
            .and_then(|d| self.field_text(d, "name"))
    }
}

/// Start byte of `node` extended over directly preceding trivia siblings
fn leading_start(node: Node, bytes: &[u8], trivia: &[&str]) -> usize {
    let mut start = node.start_byte();
    let mut current = node;

    while let Some(prev) = current.prev_sibling() {
        if !trivia.contains(&prev.kind()) {
            break;
        }

        let gap_start = prev.end_byte().min(start);
        let mut newlines = bytes[gap_start..start].iter().filter(|b| **b == b'\n').count();
        if prev.end_byte() > prev.start_byte() && bytes.get(prev.end_byte() - 1) == Some(&b'\n') {
            newlines += 1;
        }
        // Blank line in between, or a comment trailing the previous item's last line
        if newlines > 1 || !starts_line(bytes, prev.start_byte()) {
            break;
        }

        start = prev.start_byte();
        current = prev;
    }

    start
}

fn starts_line(bytes: &[u8], offset: usize) -> bool {
    bytes[..offset]
        .iter()
        .rev()
        .take_while(|b| **b != b'\n')
        .all(|b| *b == b' ' || *b == b'\t')
}

/// Bare type name of an impl target: `&'a mod::Foo<T>` -> `Foo`
fn base_type_name(text: &str) -> String {
    let cut = text.find('<').unwrap_or(text.len());
    let path = text[..cut].rsplit("::").next().unwrap_or_default();
    path.split_whitespace()
        .last()
        .unwrap_or_default()
        .trim_start_matches('&')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn identify(language: Language, file: &str, code: &str) -> Vec<UnitMatch> {
        AstAnalyzer::new(language)
            .identify_units(Path::new(file), code)
            .unwrap()
    }

    fn summary(matches: &[UnitMatch]) -> Vec<(UnitKind, Option<&str>, Option<&str>)> {
        matches
            .iter()
            .map(|m| (m.kind, m.name.as_deref(), m.scope.as_deref()))
            .collect()
    }

    #[test]
    fn test_rust_units() {
        let code = r#"use std::fmt;

/// A point
#[derive(Debug)]
struct Point {
    x: i32,
}

impl Point {
    fn norm(&self) -> i32 {
        self.x
    }
}

fn main() {
    println!("Hello");
}
"#;

        let matches = identify(Language::Rust, "test.rs", code);
        assert_eq!(
            summary(&matches),
            vec![
                (UnitKind::Import, None, None),
                (UnitKind::Class, Some("Point"), None),
                (UnitKind::Impl, Some("Point"), None),
                (UnitKind::Method, Some("norm"), Some("Point")),
                (UnitKind::Function, Some("main"), None),
            ]
        );

        // Doc comment and attribute belong to the struct
        let doc_offset = code.find("/// A point").unwrap();
        assert_eq!(matches[1].offset, doc_offset);
    }

    #[test]
    fn test_rust_generic_impl_target() {
        let code = "impl<T: Clone> fmt::Display for Wrapper<T> {\n    fn fmt(&self) {}\n}\n";
        let matches = identify(Language::Rust, "test.rs", code);
        assert_eq!(
            summary(&matches),
            vec![
                (UnitKind::Impl, Some("Wrapper"), None),
                (UnitKind::Method, Some("fmt"), Some("Wrapper")),
            ]
        );
    }

    #[test]
    fn test_rust_trait_members() {
        let code = "pub trait Shape {\n    fn area(&self) -> f64;\n\n    /// Human readable\n    fn describe(&self) -> String {\n        format!(\"{}\", self.area())\n    }\n}\n";
        let matches = identify(Language::Rust, "shape.rs", code);
        assert_eq!(
            summary(&matches),
            vec![
                (UnitKind::Trait, Some("Shape"), None),
                (UnitKind::Method, Some("area"), Some("Shape")),
                (UnitKind::Method, Some("describe"), Some("Shape")),
            ]
        );
        assert_eq!(matches[2].offset, code.find("    /// Human readable").unwrap() + 4);
    }

    #[test]
    fn test_python_units() {
        let code = r#"import os

def hello():
    print("Hello")

@dataclass
class MyClass(Base):
    def method(self):
        pass
"#;

        let matches = identify(Language::Python, "test.py", code);
        assert_eq!(
            summary(&matches),
            vec![
                (UnitKind::Import, None, None),
                (UnitKind::Function, Some("hello"), None),
                (UnitKind::Class, Some("MyClass"), None),
                (UnitKind::Method, Some("method"), Some("MyClass")),
            ]
        );
        // Decorator belongs to the class
        assert_eq!(matches[2].offset, code.find("@dataclass").unwrap());
    }

    #[test]
    fn test_typescript_units() {
        let code = r#"import { Engine } from './engine';

export interface Drivable {
  drive(): void;
}

export class Car implements Drivable {
  drive(): void {}
}

export const honk = () => 'beep';
"#;

        let matches = identify(Language::TypeScript, "car.ts", code);
        assert_eq!(
            summary(&matches),
            vec![
                (UnitKind::Import, None, None),
                (UnitKind::Interface, Some("Drivable"), None),
                (UnitKind::Class, Some("Car"), None),
                (UnitKind::Method, Some("drive"), Some("Car")),
                (UnitKind::Function, Some("honk"), None),
            ]
        );
        assert_eq!(matches[1].offset, code.find("export interface").unwrap());
    }

    #[test]
    fn test_tsx_files_parse() {
        let code = "export function App() {\n  return <div>hi</div>;\n}\n";
        let matches = identify(Language::TypeScript, "App.tsx", code);
        assert_eq!(summary(&matches), vec![(UnitKind::Function, Some("App"), None)]);
    }

    #[test]
    fn test_base_type_name() {
        assert_eq!(base_type_name("Foo"), "Foo");
        assert_eq!(base_type_name("Wrapper<T>"), "Wrapper");
        assert_eq!(base_type_name("crate::model::Car"), "Car");
        assert_eq!(base_type_name("&'a Foo"), "Foo");
    }
}
