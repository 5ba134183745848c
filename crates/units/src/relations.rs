//! Regex-based declared-relation extraction, one function per language.

use crate::types::{RelationKind, RelationMap};
use once_cell::sync::Lazy;
use regex::Regex;

static RUST_USE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([^;]+);").expect("valid regex")
});
static RUST_SUPERTRAITS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\btrait\s+\w+(?:<[^>{]*>)?\s*:\s*([^{]+?)\s*(?:where\b[^{]*)?\{")
        .expect("valid regex")
});
static RUST_IMPL_FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bimpl\s*(?:<[^>{]*>)?\s*([A-Za-z_][\w:]*)(?:<[^>{]*>)?\s+for\s+")
        .expect("valid regex")
});

static PY_FROM_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*from\s+([\w.]+)\s+import\s+\(?([^)\n]+)").expect("valid regex")
});
static PY_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*import\s+([\w.]+(?:\s*,\s*[\w.]+)*)").expect("valid regex")
});
static PY_CLASS_BASES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*class\s+\w+\s*\(([^)]*)\)").expect("valid regex"));

static JS_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s+(?:type\s+)?([^'";]+?)\s+from\s+['"]([^'"]+)['"]"#)
        .expect("valid regex")
});
static JS_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex")
});
static JS_CLASS_EXTENDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bclass\s+[\w$]+(?:\s*<[^>{]*>)?\s+extends\s+([\w$.]+)").expect("valid regex")
});
static JS_INTERFACE_EXTENDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\binterface\s+[\w$]+(?:\s*<[^>{]*>)?\s+extends\s+([^{]+)\{")
        .expect("valid regex")
});
static JS_IMPLEMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bimplements\s+([^{]+)\{").expect("valid regex"));

static GENERIC_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:namespace|package)\s+([\w\\.]+)").expect("valid regex")
});
static GENERIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:use|import|using)\s+(?:static\s+)?([\w\\.]+)").expect("valid regex")
});
static GENERIC_EXTENDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bextends\s+([\w\\.]+(?:\s*,\s*[\w\\.]+)*)").expect("valid regex")
});
static GENERIC_IMPLEMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bimplements\s+([\w\\.]+(?:\s*,\s*[\w\\.]+)*)").expect("valid regex")
});
static GENERIC_COLON_BASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\b(?:class|interface)\s+\w+\s*(?:\([^)]*\))?\s*:\s*([\w.]+)")
        .expect("valid regex")
});

pub(crate) fn rust_relations(content: &str) -> RelationMap {
    let mut relations = RelationMap::new();

    for caps in RUST_USE.captures_iter(content) {
        let mut paths = Vec::new();
        expand_use_tree(&caps[1], "", &mut paths);
        for path in paths {
            relations.push(RelationKind::Imports, path);
        }
    }

    for caps in RUST_SUPERTRAITS.captures_iter(content) {
        for bound in caps[1].split('+') {
            let bound = bound.trim();
            if bound.starts_with('\'') || bound.starts_with('?') {
                continue;
            }
            if let Some(name) = clean_reference(bound) {
                relations.push(RelationKind::Extends, name);
            }
        }
    }

    for caps in RUST_IMPL_FOR.captures_iter(content) {
        if let Some(name) = clean_reference(&caps[1]) {
            relations.push(RelationKind::Implements, name);
        }
    }

    relations
}

pub(crate) fn python_relations(content: &str) -> RelationMap {
    let mut relations = RelationMap::new();

    for caps in PY_FROM_IMPORT.captures_iter(content) {
        for item in caps[2].split(',') {
            let name = item.split_whitespace().next().unwrap_or_default();
            if name == "*" {
                relations.push(RelationKind::Imports, &caps[1]);
            } else if let Some(name) = clean_reference(name) {
                relations.push(RelationKind::Imports, name);
            }
        }
    }

    for caps in PY_IMPORT.captures_iter(content) {
        for module in caps[1].split(',') {
            relations.push(RelationKind::Imports, module.trim());
        }
    }

    for caps in PY_CLASS_BASES.captures_iter(content) {
        for base in caps[1].split(',') {
            let base = base.trim();
            if base.contains('=') || base == "object" {
                continue;
            }
            if let Some(name) = clean_reference(base) {
                relations.push(RelationKind::Extends, name);
            }
        }
    }

    relations
}

pub(crate) fn script_relations(content: &str) -> RelationMap {
    let mut relations = RelationMap::new();

    for caps in JS_IMPORT.captures_iter(content) {
        let names = import_clause_names(&caps[1]);
        if names.is_empty() {
            relations.push(RelationKind::Imports, &caps[2]);
        }
        for name in names {
            relations.push(RelationKind::Imports, name);
        }
    }

    for caps in JS_REQUIRE.captures_iter(content) {
        relations.push(RelationKind::Imports, &caps[1]);
    }

    for caps in JS_CLASS_EXTENDS.captures_iter(content) {
        if let Some(name) = clean_reference(&caps[1]) {
            relations.push(RelationKind::Extends, name);
        }
    }

    for caps in JS_INTERFACE_EXTENDS.captures_iter(content) {
        push_list(&mut relations, RelationKind::Extends, &caps[1]);
    }

    for caps in JS_IMPLEMENTS.captures_iter(content) {
        push_list(&mut relations, RelationKind::Implements, &caps[1]);
    }

    relations
}

pub(crate) fn generic_relations(content: &str) -> RelationMap {
    let mut relations = RelationMap::new();

    for caps in GENERIC_NAMESPACE.captures_iter(content) {
        relations.push(RelationKind::Namespace, &caps[1]);
    }
    for caps in GENERIC_IMPORT.captures_iter(content) {
        relations.push(RelationKind::Imports, &caps[1]);
    }
    for caps in GENERIC_EXTENDS.captures_iter(content) {
        push_list(&mut relations, RelationKind::Extends, &caps[1]);
    }
    for caps in GENERIC_IMPLEMENTS.captures_iter(content) {
        push_list(&mut relations, RelationKind::Implements, &caps[1]);
    }
    for caps in GENERIC_COLON_BASE.captures_iter(content) {
        if let Some(name) = clean_reference(&caps[1]) {
            relations.push(RelationKind::Extends, name);
        }
    }

    relations
}

fn push_list(relations: &mut RelationMap, kind: RelationKind, list: &str) {
    for item in split_top_level(list) {
        if let Some(name) = clean_reference(item) {
            relations.push(kind, name);
        }
    }
}

/// Trim a reference down to its path, dropping generic arguments
fn clean_reference(raw: &str) -> Option<String> {
    let cut = raw
        .find(|c| matches!(c, '<' | '[' | '(' | '{'))
        .unwrap_or(raw.len());
    let name = raw[..cut].trim();
    let first = name.chars().next()?;
    if first.is_alphabetic() || first == '_' || first == '\\' || first == '$' {
        Some(name.to_string())
    } else {
        None
    }
}

/// Split on commas that are not nested in `<>`, `{}` or `()`
fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in list.char_indices() {
        match ch {
            '<' | '{' | '(' | '[' => depth += 1,
            '>' | '}' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}

/// Flatten `a::b::{C, d::{E, F as G}}` into full paths
fn expand_use_tree(tree: &str, prefix: &str, out: &mut Vec<String>) {
    let tree = tree.trim();
    if tree.is_empty() {
        return;
    }

    if let (Some(open), Some(close)) = (tree.find('{'), tree.rfind('}')) {
        if open < close {
            let head = tree[..open].trim().trim_end_matches("::");
            let next_prefix = join_path(prefix, head);
            for part in split_top_level(&tree[open + 1..close]) {
                expand_use_tree(part, &next_prefix, out);
            }
            return;
        }
    }

    let path = tree.split(" as ").next().unwrap_or(tree).trim();
    match path {
        "*" => {}
        "self" => {
            if !prefix.is_empty() {
                out.push(prefix.to_string());
            }
        }
        _ => out.push(join_path(prefix, path)),
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    match (prefix.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}::{segment}"),
    }
}

/// Names bound by an ES import clause (`Foo, { Bar, Baz as Q }`)
fn import_clause_names(clause: &str) -> Vec<String> {
    let mut names = Vec::new();
    let (outside, inside) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => {
            (format!("{}{}", &clause[..open], &clause[close + 1..]), Some(&clause[open + 1..close]))
        }
        _ => (clause.to_string(), None),
    };

    for part in outside.split(',') {
        let part = part.trim();
        if part.is_empty() || part.starts_with('*') {
            continue;
        }
        if let Some(name) = clean_reference(part) {
            names.push(name);
        }
    }

    if let Some(inside) = inside {
        for item in inside.split(',') {
            let item = item.trim().trim_start_matches("type ").trim();
            let name = item.split(" as ").next().unwrap_or(item);
            if let Some(name) = clean_reference(name) {
                names.push(name);
            }
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rust_use_trees_are_flattened() {
        let relations = rust_relations(
            "use std::collections::{HashMap, hash_map::{Entry as E}};\nuse crate::model::Car;\n",
        );
        assert_eq!(
            relations.get(RelationKind::Imports),
            &[
                "std::collections::HashMap".to_string(),
                "std::collections::hash_map::Entry".to_string(),
                "crate::model::Car".to_string(),
            ]
        );
    }

    #[test]
    fn rust_supertraits_and_impls() {
        let relations = rust_relations(
            "pub trait Vehicle: Engine + Send + 'static {\n}\nimpl<T> Display for Wrapper<T> {}\n",
        );
        assert_eq!(
            relations.get(RelationKind::Extends),
            &["Engine".to_string(), "Send".to_string()]
        );
        assert_eq!(relations.get(RelationKind::Implements), &["Display".to_string()]);
    }

    #[test]
    fn python_bases_skip_keywords_and_object() {
        let relations = python_relations("class Dog(Animal, metaclass=Meta):\n    pass\n");
        assert_eq!(relations.get(RelationKind::Extends), &["Animal".to_string()]);

        let relations = python_relations("class Plain(object):\n    pass\n");
        assert!(relations.get(RelationKind::Extends).is_empty());
    }

    #[test]
    fn python_imports() {
        let relations = python_relations("from models.car import Car, Wheel as W\nimport os, sys\n");
        assert_eq!(
            relations.get(RelationKind::Imports),
            &[
                "Car".to_string(),
                "Wheel".to_string(),
                "os".to_string(),
                "sys".to_string(),
            ]
        );
    }

    #[test]
    fn script_class_heritage() {
        let relations =
            script_relations("export class Car extends Vehicle implements Drivable, Serializable<Car> {\n}");
        assert_eq!(relations.get(RelationKind::Extends), &["Vehicle".to_string()]);
        assert_eq!(
            relations.get(RelationKind::Implements),
            &["Drivable".to_string(), "Serializable".to_string()]
        );
    }

    #[test]
    fn script_import_clauses() {
        let relations = script_relations(
            "import React, { useState, type FC as Component } from 'react';\nimport * as path from 'path';\nconst fs = require('fs');",
        );
        assert_eq!(
            relations.get(RelationKind::Imports),
            &[
                "React".to_string(),
                "useState".to_string(),
                "FC".to_string(),
                "path".to_string(),
                "fs".to_string(),
            ]
        );
    }

    #[test]
    fn generic_relations_cover_php_and_java() {
        let relations = generic_relations(
            "namespace App\\Models;\nuse App\\Contracts\\Shape;\nclass Square extends Base implements Shape, Countable {\n}",
        );
        assert_eq!(relations.get(RelationKind::Namespace), &["App\\Models".to_string()]);
        assert_eq!(
            relations.get(RelationKind::Imports),
            &["App\\Contracts\\Shape".to_string()]
        );
        assert_eq!(relations.get(RelationKind::Extends), &["Base".to_string()]);
        assert_eq!(
            relations.get(RelationKind::Implements),
            &["Shape".to_string(), "Countable".to_string()]
        );
    }

    #[test]
    fn generic_colon_base_for_kotlin_and_csharp() {
        let relations = generic_relations("class Repo(val db: Db) : BaseRepo {\n}");
        assert_eq!(relations.get(RelationKind::Extends), &["BaseRepo".to_string()]);
    }
}
