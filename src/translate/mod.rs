/*!
# Identifier translation

Maps identifier paths of the donor program onto the target program's names.
Keys and values are textual paths (`.` or `->` separators) and substitution
is longest-path textual replacement within the statement being rewritten.

A used-substitutions set guards against re-translating fragments that a
previous mapping already produced; it is cleared at the start of every edit
operation.
*/

use crate::core::{PatchError, Result};
use crate::tree::{NodeId, NodeKind, SyntaxTree};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Source-path to target-path identifier mapping, one `from:to` per line.
#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    map: HashMap<String, String>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> VariableMap {
        let mut map = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some((from, to)) = line.split_once(':') {
                map.insert(from.to_string(), to.to_string());
            } else {
                tracing::warn!("ignoring malformed variable mapping line {line:?}");
            }
        }
        VariableMap { map }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<VariableMap> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Looks a path up; the `MapLookupMissing` failure is informational and
    /// callers proceed with the untranslated name.
    pub fn lookup(&self, key: &str) -> Result<&str> {
        self.map
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| PatchError::MapLookupMissing {
                key: key.to_string(),
            })
    }
}

/// Line numbers whose `CallExpr`s are elided from inserted text.
#[derive(Debug, Clone, Default)]
pub struct SkipList {
    lines: HashSet<usize>,
}

impl SkipList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> SkipList {
        let mut lines = HashSet::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<usize>() {
                Ok(n) => {
                    lines.insert(n);
                }
                Err(_) => tracing::warn!("ignoring malformed skip-list line {line:?}"),
            }
        }
        SkipList { lines }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<SkipList> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn contains(&self, line: usize) -> bool {
        self.lines.contains(&line)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Applies a `VariableMap` to statement text, descending the subtree the
/// text was extracted from.
#[derive(Debug)]
pub struct Translator<'a> {
    map: &'a VariableMap,
    used: HashSet<String>,
}

impl<'a> Translator<'a> {
    pub fn new(map: &'a VariableMap) -> Self {
        Self {
            map,
            used: HashSet::new(),
        }
    }

    /// Clears the used-substitutions set. Call at the start of each edit
    /// operation.
    pub fn begin_operation(&mut self) {
        self.used.clear();
    }

    /// Translates every mapped identifier path appearing under `node`
    /// within `statement`.
    pub fn translate(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        mut statement: String,
    ) -> Result<String> {
        let n = tree.node(node)?;
        match n.kind {
            NodeKind::VarDecl | NodeKind::FieldDecl | NodeKind::ParmVarDecl => {
                if let Some(name) = n.identifier.clone().or_else(|| n.value.clone()) {
                    self.substitute(&mut statement, &name);
                }
                return Ok(statement);
            }
            NodeKind::MemberExpr => {
                let path = self.access_path(tree, node)?;
                if !path.is_empty() {
                    self.substitute(&mut statement, &path);
                }
                return Ok(statement);
            }
            NodeKind::GotoStmt => {
                if let Some(label) = n.value.clone() {
                    self.substitute(&mut statement, &label);
                }
                return Ok(statement);
            }
            NodeKind::DeclRefExpr => {
                if let Some(name) = n.value.clone() {
                    // Function references map through `name(` so that call
                    // sites and same-named fields translate independently.
                    let key = if n.ref_type == Some(NodeKind::FunctionDecl) {
                        format!("{name}(")
                    } else {
                        name
                    };
                    self.substitute(&mut statement, &key);
                }
            }
            NodeKind::Macro => {
                if let Some(name) = n.value.clone() {
                    self.substitute(&mut statement, &name);
                }
            }
            _ => {}
        }

        for &child in &n.children {
            statement = self.translate(tree, child, statement)?;
        }
        Ok(statement)
    }

    /// Synthesizes the textual access path of a member or subscript chain,
    /// translating subscript indices along the way.
    pub fn access_path(&self, tree: &SyntaxTree, node: NodeId) -> Result<String> {
        let n = tree.node(node)?;
        Ok(match n.kind {
            NodeKind::MemberExpr => {
                let member = n.identifier.clone().unwrap_or_default();
                let sep = if n.is_arrow { "->" } else { "." };
                match n.children.first() {
                    Some(&base) => {
                        let prefix = self.access_path(tree, base)?;
                        format!("{prefix}{sep}{member}")
                    }
                    None => format!("{sep}{member}"),
                }
            }
            NodeKind::ArraySubscriptExpr => {
                let base = match n.children.first() {
                    Some(&base) => self.access_path(tree, base)?,
                    None => String::new(),
                };
                let index = match n.children.get(1) {
                    Some(&index) => {
                        let raw = tree
                            .node(index)?
                            .value
                            .clone()
                            .unwrap_or_else(|| tree.node_text(index).unwrap_or("").to_string());
                        match self.map.lookup(&raw) {
                            Ok(mapped) => mapped.to_string(),
                            Err(_) => raw,
                        }
                    }
                    None => String::new(),
                };
                format!("{base}[{index}]")
            }
            NodeKind::DeclRefExpr => n.value.clone().unwrap_or_default(),
            NodeKind::ParenExpr => match n.children.first() {
                Some(&inner) => self.access_path(tree, inner)?,
                None => String::new(),
            },
            _ => String::new(),
        })
    }

    /// Looks up `from` and, when mapped and not yet used in this operation,
    /// replaces every non-overlapping occurrence in `statement`.
    fn substitute(&mut self, statement: &mut String, from: &str) {
        if from.is_empty() || self.used.contains(from) {
            return;
        }
        self.used.insert(from.to_string());
        match self.map.lookup(from) {
            Ok(to) => {
                let to = to.to_string();
                *statement = replace_all(statement, from, &to);
            }
            Err(err) => tracing::debug!("{err}, keeping original spelling"),
        }
    }
}

/// Replaces all non-overlapping occurrences of `from`, stepping past each
/// replacement so that `to` containing `from` cannot loop.
pub(crate) fn replace_all(statement: &str, from: &str, to: &str) -> String {
    let mut out = String::with_capacity(statement.len());
    let mut rest = statement;
    while let Some(pos) = rest.find(from) {
        out.push_str(&rest[..pos]);
        out.push_str(to);
        rest = &rest[pos + from.len()..];
    }
    out.push_str(rest);
    out
}

/// Removes call statements whose begin line is on the skip list from the
/// extracted text. Walks the subtree the text came from.
pub fn filter_skipped_calls(
    tree: &SyntaxTree,
    node: NodeId,
    mut statement: String,
    skip_list: &SkipList,
) -> Result<String> {
    if skip_list.is_empty() {
        return Ok(statement);
    }
    let n = tree.node(node)?;
    if n.kind == NodeKind::CallExpr {
        let line = tree.position(n.span.begin).line;
        if skip_list.contains(line) {
            let call_text = tree.text(tree.deletion_range(node)?)?;
            statement = replace_all(&statement, call_text, "");
        }
    }
    for &child in &n.children {
        statement = filter_skipped_calls(tree, child, statement, skip_list)?;
    }
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SyntaxTree;

    fn tree_of(src: &str) -> SyntaxTree {
        SyntaxTree::parse(src, "donor.c").unwrap()
    }

    #[test]
    fn test_map_parsing_skips_blanks() {
        let map = VariableMap::parse("a:b\n\nfoo->bar:baz->qux\n");
        assert_eq!(map.lookup("a").unwrap(), "b");
        assert_eq!(map.lookup("foo->bar").unwrap(), "baz->qux");
        assert!(matches!(
            map.lookup("missing"),
            Err(PatchError::MapLookupMissing { .. })
        ));
    }

    #[test]
    fn test_member_path_translation() {
        let tree = tree_of("int f(struct s *foo) {\n    if (foo->bar) return 1;\n    return 0;\n}\n");
        let map = VariableMap::parse("foo->bar:baz->qux\n");
        let mut translator = Translator::new(&map);
        translator.begin_operation();
        let out = translator
            .translate(
                &tree,
                tree.root(),
                "if (foo->bar) return 1;".to_string(),
            )
            .unwrap();
        assert_eq!(out, "if (baz->qux) return 1;");
    }

    #[test]
    fn test_function_references_map_with_paren() {
        let tree = tree_of("void f(void) {\n    log(x);\n}\n");
        let map = VariableMap::parse("log(:record(\nx:y\n");
        let mut translator = Translator::new(&map);
        translator.begin_operation();
        let out = translator
            .translate(&tree, tree.root(), "log(x);".to_string())
            .unwrap();
        assert_eq!(out, "record(y);");
    }

    #[test]
    fn test_translation_is_idempotent() {
        // `to` contains `from`; the used-set guard must keep a second pass
        // from compounding.
        let tree = tree_of("void f(int count) {\n    count++;\n}\n");
        let map = VariableMap::parse("count:count_total\n");
        let mut translator = Translator::new(&map);
        translator.begin_operation();
        let once = translator
            .translate(&tree, tree.root(), "count++;".to_string())
            .unwrap();
        let twice = translator.translate(&tree, tree.root(), once.clone()).unwrap();
        assert_eq!(once, "count_total++;");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_array_subscript_path() {
        let tree = tree_of("void f(struct s *a) {\n    use(a->items[i].len);\n}\n");
        let map = VariableMap::parse("i:j\n");
        let translator = Translator::new(&map);
        let member = tree
            .preorder()
            .find(|&id| {
                let n = tree.get(id).unwrap();
                n.kind == crate::tree::NodeKind::MemberExpr
                    && n.identifier.as_deref() == Some("len")
            })
            .unwrap();
        let path = translator.access_path(&tree, member).unwrap();
        assert_eq!(path, "a->items[j].len");
    }

    #[test]
    fn test_skip_list_filters_calls() {
        let src = "void donor(void) {\n    log_stats(a);\n    work(a);\n}\n";
        let tree = tree_of(src);
        let skip = SkipList::parse("2\n");
        let root = tree.root();
        let text = "\n    log_stats(a);\n    work(a);\n".to_string();
        let filtered = filter_skipped_calls(&tree, root, text, &skip).unwrap();
        assert!(!filtered.contains("log_stats"));
        assert!(filtered.contains("work(a);"));
    }
}
