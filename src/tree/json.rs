/*!
# Tree dump

Serializes a `SyntaxTree` to the line-oriented text form or to JSON. The
JSON schema is the tool family's interchange format: node objects keyed
`id`/`parent_id`/`type`/positions/`value`/`identifier`/`children`, wrapped
in `{"filename": ..., "root": ...}`.
*/

use crate::core::Result;
use crate::tree::{NodeId, SyntaxTree};
use serde_json::{Map, Value};
use std::fmt::Write as _;

/// Dumps the whole tree as a JSON document.
pub fn dump_json(tree: &SyntaxTree) -> Result<Value> {
    let mut doc = Map::new();
    doc.insert(
        "filename".to_string(),
        Value::String(tree.file_name().to_string()),
    );
    doc.insert("root".to_string(), node_to_json(tree, tree.root())?);
    Ok(Value::Object(doc))
}

fn node_to_json(tree: &SyntaxTree, id: NodeId) -> Result<Value> {
    let node = tree.node(id)?;
    let mut obj = Map::new();

    obj.insert("id".to_string(), Value::from(id.0));
    if let Some(parent) = node.parent {
        obj.insert("parent_id".to_string(), Value::from(parent.0));
    }
    obj.insert(
        "type".to_string(),
        Value::String(node.kind.label().to_string()),
    );
    if node.kind.carries_file() {
        if let Some(file) = &node.file {
            obj.insert("file".to_string(), Value::String(file.clone()));
        }
    }
    if node.is_arrow {
        obj.insert("isArrow".to_string(), Value::String("yes".to_string()));
    }
    if let Some(is_static) = node.is_static {
        let flag = if is_static { "yes" } else { "no" };
        obj.insert("isStatic".to_string(), Value::String(flag.to_string()));
    }
    if let Some(data_type) = &node.data_type {
        obj.insert("data_type".to_string(), Value::String(data_type.clone()));
    }

    let begin = tree.position(node.span.begin);
    let end = tree.position(node.span.end);
    obj.insert("start line".to_string(), Value::from(begin.line));
    obj.insert("start column".to_string(), Value::from(begin.column));
    obj.insert("end line".to_string(), Value::from(end.line));
    obj.insert("end column".to_string(), Value::from(end.column));
    obj.insert("begin".to_string(), Value::from(node.span.begin));
    obj.insert("end".to_string(), Value::from(node.span.end));

    if let Some(value) = &node.value {
        obj.insert("value".to_string(), Value::String(value.clone()));
    }
    if let Some(identifier) = &node.identifier {
        obj.insert(
            "identifier".to_string(),
            Value::String(identifier.clone()),
        );
        if let Some(qualified) = &node.qualified_identifier {
            if qualified != identifier {
                obj.insert(
                    "qualified_identifier".to_string(),
                    Value::String(qualified.clone()),
                );
            }
        }
    }
    if let Some(ref_type) = node.ref_type {
        obj.insert(
            "ref_type".to_string(),
            Value::String(ref_type.label().to_string()),
        );
    }

    let mut children = Vec::with_capacity(node.children.len());
    for &child in &node.children {
        children.push(node_to_json(tree, child)?);
    }
    obj.insert("children".to_string(), Value::Array(children));

    Ok(Value::Object(obj))
}

/// Dumps the tree as indented text, one node per line.
pub fn dump_text(tree: &SyntaxTree) -> Result<String> {
    let mut out = String::new();
    let mut depths = vec![0usize; tree.len()];
    for id in tree.preorder() {
        let node = tree.node(id)?;
        let depth = node
            .parent
            .map(|p| depths[p.index()] + 1)
            .unwrap_or(0);
        depths[id.index()] = depth;
        for _ in 0..depth {
            out.push(' ');
        }
        let _ = write!(out, "{}({})", node.kind, id);
        if let Some(value) = &node.value {
            let _ = write!(out, ": {value}");
        }
        let begin = tree.position(node.span.begin);
        let end = tree.position(node.span.end);
        let _ = writeln!(out, " <{begin}..{end}>");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let tree = SyntaxTree::parse("int x = 5;\n", "dump.c").unwrap();
        let doc = dump_json(&tree).unwrap();
        assert_eq!(doc["filename"], "dump.c");
        let root = &doc["root"];
        assert_eq!(root["id"], 0);
        assert_eq!(root["type"], "TranslationUnit");
        assert!(root.get("parent_id").is_none());

        let var = &root["children"][0];
        assert_eq!(var["type"], "VarDecl");
        assert_eq!(var["parent_id"], 0);
        assert_eq!(var["file"], "dump.c");
        assert_eq!(var["isStatic"], "no");
        assert_eq!(var["identifier"], "x");
        assert_eq!(var["start line"], 1);
        assert_eq!(var["begin"], 0);
    }

    #[test]
    fn test_json_escapes_control_bytes() {
        let tree = SyntaxTree::parse("char *s = \"a\\tb\";\n", "esc.c").unwrap();
        let doc = dump_json(&tree).unwrap();
        let text = serde_json::to_string(&doc).unwrap();
        // The literal backslash-t from the source must survive quoting.
        assert!(text.contains("a\\\\tb"));
    }

    #[test]
    fn test_text_dump_lists_every_node() {
        let tree = SyntaxTree::parse("int main() { return 0; }\n", "t.c").unwrap();
        let text = dump_text(&tree).unwrap();
        assert_eq!(text.lines().count(), tree.len());
        assert!(text.starts_with("TranslationUnit(0)"));
        assert!(text.contains("ReturnStmt"));
    }
}
