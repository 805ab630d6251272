/*!
# On-disk fixture tests

Exercises the file-loading entry points the CLI tools are built on: tree
parsing from disk, script/map/skip-list loading, the JSON dump shape, and
the diff-then-patch pipeline.
*/

use astgraft::tree::json;
use astgraft::{
    EditScript, NodeKind, Patcher, SkipList, SyntaxTree, TreeDiff, VariableMap,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_parse_file_and_dump() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unit.c");
    fs::write(&path, "int main() {\n    return 0;\n}\n").unwrap();

    let tree = SyntaxTree::parse_file(&path).unwrap();
    let doc = json::dump_json(&tree).unwrap();
    assert_eq!(
        doc["filename"],
        path.to_string_lossy().as_ref(),
        "dump names the parsed file"
    );
    assert_eq!(doc["root"]["type"], "TranslationUnit");
    assert_eq!(doc["root"]["children"][0]["type"], "FunctionDecl");
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = SyntaxTree::parse_file("/no/such/dir/missing.c").unwrap_err();
    assert!(matches!(err, astgraft::PatchError::Io(_)));
}

#[test]
fn test_script_and_map_loading() {
    let dir = TempDir::new().unwrap();
    let script_path = dir.path().join("edits.script");
    let map_path = dir.path().join("vars.map");
    fs::write(&script_path, "Delete DeclStmt(3)\n\n").unwrap();
    fs::write(&map_path, "foo:bar\n").unwrap();

    let script = EditScript::load(&script_path).unwrap();
    assert_eq!(script.len(), 1);
    let map = VariableMap::load(&map_path).unwrap();
    assert_eq!(map.lookup("foo").unwrap(), "bar");
}

#[test]
fn test_skip_list_elides_calls_from_inserted_text() {
    let destination = SyntaxTree::parse(
        "void donor(int y) {\n    if (y) { log_it(y); y = 2; }\n}\n",
        "dst.c",
    )
    .unwrap();
    let target =
        SyntaxTree::parse("void run(int y) {\n    y = 0;\n}\n", "tgt.c").unwrap();
    // The log_it call begins on line 2 of the donor.
    let skip = SkipList::parse("2\n");

    let insert = destination
        .preorder()
        .find(|&id| destination.get(id).unwrap().kind == NodeKind::IfStmt)
        .unwrap();
    let block = target
        .preorder()
        .find(|&id| target.get(id).unwrap().kind == NodeKind::CompoundStmt)
        .unwrap();

    let script = EditScript::parse(&format!(
        "Insert IfStmt({insert}) into CompoundStmt({block}) at 1\n"
    ))
    .unwrap();
    let map = VariableMap::new();
    let mut patcher = Patcher::new(&destination, &target, &map, &skip);
    patcher.apply(&script).unwrap();
    let out = patcher.finish().unwrap();

    assert!(out.contains("y = 2;"), "got:\n{out}");
    assert!(!out.contains("log_it"), "skip-listed call survived:\n{out}");
}

#[test]
fn test_diff_feeds_patcher() {
    let old = "void f(int a) {\n    a = 1;\n}\n";
    let new = "void f(int a) {\n    a = 1;\n    a = 2;\n}\n";
    let src = SyntaxTree::parse(old, "old.c").unwrap();
    let dst = SyntaxTree::parse(new, "new.c").unwrap();

    let diff = TreeDiff::new(&src, &dst).unwrap();
    let script_text: String = diff
        .script()
        .unwrap()
        .iter()
        .map(|op| format!("{op}\n"))
        .collect();
    let script = EditScript::parse(&script_text).unwrap();
    assert!(!script.is_empty());

    // The source revision doubles as the patch target: script targets are
    // source-tree ids.
    let map = VariableMap::new();
    let skip = SkipList::default();
    let mut patcher = Patcher::new(&dst, &src, &map, &skip);
    patcher.apply(&script).unwrap();
    let out = patcher.finish().unwrap();

    let first = out.find("a = 1;").unwrap();
    let second = out.find("a = 2;").unwrap();
    assert!(first < second, "patched statements out of order:\n{out}");
}

#[test]
fn test_diff_update_round_trip() {
    let old = "int limit(void) {\n    return 10;\n}\n";
    let new = "int limit(void) {\n    return 20;\n}\n";
    let src = SyntaxTree::parse(old, "old.c").unwrap();
    let dst = SyntaxTree::parse(new, "new.c").unwrap();

    let diff = TreeDiff::new(&src, &dst).unwrap();
    let script_text: String = diff
        .script()
        .unwrap()
        .iter()
        .map(|op| format!("{op}\n"))
        .collect();
    let script = EditScript::parse(&script_text).unwrap();

    let map = VariableMap::new();
    let skip = SkipList::default();
    let mut patcher = Patcher::new(&dst, &src, &map, &skip);
    patcher.apply(&script).unwrap();
    assert_eq!(patcher.finish().unwrap(), new);
}
