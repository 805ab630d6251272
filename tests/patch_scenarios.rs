/*!
# End-to-end patching scenarios

Each test builds donor and target trees from literal sources, resolves the
node ids it needs by walking the trees, and drives the patcher through a
real script.
*/

use astgraft::{
    EditScript, NodeId, NodeKind, PatchError, Patcher, SkipList, SyntaxTree, VariableMap,
};

fn find(tree: &SyntaxTree, pred: impl Fn(&astgraft::Node) -> bool) -> NodeId {
    tree.preorder()
        .find(|&id| pred(tree.get(id).unwrap()))
        .expect("node not found in fixture")
}

fn patch(
    destination: &SyntaxTree,
    target: &SyntaxTree,
    map: &VariableMap,
    script: &str,
) -> anyhow::Result<String> {
    let skip = SkipList::default();
    let script = EditScript::parse(script)?;
    let mut patcher = Patcher::new(destination, target, map, &skip);
    patcher.apply(&script)?;
    Ok(patcher.finish()?)
}

#[test]
fn insert_statement_into_compound() {
    let destination =
        SyntaxTree::parse("void donor(int y) {\n    y = 2;\n}\n", "dst.c").unwrap();
    let target = SyntaxTree::parse("void run(int x) {\n    x = 1;\n}\n", "tgt.c").unwrap();

    let insert = find(&destination, |n| {
        n.kind == NodeKind::BinaryOperator && n.value.as_deref() == Some("=")
    });
    let block = find(&target, |n| n.kind == NodeKind::CompoundStmt);

    let out = patch(
        &destination,
        &target,
        &VariableMap::new(),
        &format!("Insert BinaryOperator({insert}) into CompoundStmt({block}) at 1\n"),
    )
    .unwrap();

    // Both statements in order, the new one terminated and on its own line.
    assert!(out.contains("x = 1;\ny = 2;\n"), "got:\n{out}");
    assert!(out.ends_with("}\n"));
}

#[test]
fn insert_translates_member_paths() {
    let destination = SyntaxTree::parse(
        "int donor(struct s *foo) {\n    if (foo->bar) return 1;\n    return 0;\n}\n",
        "dst.c",
    )
    .unwrap();
    let target = SyntaxTree::parse(
        "int run(struct s *baz) {\n    return 0;\n}\n",
        "tgt.c",
    )
    .unwrap();
    let map = VariableMap::parse("foo->bar:baz->qux\n");

    let insert = find(&destination, |n| n.kind == NodeKind::IfStmt);
    let block = find(&target, |n| n.kind == NodeKind::CompoundStmt);

    let out = patch(
        &destination,
        &target,
        &map,
        &format!("Insert IfStmt({insert}) into CompoundStmt({block}) at 0\n"),
    )
    .unwrap();

    assert!(out.contains("if (baz->qux) return 1;"), "got:\n{out}");
    assert!(!out.contains("foo->bar"));
}

#[test]
fn insert_call_argument_at_end() {
    let destination =
        SyntaxTree::parse("void donor(void) {\n    f(a, b, c);\n}\n", "dst.c").unwrap();
    let target = SyntaxTree::parse("void run(void) {\n    f(a, b);\n}\n", "tgt.c").unwrap();

    let insert = find(&destination, |n| {
        n.kind == NodeKind::DeclRefExpr && n.value.as_deref() == Some("c")
    });
    let call = find(&target, |n| n.kind == NodeKind::CallExpr);

    let out = patch(
        &destination,
        &target,
        &VariableMap::new(),
        &format!("Insert DeclRefExpr({insert}) into CallExpr({call}) at 2\n"),
    )
    .unwrap();

    assert!(out.contains("f(a, b, c);"), "got:\n{out}");
}

#[test]
fn delete_declaration_removes_its_line() {
    let destination = SyntaxTree::parse("int unused;\n", "dst.c").unwrap();
    let target = SyntaxTree::parse(
        "void run(void) {\n    int x = 5;\n    use(x);\n}\n",
        "tgt.c",
    )
    .unwrap();

    let decl = find(&target, |n| n.kind == NodeKind::DeclStmt);

    let out = patch(
        &destination,
        &target,
        &VariableMap::new(),
        &format!("Delete DeclStmt({decl})\n"),
    )
    .unwrap();

    assert_eq!(out, "void run(void) {\n    use(x);\n}\n");
}

#[test]
fn overlapping_replacements_fail_without_output() {
    let destination = SyntaxTree::parse("int y = 9;\n", "dst.c").unwrap();
    let target = SyntaxTree::parse("int x = 5;\n", "tgt.c").unwrap();

    let with = find(&destination, |n| n.kind == NodeKind::IntegerLiteral);
    let lit = find(&target, |n| n.kind == NodeKind::IntegerLiteral);

    let script = format!(
        "Replace IntegerLiteral({lit}) with IntegerLiteral({with})\n\
         Replace IntegerLiteral({lit}) with IntegerLiteral({with})\n"
    );
    let err = patch(&destination, &target, &VariableMap::new(), &script).unwrap_err();
    let overlap = err
        .chain()
        .filter_map(|e| e.downcast_ref::<PatchError>())
        .any(|e| matches!(e, PatchError::ReplacementOverlap { .. }));
    assert!(overlap, "expected a replacement overlap, got: {err:?}");
}

#[test]
fn empty_script_round_trips_target_bytes() {
    let source = "int main() {\n    /* untouched */\n    return 0;\n}\n";
    let destination = SyntaxTree::parse("int unrelated;\n", "dst.c").unwrap();
    let target = SyntaxTree::parse(source, "tgt.c").unwrap();

    let out = patch(&destination, &target, &VariableMap::new(), "").unwrap();
    assert_eq!(out, source);
}

#[test]
fn move_statement_within_block() {
    let destination = SyntaxTree::parse("int unused;\n", "dst.c").unwrap();
    let target = SyntaxTree::parse(
        "void run(int a) {\n    a = 1;\n    g(a);\n}\n",
        "tgt.c",
    )
    .unwrap();

    let call = find(&target, |n| n.kind == NodeKind::CallExpr);
    let block = find(&target, |n| n.kind == NodeKind::CompoundStmt);

    let out = patch(
        &destination,
        &target,
        &VariableMap::new(),
        &format!("Move CallExpr({call}) into CompoundStmt({block}) at 0\n"),
    )
    .unwrap();

    // The call now precedes the assignment and its old line is gone.
    let call_pos = out.find("g(a);").unwrap();
    let assign_pos = out.find("a = 1;").unwrap();
    assert!(call_pos < assign_pos, "got:\n{out}");
    assert_eq!(out.matches("g(a);").count(), 1);
}

#[test]
fn update_rewrites_operator_spelling() {
    let destination =
        SyntaxTree::parse("int donor(int a) {\n    return a >= 1;\n}\n", "dst.c").unwrap();
    let target =
        SyntaxTree::parse("int run(int a) {\n    return a > 1;\n}\n", "tgt.c").unwrap();

    let to = find(&destination, |n| {
        n.kind == NodeKind::BinaryOperator && n.value.as_deref() == Some(">=")
    });
    let op = find(&target, |n| {
        n.kind == NodeKind::BinaryOperator && n.value.as_deref() == Some(">")
    });

    let out = patch(
        &destination,
        &target,
        &VariableMap::new(),
        &format!("Update BinaryOperator({op}) to BinaryOperator({to})\n"),
    )
    .unwrap();

    assert!(out.contains("return a >= 1;"), "got:\n{out}");
}

#[test]
fn replace_keeps_statement_punctuation() {
    let destination =
        SyntaxTree::parse("void donor(int a) {\n    a = 9;\n}\n", "dst.c").unwrap();
    let target = SyntaxTree::parse(
        "void run(int a) {\n    a = 1;\n    h(a);\n}\n",
        "tgt.c",
    )
    .unwrap();

    let with = find(&destination, |n| {
        n.kind == NodeKind::BinaryOperator && n.value.as_deref() == Some("=")
    });
    let old = find(&target, |n| {
        n.kind == NodeKind::BinaryOperator && n.value.as_deref() == Some("=")
    });

    let out = patch(
        &destination,
        &target,
        &VariableMap::new(),
        &format!("Replace BinaryOperator({old}) with BinaryOperator({with})\n"),
    )
    .unwrap();

    assert!(out.contains("a = 9"), "got:\n{out}");
    assert!(!out.contains("a = 1"));
    // The old terminator still closes the new statement.
    assert!(out.contains("a = 9 ;") || out.contains("a = 9;"), "got:\n{out}");
    assert!(out.contains("h(a);"));
}

#[test]
fn deterministic_across_runs() {
    let destination =
        SyntaxTree::parse("void donor(int y) {\n    y = 2;\n}\n", "dst.c").unwrap();
    let target = SyntaxTree::parse("void run(int x) {\n    x = 1;\n}\n", "tgt.c").unwrap();
    let insert = find(&destination, |n| {
        n.kind == NodeKind::BinaryOperator && n.value.as_deref() == Some("=")
    });
    let block = find(&target, |n| n.kind == NodeKind::CompoundStmt);
    let script =
        format!("Insert BinaryOperator({insert}) into CompoundStmt({block}) at 1\n");

    let first = patch(&destination, &target, &VariableMap::new(), &script).unwrap();
    let second = patch(&destination, &target, &VariableMap::new(), &script).unwrap();
    assert_eq!(first, second);
}

#[test]
fn delete_last_call_argument_takes_comma() {
    let destination = SyntaxTree::parse("int unused;\n", "dst.c").unwrap();
    let target = SyntaxTree::parse("void run(void) {\n    f(a, b);\n}\n", "tgt.c").unwrap();

    let arg = find(&target, |n| {
        n.kind == NodeKind::DeclRefExpr && n.value.as_deref() == Some("b")
    });

    let out = patch(
        &destination,
        &target,
        &VariableMap::new(),
        &format!("Delete DeclRefExpr({arg})\n"),
    )
    .unwrap();

    assert!(out.contains("f(a);"), "got:\n{out}");
}
