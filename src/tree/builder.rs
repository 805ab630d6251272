/*!
# Tree builder

Converts the tree-sitter C concrete syntax tree into the pre-order
`SyntaxTree` arena, mapping grammar node kinds onto the engine's label set
and mirroring the child layouts the rewrite rules rely on: `IfStmt` is
`[cond, then, else?]`, `CallExpr` is `[callee, args...]`, a block-level
`declaration` becomes a `DeclStmt` wrapping its `VarDecl`s, and condition
expressions are unwrapped from their parentheses.
*/

use crate::core::{PatchError, Result, Span};
use crate::tree::{Node, NodeId, NodeKind, SyntaxTree};
use tree_sitter::{Node as TsNode, Parser};

pub(crate) fn build(source: String, file_name: String) -> Result<SyntaxTree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_c::LANGUAGE.into())
        .map_err(|e| PatchError::AstBuildFailed {
            file: file_name.clone(),
            reason: e.to_string(),
        })?;
    let ts_tree = parser
        .parse(&source, None)
        .ok_or_else(|| PatchError::AstBuildFailed {
            file: file_name.clone(),
            reason: "parser produced no tree".to_string(),
        })?;

    let mut builder = Builder {
        source: &source,
        file_name: &file_name,
        nodes: Vec::new(),
    };
    builder.add_root(ts_tree.root_node());
    let nodes = builder.nodes;
    Ok(SyntaxTree::from_parts(file_name, source, nodes))
}

struct Builder<'a> {
    source: &'a str,
    file_name: &'a str,
    nodes: Vec<Node>,
}

fn span_of(ts: TsNode) -> Span {
    Span::new(ts.start_byte(), ts.end_byte())
}

impl<'a> Builder<'a> {
    fn text(&self, ts: TsNode) -> &'a str {
        &self.source[ts.start_byte()..ts.end_byte()]
    }

    fn push(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            identifier: None,
            qualified_identifier: None,
            value: None,
            data_type: None,
            ref_type: None,
            file: None,
            is_arrow: false,
            is_static: None,
            operator_span: None,
            parent,
            children: Vec::new(),
            rightmost: id,
        });
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        id
    }

    /// Fixes the subtree bound once all descendants have been appended.
    fn seal(&mut self, id: NodeId) {
        let last = NodeId(self.nodes.len() as u32 - 1);
        self.nodes[id.index()].rightmost = last;
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn add_root(&mut self, root: TsNode) {
        let id = self.push(
            NodeKind::TranslationUnit,
            Span::new(0, self.source.len()),
            None,
        );
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            self.add_node(child, id);
        }
        self.seal(id);
    }

    fn add_node(&mut self, ts: TsNode, parent: NodeId) {
        match ts.kind() {
            "function_definition" => self.add_function(ts, parent),
            "declaration" => self.add_declaration(ts, parent),
            "compound_statement" => {
                let id = self.push(NodeKind::CompoundStmt, span_of(ts), Some(parent));
                self.add_named_children(ts, id);
                self.seal(id);
            }
            "if_statement" => self.add_if(ts, parent),
            "while_statement" => self.add_condition_stmt(NodeKind::WhileStmt, ts, parent),
            "switch_statement" => self.add_condition_stmt(NodeKind::SwitchStmt, ts, parent),
            "do_statement" => {
                let id = self.push(NodeKind::DoStmt, span_of(ts), Some(parent));
                if let Some(body) = ts.child_by_field_name("body") {
                    self.add_node(body, id);
                }
                if let Some(cond) = ts.child_by_field_name("condition") {
                    self.add_node(condition_inner(cond), id);
                }
                self.seal(id);
            }
            "for_statement" => {
                let id = self.push(NodeKind::ForStmt, span_of(ts), Some(parent));
                self.add_named_children(ts, id);
                self.seal(id);
            }
            "case_statement" => {
                let kind = if ts.child_by_field_name("value").is_some() {
                    NodeKind::CaseStmt
                } else {
                    NodeKind::DefaultStmt
                };
                let id = self.push(kind, span_of(ts), Some(parent));
                self.add_named_children(ts, id);
                self.seal(id);
            }
            "labeled_statement" => {
                let id = self.push(NodeKind::LabelStmt, span_of(ts), Some(parent));
                if let Some(label) = ts.child_by_field_name("label") {
                    let name = self.text(label).to_string();
                    self.node_mut(id).identifier = Some(name.clone());
                    self.node_mut(id).value = Some(name);
                }
                let mut cursor = ts.walk();
                for child in ts.named_children(&mut cursor) {
                    if child.kind() != "statement_identifier" {
                        self.add_node(child, id);
                    }
                }
                self.seal(id);
            }
            "goto_statement" => {
                let id = self.push(NodeKind::GotoStmt, span_of(ts), Some(parent));
                if let Some(label) = ts.child_by_field_name("label") {
                    let name = self.text(label).to_string();
                    self.node_mut(id).value = Some(name);
                }
                self.seal(id);
            }
            "return_statement" => {
                let id = self.push(NodeKind::ReturnStmt, span_of(ts), Some(parent));
                self.add_named_children(ts, id);
                self.seal(id);
            }
            "break_statement" => {
                let id = self.push(NodeKind::BreakStmt, span_of(ts), Some(parent));
                self.seal(id);
            }
            "continue_statement" => {
                let id = self.push(NodeKind::ContinueStmt, span_of(ts), Some(parent));
                self.seal(id);
            }
            "binary_expression" | "assignment_expression" => {
                let id = self.push(NodeKind::BinaryOperator, span_of(ts), Some(parent));
                if let Some(op) = ts.child_by_field_name("operator") {
                    self.node_mut(id).value = Some(self.text(op).to_string());
                    self.node_mut(id).operator_span = Some(span_of(op));
                }
                if let Some(lhs) = ts.child_by_field_name("left") {
                    self.add_node(lhs, id);
                }
                if let Some(rhs) = ts.child_by_field_name("right") {
                    self.add_node(rhs, id);
                }
                self.seal(id);
            }
            "unary_expression" | "pointer_expression" | "update_expression" => {
                let id = self.push(NodeKind::UnaryOperator, span_of(ts), Some(parent));
                if let Some(op) = ts.child_by_field_name("operator") {
                    self.node_mut(id).value = Some(self.text(op).to_string());
                    self.node_mut(id).operator_span = Some(span_of(op));
                }
                if let Some(arg) = ts.child_by_field_name("argument") {
                    self.add_node(arg, id);
                }
                self.seal(id);
            }
            "conditional_expression" => {
                let id = self.push(NodeKind::ConditionalOperator, span_of(ts), Some(parent));
                self.add_named_children(ts, id);
                self.seal(id);
            }
            "call_expression" => {
                let id = self.push(NodeKind::CallExpr, span_of(ts), Some(parent));
                if let Some(callee) = ts.child_by_field_name("function") {
                    self.add_node(callee, id);
                }
                if let Some(args) = ts.child_by_field_name("arguments") {
                    self.add_named_children(args, id);
                }
                self.seal(id);
            }
            "field_expression" => {
                let id = self.push(NodeKind::MemberExpr, span_of(ts), Some(parent));
                let op = ts.child_by_field_name("operator");
                let member = ts.child_by_field_name("field");
                if let (Some(op), Some(member)) = (op, member) {
                    let op_text = self.text(op).to_string();
                    let member_text = self.text(member).to_string();
                    self.node_mut(id).is_arrow = op_text == "->";
                    self.node_mut(id).operator_span = Some(span_of(op));
                    self.node_mut(id).value = Some(format!("{op_text}{member_text}"));
                    self.node_mut(id).identifier = Some(member_text);
                }
                if let Some(base) = ts.child_by_field_name("argument") {
                    self.add_node(base, id);
                }
                self.seal(id);
            }
            "subscript_expression" => {
                let id = self.push(NodeKind::ArraySubscriptExpr, span_of(ts), Some(parent));
                if let Some(base) = ts.child_by_field_name("argument") {
                    self.add_node(base, id);
                }
                if let Some(index) = ts.child_by_field_name("index") {
                    self.add_node(index, id);
                }
                self.seal(id);
            }
            "parenthesized_expression" => {
                let id = self.push(NodeKind::ParenExpr, span_of(ts), Some(parent));
                self.add_named_children(ts, id);
                self.seal(id);
            }
            "cast_expression" => {
                let id = self.push(NodeKind::CStyleCastExpr, span_of(ts), Some(parent));
                if let Some(ty) = ts.child_by_field_name("type") {
                    self.node_mut(id).data_type = Some(self.text(ty).to_string());
                }
                if let Some(value) = ts.child_by_field_name("value") {
                    self.add_node(value, id);
                }
                self.seal(id);
            }
            "initializer_list" => {
                let id = self.push(NodeKind::InitListExpr, span_of(ts), Some(parent));
                self.node_mut(id).file = Some(self.file_name.to_string());
                self.add_named_children(ts, id);
                self.seal(id);
            }
            "identifier" => {
                let id = self.push(NodeKind::DeclRefExpr, span_of(ts), Some(parent));
                let name = self.text(ts).to_string();
                self.node_mut(id).ref_type = Some(ref_type_of(ts));
                self.node_mut(id).identifier = Some(name.clone());
                self.node_mut(id).value = Some(name);
                self.seal(id);
            }
            "number_literal" => {
                let text = self.text(ts);
                let kind = if text.contains('.')
                    || (!text.starts_with("0x") && !text.starts_with("0X")
                        && (text.contains('e') || text.contains('E')))
                {
                    NodeKind::FloatingLiteral
                } else {
                    NodeKind::IntegerLiteral
                };
                let id = self.push(kind, span_of(ts), Some(parent));
                self.node_mut(id).value = Some(text.to_string());
                self.seal(id);
            }
            "string_literal" | "concatenated_string" => {
                let id = self.push(NodeKind::StringLiteral, span_of(ts), Some(parent));
                self.node_mut(id).value = Some(unquote(self.text(ts)).to_string());
                self.seal(id);
            }
            "char_literal" => {
                let id = self.push(NodeKind::CharacterLiteral, span_of(ts), Some(parent));
                self.node_mut(id).value = Some(self.text(ts).to_string());
                self.seal(id);
            }
            "struct_specifier" | "union_specifier" => {
                // A bodyless specifier is a type reference, not a declaration.
                let Some(body) = ts.child_by_field_name("body") else {
                    return;
                };
                let id = self.push(NodeKind::RecordDecl, span_of(ts), Some(parent));
                self.node_mut(id).file = Some(self.file_name.to_string());
                if let Some(name) = ts.child_by_field_name("name") {
                    let name = self.text(name).to_string();
                    self.node_mut(id).identifier = Some(name.clone());
                    self.node_mut(id).value = Some(name);
                }
                self.add_named_children(body, id);
                self.seal(id);
            }
            "field_declaration" => {
                let id = self.push(NodeKind::FieldDecl, span_of(ts), Some(parent));
                self.node_mut(id).file = Some(self.file_name.to_string());
                if let Some(ty) = ts.child_by_field_name("type") {
                    self.node_mut(id).data_type = Some(self.text(ty).to_string());
                }
                let mut cursor = ts.walk();
                let declarator = ts.children_by_field_name("declarator", &mut cursor).next();
                if let Some(name) = declarator.and_then(|d| self.declarator_name(d)) {
                    self.node_mut(id).identifier = Some(name.clone());
                    self.node_mut(id).value = Some(name);
                }
                self.seal(id);
            }
            "enum_specifier" => {
                let Some(body) = ts.child_by_field_name("body") else {
                    return;
                };
                let id = self.push(NodeKind::EnumDecl, span_of(ts), Some(parent));
                self.node_mut(id).file = Some(self.file_name.to_string());
                if let Some(name) = ts.child_by_field_name("name") {
                    let name = self.text(name).to_string();
                    self.node_mut(id).identifier = Some(name.clone());
                    self.node_mut(id).value = Some(name);
                }
                self.add_named_children(body, id);
                self.seal(id);
            }
            "enumerator" => {
                let id = self.push(NodeKind::EnumConstantDecl, span_of(ts), Some(parent));
                self.node_mut(id).file = Some(self.file_name.to_string());
                if let Some(name) = ts.child_by_field_name("name") {
                    let name = self.text(name).to_string();
                    self.node_mut(id).identifier = Some(name.clone());
                    self.node_mut(id).value = Some(name);
                }
                if let Some(value) = ts.child_by_field_name("value") {
                    self.add_node(value, id);
                }
                self.seal(id);
            }
            "type_definition" => {
                let id = self.push(NodeKind::TypedefDecl, span_of(ts), Some(parent));
                self.node_mut(id).file = Some(self.file_name.to_string());
                if let Some(ty) = ts.child_by_field_name("type") {
                    self.node_mut(id).data_type = Some(self.text(ty).to_string());
                }
                let mut cursor = ts.walk();
                let declarator = ts.children_by_field_name("declarator", &mut cursor).next();
                if let Some(name) = declarator.and_then(|d| self.declarator_name(d)) {
                    self.node_mut(id).identifier = Some(name.clone());
                    self.node_mut(id).value = Some(name);
                }
                self.seal(id);
            }
            "preproc_def" | "preproc_function_def" => {
                let mut span = span_of(ts);
                // The grammar includes the directive's newline terminator.
                if self.source[..span.end].ends_with('\n') {
                    span.end -= 1;
                }
                let id = self.push(NodeKind::Macro, span, Some(parent));
                self.node_mut(id).file = Some(self.file_name.to_string());
                if let Some(name) = ts.child_by_field_name("name") {
                    let name = self.text(name).to_string();
                    self.node_mut(id).identifier = Some(name.clone());
                    self.node_mut(id).value = Some(name);
                }
                self.seal(id);
            }
            "null_statement" => {
                let id = self.push(NodeKind::NullStmt, span_of(ts), Some(parent));
                self.seal(id);
            }
            "comment" | "preproc_include" => {}
            // Wrappers with no counterpart of their own: hoist their
            // children to the current parent.
            _ => self.add_named_children(ts, parent),
        }
    }

    fn add_named_children(&mut self, ts: TsNode, parent: NodeId) {
        let mut cursor = ts.walk();
        for child in ts.named_children(&mut cursor) {
            self.add_node(child, parent);
        }
    }

    fn add_function(&mut self, ts: TsNode, parent: NodeId) {
        let id = self.push(NodeKind::FunctionDecl, span_of(ts), Some(parent));
        self.node_mut(id).file = Some(self.file_name.to_string());
        if let Some(ty) = ts.child_by_field_name("type") {
            self.node_mut(id).data_type = Some(self.text(ty).to_string());
        }
        let declarator = ts.child_by_field_name("declarator");
        if let Some(name) = declarator.and_then(|d| self.declarator_name(d)) {
            self.node_mut(id).identifier = Some(name.clone());
            self.node_mut(id).value = Some(name);
        }
        if let Some(params) = declarator
            .and_then(function_declarator_of)
            .and_then(|d| d.child_by_field_name("parameters"))
        {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                if param.kind() != "parameter_declaration" {
                    continue;
                }
                let Some(name) = param
                    .child_by_field_name("declarator")
                    .and_then(|d| self.declarator_name(d))
                else {
                    continue; // e.g. `void` parameter lists
                };
                let pid = self.push(NodeKind::ParmVarDecl, span_of(param), Some(id));
                self.node_mut(pid).identifier = Some(name.clone());
                self.node_mut(pid).value = Some(name);
                if let Some(ty) = param.child_by_field_name("type") {
                    self.node_mut(pid).data_type = Some(self.text(ty).to_string());
                }
                self.seal(pid);
            }
        }
        if let Some(body) = ts.child_by_field_name("body") {
            self.add_node(body, id);
        }
        self.seal(id);
    }

    fn add_declaration(&mut self, ts: TsNode, parent: NodeId) {
        let top_level = self.nodes[parent.index()].kind == NodeKind::TranslationUnit;
        let type_text = ts
            .child_by_field_name("type")
            .map(|ty| self.text(ty).to_string());
        let is_static = {
            let mut cursor = ts.walk();
            let result = ts
                .named_children(&mut cursor)
                .any(|c| c.kind() == "storage_class_specifier" && self.text(c) == "static");
            result
        };

        let mut cursor = ts.walk();
        let declarators: Vec<TsNode> = ts
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        // Statement-level declarations get a DeclStmt wrapper spanning the
        // whole statement including the terminator; the VarDecls stop short
        // of it so that range expansion has a delimiter to absorb.
        let holder = if top_level {
            parent
        } else {
            self.push(NodeKind::DeclStmt, span_of(ts), Some(parent))
        };

        let decl_span = span_of(ts);
        let without_semi = if self.source[..decl_span.end].ends_with(';') {
            Span::new(decl_span.begin, decl_span.end - 1)
        } else {
            decl_span
        };

        for (i, declarator) in declarators.iter().enumerate() {
            let span = if declarators.len() == 1 {
                without_semi
            } else if i == 0 {
                Span::new(decl_span.begin, span_of(*declarator).end)
            } else {
                span_of(*declarator)
            };
            // A prototype declares a function, not an object.
            let kind = if function_declarator_of(*declarator).is_some() {
                NodeKind::FunctionDecl
            } else {
                NodeKind::VarDecl
            };
            let vid = self.push(kind, span, Some(holder));
            if kind == NodeKind::VarDecl {
                self.node_mut(vid).is_static = Some(is_static);
            }
            self.node_mut(vid).data_type = type_text.clone();
            if top_level {
                self.node_mut(vid).file = Some(self.file_name.to_string());
            }
            if let Some(name) = self.declarator_name(*declarator) {
                self.node_mut(vid).identifier = Some(name.clone());
                self.node_mut(vid).value = Some(name);
            }
            if declarator.kind() == "init_declarator" {
                if let Some(init) = declarator.child_by_field_name("value") {
                    self.add_node(init, vid);
                }
            }
            self.seal(vid);
        }

        if holder != parent {
            self.seal(holder);
        }
    }

    fn add_if(&mut self, ts: TsNode, parent: NodeId) {
        let id = self.push(NodeKind::IfStmt, span_of(ts), Some(parent));
        if let Some(cond) = ts.child_by_field_name("condition") {
            self.add_node(condition_inner(cond), id);
        }
        if let Some(then) = ts.child_by_field_name("consequence") {
            self.add_node(then, id);
        }
        if let Some(alt) = ts.child_by_field_name("alternative") {
            // else_clause wraps the else branch statement.
            let mut cursor = alt.walk();
            for child in alt.named_children(&mut cursor) {
                self.add_node(child, id);
            }
        }
        self.seal(id);
    }

    fn add_condition_stmt(&mut self, kind: NodeKind, ts: TsNode, parent: NodeId) {
        let id = self.push(kind, span_of(ts), Some(parent));
        if let Some(cond) = ts.child_by_field_name("condition") {
            self.add_node(condition_inner(cond), id);
        }
        if let Some(body) = ts.child_by_field_name("body") {
            self.add_node(body, id);
        }
        self.seal(id);
    }

    /// Descends declarator wrappers to the declared name.
    fn declarator_name(&self, declarator: TsNode) -> Option<String> {
        match declarator.kind() {
            "identifier" | "field_identifier" | "type_identifier" => {
                Some(self.text(declarator).to_string())
            }
            "init_declarator"
            | "pointer_declarator"
            | "function_declarator"
            | "array_declarator"
            | "parenthesized_declarator" => {
                let inner = declarator
                    .child_by_field_name("declarator")
                    .or_else(|| declarator.named_child(0))?;
                self.declarator_name(inner)
            }
            _ => None,
        }
    }
}

/// Conditions are wrapped in parentheses by the grammar; the engine's
/// condition child is the expression inside them.
fn condition_inner(cond: TsNode) -> TsNode {
    if cond.kind() == "parenthesized_expression" {
        cond.named_child(0).unwrap_or(cond)
    } else {
        cond
    }
}

/// The innermost function_declarator of a possibly pointer-wrapped
/// declarator chain.
fn function_declarator_of(declarator: TsNode) -> Option<TsNode> {
    match declarator.kind() {
        "function_declarator" => Some(declarator),
        "pointer_declarator" | "parenthesized_declarator" => {
            function_declarator_of(declarator.child_by_field_name("declarator")?)
        }
        _ => None,
    }
}

/// Function reference when the identifier is a call's callee, data
/// reference otherwise.
fn ref_type_of(ts: TsNode) -> NodeKind {
    if let Some(parent) = ts.parent() {
        if parent.kind() == "call_expression" {
            if let Some(callee) = parent.child_by_field_name("function") {
                if callee.id() == ts.id() {
                    return NodeKind::FunctionDecl;
                }
            }
        }
    }
    NodeKind::VarDecl
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> SyntaxTree {
        SyntaxTree::parse(src, "test.c").unwrap()
    }

    fn find(tree: &SyntaxTree, kind: NodeKind) -> Option<NodeId> {
        tree.preorder().find(|&id| tree.get(id).unwrap().kind == kind)
    }

    #[test]
    fn test_function_layout() {
        let tree = parse("int add(int a, int b) {\n    return a + b;\n}\n");
        let func = find(&tree, NodeKind::FunctionDecl).unwrap();
        let node = tree.node(func).unwrap();
        assert_eq!(node.identifier.as_deref(), Some("add"));
        assert_eq!(node.data_type.as_deref(), Some("int"));
        assert_eq!(node.file.as_deref(), Some("test.c"));
        // Parameters precede the body.
        let kinds: Vec<NodeKind> = node
            .children
            .iter()
            .map(|&c| tree.node(c).unwrap().kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::ParmVarDecl,
                NodeKind::ParmVarDecl,
                NodeKind::CompoundStmt
            ]
        );
    }

    #[test]
    fn test_if_children_are_cond_then() {
        let tree = parse("void f(int a) {\n    if (a > 0) {\n        a = 1;\n    } else {\n        a = 2;\n    }\n}\n");
        let if_id = find(&tree, NodeKind::IfStmt).unwrap();
        let children = tree.children(if_id).unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(tree.node(children[0]).unwrap().kind, NodeKind::BinaryOperator);
        assert_eq!(tree.node(children[1]).unwrap().kind, NodeKind::CompoundStmt);
        assert_eq!(tree.node(children[2]).unwrap().kind, NodeKind::CompoundStmt);
        // The condition span excludes the parentheses.
        assert_eq!(tree.node_text(children[0]).unwrap(), "a > 0");
    }

    #[test]
    fn test_call_children_start_with_callee() {
        let tree = parse("void g(void) {\n    f(a, b);\n}\n");
        let call = find(&tree, NodeKind::CallExpr).unwrap();
        let children = tree.children(call).unwrap();
        assert_eq!(children.len(), 3);
        let callee = tree.node(children[0]).unwrap();
        assert_eq!(callee.kind, NodeKind::DeclRefExpr);
        assert_eq!(callee.ref_type, Some(NodeKind::FunctionDecl));
        let arg = tree.node(children[1]).unwrap();
        assert_eq!(arg.ref_type, Some(NodeKind::VarDecl));
    }

    #[test]
    fn test_declaration_wraps_decl_stmt_in_blocks() {
        let tree = parse("void f(void) {\n    int x = 5;\n}\n");
        let decl = find(&tree, NodeKind::DeclStmt).unwrap();
        let var = tree.children(decl).unwrap()[0];
        let var_node = tree.node(var).unwrap();
        assert_eq!(var_node.kind, NodeKind::VarDecl);
        assert_eq!(var_node.identifier.as_deref(), Some("x"));
        // The VarDecl stops before the terminator, the DeclStmt takes it.
        assert_eq!(tree.node_text(var).unwrap(), "int x = 5");
        assert!(tree.node_text(decl).unwrap().ends_with(';'));
        // Block-level declarations carry no file attribute.
        assert!(var_node.file.is_none());
        assert_eq!(var_node.is_static, Some(false));
    }

    #[test]
    fn test_top_level_var_has_no_decl_stmt() {
        let tree = parse("static int counter = 0;\n");
        assert!(find(&tree, NodeKind::DeclStmt).is_none());
        let var = find(&tree, NodeKind::VarDecl).unwrap();
        let node = tree.node(var).unwrap();
        assert_eq!(node.is_static, Some(true));
        assert_eq!(node.file.as_deref(), Some("test.c"));
    }

    #[test]
    fn test_member_expr_value_and_arrow() {
        let tree = parse("void f(struct s *p) {\n    p->len = 0;\n    (*p).cap = 1;\n}\n");
        let members: Vec<NodeId> = tree
            .preorder()
            .filter(|&id| tree.get(id).unwrap().kind == NodeKind::MemberExpr)
            .collect();
        assert_eq!(members.len(), 2);
        let arrow = tree.node(members[0]).unwrap();
        assert!(arrow.is_arrow);
        assert_eq!(arrow.value.as_deref(), Some("->len"));
        assert_eq!(arrow.identifier.as_deref(), Some("len"));
        let dot = tree.node(members[1]).unwrap();
        assert!(!dot.is_arrow);
        assert_eq!(dot.value.as_deref(), Some(".cap"));
    }

    #[test]
    fn test_macro_and_enum() {
        let tree = parse("#define LIMIT 10\nenum color { RED, GREEN };\n");
        let mac = find(&tree, NodeKind::Macro).unwrap();
        assert_eq!(tree.node(mac).unwrap().value.as_deref(), Some("LIMIT"));
        let en = find(&tree, NodeKind::EnumDecl).unwrap();
        let constants = tree.children(en).unwrap();
        assert_eq!(constants.len(), 2);
        assert_eq!(
            tree.node(constants[0]).unwrap().kind,
            NodeKind::EnumConstantDecl
        );
    }

    #[test]
    fn test_string_literal_value_is_unquoted() {
        let tree = parse("void f(void) {\n    g(\"hello world\");\n}\n");
        let lit = find(&tree, NodeKind::StringLiteral).unwrap();
        assert_eq!(tree.node(lit).unwrap().value.as_deref(), Some("hello world"));
    }

    #[test]
    fn test_binary_operator_records_spelling() {
        let tree = parse("void f(int a) {\n    a = a + 1;\n}\n");
        let ops: Vec<&str> = tree
            .preorder()
            .filter_map(|id| {
                let n = tree.get(id).unwrap();
                (n.kind == NodeKind::BinaryOperator).then(|| n.value.as_deref().unwrap())
            })
            .collect();
        assert_eq!(ops, vec!["=", "+"]);
    }
}
