/*!
# Syntax tree view

A positioned, immutable view of one parsed source file. Nodes live in a
pre-order arena: a node's id is its index in the vector, every parent id is
smaller than its children's ids, and `[id, rightmost_descendant]` is exactly
the subtree slice. Parents and children are stored as ids, so there are no
ownership cycles and bulk subtree operations are contiguous-slice walks.
*/

pub mod builder;
pub mod json;
pub mod ranges;

use crate::core::{LineIndex, PatchError, Position, Result, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node identifier, assigned in pre-order within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node kind labels. The string spellings survive only in script parsing,
/// the JSON dump and log output; everything else dispatches on the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    TranslationUnit,
    FunctionDecl,
    ParmVarDecl,
    VarDecl,
    FieldDecl,
    RecordDecl,
    EnumDecl,
    EnumConstantDecl,
    TypedefDecl,
    FileScopeAsmDecl,
    Macro,
    CompoundStmt,
    DeclStmt,
    IfStmt,
    WhileStmt,
    DoStmt,
    ForStmt,
    SwitchStmt,
    CaseStmt,
    DefaultStmt,
    BreakStmt,
    ContinueStmt,
    ReturnStmt,
    LabelStmt,
    GotoStmt,
    NullStmt,
    BinaryOperator,
    UnaryOperator,
    ConditionalOperator,
    CallExpr,
    MemberExpr,
    ArraySubscriptExpr,
    InitListExpr,
    ParenExpr,
    CStyleCastExpr,
    DeclRefExpr,
    StringLiteral,
    CharacterLiteral,
    IntegerLiteral,
    FloatingLiteral,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "TranslationUnit",
            NodeKind::FunctionDecl => "FunctionDecl",
            NodeKind::ParmVarDecl => "ParmVarDecl",
            NodeKind::VarDecl => "VarDecl",
            NodeKind::FieldDecl => "FieldDecl",
            NodeKind::RecordDecl => "RecordDecl",
            NodeKind::EnumDecl => "EnumDecl",
            NodeKind::EnumConstantDecl => "EnumConstantDecl",
            NodeKind::TypedefDecl => "TypedefDecl",
            NodeKind::FileScopeAsmDecl => "FileScopeAsmDecl",
            NodeKind::Macro => "Macro",
            NodeKind::CompoundStmt => "CompoundStmt",
            NodeKind::DeclStmt => "DeclStmt",
            NodeKind::IfStmt => "IfStmt",
            NodeKind::WhileStmt => "WhileStmt",
            NodeKind::DoStmt => "DoStmt",
            NodeKind::ForStmt => "ForStmt",
            NodeKind::SwitchStmt => "SwitchStmt",
            NodeKind::CaseStmt => "CaseStmt",
            NodeKind::DefaultStmt => "DefaultStmt",
            NodeKind::BreakStmt => "BreakStmt",
            NodeKind::ContinueStmt => "ContinueStmt",
            NodeKind::ReturnStmt => "ReturnStmt",
            NodeKind::LabelStmt => "LabelStmt",
            NodeKind::GotoStmt => "GotoStmt",
            NodeKind::NullStmt => "NullStmt",
            NodeKind::BinaryOperator => "BinaryOperator",
            NodeKind::UnaryOperator => "UnaryOperator",
            NodeKind::ConditionalOperator => "ConditionalOperator",
            NodeKind::CallExpr => "CallExpr",
            NodeKind::MemberExpr => "MemberExpr",
            NodeKind::ArraySubscriptExpr => "ArraySubscriptExpr",
            NodeKind::InitListExpr => "InitListExpr",
            NodeKind::ParenExpr => "ParenExpr",
            NodeKind::CStyleCastExpr => "CStyleCastExpr",
            NodeKind::DeclRefExpr => "DeclRefExpr",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::CharacterLiteral => "CharacterLiteral",
            NodeKind::IntegerLiteral => "IntegerLiteral",
            NodeKind::FloatingLiteral => "FloatingLiteral",
        }
    }

    pub fn parse_label(label: &str) -> Option<NodeKind> {
        Some(match label {
            "TranslationUnit" => NodeKind::TranslationUnit,
            "FunctionDecl" => NodeKind::FunctionDecl,
            "ParmVarDecl" => NodeKind::ParmVarDecl,
            "VarDecl" => NodeKind::VarDecl,
            "FieldDecl" => NodeKind::FieldDecl,
            "RecordDecl" => NodeKind::RecordDecl,
            "EnumDecl" => NodeKind::EnumDecl,
            "EnumConstantDecl" => NodeKind::EnumConstantDecl,
            "TypedefDecl" => NodeKind::TypedefDecl,
            "FileScopeAsmDecl" => NodeKind::FileScopeAsmDecl,
            "Macro" => NodeKind::Macro,
            "CompoundStmt" => NodeKind::CompoundStmt,
            "DeclStmt" => NodeKind::DeclStmt,
            "IfStmt" => NodeKind::IfStmt,
            "WhileStmt" => NodeKind::WhileStmt,
            "DoStmt" => NodeKind::DoStmt,
            "ForStmt" => NodeKind::ForStmt,
            "SwitchStmt" => NodeKind::SwitchStmt,
            "CaseStmt" => NodeKind::CaseStmt,
            "DefaultStmt" => NodeKind::DefaultStmt,
            "BreakStmt" => NodeKind::BreakStmt,
            "ContinueStmt" => NodeKind::ContinueStmt,
            "ReturnStmt" => NodeKind::ReturnStmt,
            "LabelStmt" => NodeKind::LabelStmt,
            "GotoStmt" => NodeKind::GotoStmt,
            "NullStmt" => NodeKind::NullStmt,
            "BinaryOperator" => NodeKind::BinaryOperator,
            "UnaryOperator" => NodeKind::UnaryOperator,
            "ConditionalOperator" => NodeKind::ConditionalOperator,
            "CallExpr" => NodeKind::CallExpr,
            "MemberExpr" => NodeKind::MemberExpr,
            "ArraySubscriptExpr" => NodeKind::ArraySubscriptExpr,
            "InitListExpr" => NodeKind::InitListExpr,
            "ParenExpr" => NodeKind::ParenExpr,
            "CStyleCastExpr" => NodeKind::CStyleCastExpr,
            "DeclRefExpr" => NodeKind::DeclRefExpr,
            "StringLiteral" => NodeKind::StringLiteral,
            "CharacterLiteral" => NodeKind::CharacterLiteral,
            "IntegerLiteral" => NodeKind::IntegerLiteral,
            "FloatingLiteral" => NodeKind::FloatingLiteral,
            _ => return None,
        })
    }

    /// Declarations whose file name is recorded in the JSON dump.
    pub fn carries_file(self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDecl
                | NodeKind::TypedefDecl
                | NodeKind::RecordDecl
                | NodeKind::InitListExpr
                | NodeKind::FieldDecl
                | NodeKind::EnumDecl
                | NodeKind::EnumConstantDecl
                | NodeKind::Macro
                | NodeKind::VarDecl
                | NodeKind::FileScopeAsmDecl
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One AST element with its positional and textual attributes.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Byte range of the node in the owning tree's buffer.
    pub span: Span,
    /// Declared or referenced name, when the node has one.
    pub identifier: Option<String>,
    pub qualified_identifier: Option<String>,
    /// Literal text, operator spelling, declared name, or the
    /// `.member` / `->member` access spelling for `MemberExpr`.
    pub value: Option<String>,
    pub data_type: Option<String>,
    /// Referent kind for `DeclRefExpr` (function vs. data reference).
    pub ref_type: Option<NodeKind>,
    /// File the declaration came from, for declaration kinds.
    pub file: Option<String>,
    /// `a->b` vs `a.b` for `MemberExpr`.
    pub is_arrow: bool,
    /// Static storage, recorded for `VarDecl` only.
    pub is_static: Option<bool>,
    /// Span of the operator token: the infix operator of a
    /// `BinaryOperator`, the `.`/`->` of a `MemberExpr`.
    pub operator_span: Option<Span>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Id of the last node of this subtree under pre-order.
    pub rightmost: NodeId,
}

/// Pre-order indexed, append-only syntax tree over one source buffer.
/// Immutable once built.
pub struct SyntaxTree {
    file_name: String,
    source: String,
    nodes: Vec<Node>,
    line_index: LineIndex,
}

impl SyntaxTree {
    /// Parses a C source buffer into a positioned tree.
    pub fn parse(source: impl Into<String>, file_name: impl Into<String>) -> Result<SyntaxTree> {
        builder::build(source.into(), file_name.into())
    }

    /// Reads and parses a C source file.
    pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<SyntaxTree> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::parse(source, path.to_string_lossy().into_owned())
    }

    pub(crate) fn from_parts(file_name: String, source: String, nodes: Vec<Node>) -> SyntaxTree {
        let line_index = LineIndex::new(&source);
        SyntaxTree {
            file_name,
            source,
            nodes,
            line_index,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Resolves a node id, failing with `NodeNotFound` when out of range.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or_else(|| PatchError::NodeNotFound {
            tree: self.file_name.clone(),
            id: id.0,
        })
    }

    /// Ids in pre-order, which is ascending id order by construction.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// The contiguous id range `[id, rightmost]` covering a subtree.
    pub fn subtree(&self, id: NodeId) -> Result<std::ops::RangeInclusive<u32>> {
        let node = self.node(id)?;
        Ok(id.0..=node.rightmost.0)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Index of `id` among its parent's children.
    pub fn position_in_parent(&self, id: NodeId) -> Result<Option<usize>> {
        let node = self.node(id)?;
        let Some(parent) = node.parent else {
            return Ok(None);
        };
        Ok(self.node(parent)?.children.iter().position(|&c| c == id))
    }

    /// Source bytes of a span. Fails when the span falls outside the buffer
    /// or off a character boundary.
    pub fn text(&self, span: Span) -> Result<&str> {
        self.source
            .get(span.begin..span.end)
            .ok_or_else(|| PatchError::RangeUnavailable {
                file: self.file_name.clone(),
                span,
            })
    }

    /// Source bytes spanned by a node.
    pub fn node_text(&self, id: NodeId) -> Result<&str> {
        let span = self.node(id)?.span;
        self.text(span)
    }

    /// 1-based line/column of a byte offset.
    pub fn position(&self, offset: usize) -> Position {
        self.line_index.to_position(offset)
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// The byte intervals belonging directly to a node: its span minus the
    /// spans of its children, in source order. Concatenated with the child
    /// spans they tile the node's span exactly.
    pub fn owned_ranges(&self, id: NodeId) -> Result<Vec<Span>> {
        let node = self.node(id)?;
        let mut ranges = Vec::new();
        let mut cursor = node.span.begin;
        for &child in &node.children {
            let child_span = self.node(child)?.span;
            let begin = child_span.begin.clamp(node.span.begin, node.span.end);
            let end = child_span.end.clamp(node.span.begin, node.span.end);
            if cursor < begin {
                ranges.push(Span::new(cursor, begin));
            }
            cursor = cursor.max(end);
        }
        if cursor < node.span.end {
            ranges.push(Span::new(cursor, node.span.end));
        }
        Ok(ranges)
    }

    /// Range extended to absorb a trailing delimiter so that removal keeps
    /// the surrounding syntax intact.
    pub fn deletion_range(&self, id: NodeId) -> Result<Span> {
        let node = self.node(id)?;
        Ok(self.expand_range(node.span))
    }

    /// Range expansion: if the token following `span.end` is a `;`, a `,`,
    /// or an immediately adjacent identifier, extend the end over it.
    pub fn expand_range(&self, span: Span) -> Span {
        ranges::expand(&self.source, span)
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("file_name", &self.file_name)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
