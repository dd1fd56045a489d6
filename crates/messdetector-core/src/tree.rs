//! Arena-backed syntax tree consumed by the rules
//!
//! Nodes are owned top-down by the [`SyntaxTree`]; the parent link is a plain
//! [`NodeId`] index, so upward navigation never shares ownership.
//! [`Node`] is a cheap borrowed handle that exposes the navigation
//! primitives the rules rely on.

use std::fmt;

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The closed set of node kinds produced by the lowering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Class,
    Function,
    Method,
    Closure,
    FormalParameters,
    FormalParameter,
    VariableDeclarator,
    ClosureUse,
    /// Body of a function, method or closure
    Scope,
    /// Any other block, or the wrapper of an unbraced body
    ScopeStatement,
    /// Statement without a dedicated kind (expression statements, break, ...)
    Statement,
    EchoStatement,
    ReturnStatement,
    ThrowStatement,
    IfStatement,
    ElseIfStatement,
    ElseStatement,
    SwitchStatement,
    SwitchLabel,
    TryStatement,
    CatchStatement,
    FinallyStatement,
    ForeachStatement,
    ForStatement,
    WhileStatement,
    DoWhileStatement,
    GlobalStatement,
    StaticStatement,
    /// Expression without a dedicated kind (binary, ternary, ...)
    Expression,
    AssignmentExpression,
    UnaryExpression,
    ListExpression,
    ArrayExpression,
    ArrayIndexExpression,
    IssetExpression,
    AllocationExpression,
    FunctionPostfix,
    MethodPostfix,
    PropertyPostfix,
    Arguments,
    NamedArgument,
    Variable,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::Class => "Class",
            NodeKind::Function => "Function",
            NodeKind::Method => "Method",
            NodeKind::Closure => "Closure",
            NodeKind::FormalParameters => "FormalParameters",
            NodeKind::FormalParameter => "FormalParameter",
            NodeKind::VariableDeclarator => "VariableDeclarator",
            NodeKind::ClosureUse => "ClosureUse",
            NodeKind::Scope => "Scope",
            NodeKind::ScopeStatement => "ScopeStatement",
            NodeKind::Statement => "Statement",
            NodeKind::EchoStatement => "EchoStatement",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::ThrowStatement => "ThrowStatement",
            NodeKind::IfStatement => "IfStatement",
            NodeKind::ElseIfStatement => "ElseIfStatement",
            NodeKind::ElseStatement => "ElseStatement",
            NodeKind::SwitchStatement => "SwitchStatement",
            NodeKind::SwitchLabel => "SwitchLabel",
            NodeKind::TryStatement => "TryStatement",
            NodeKind::CatchStatement => "CatchStatement",
            NodeKind::FinallyStatement => "FinallyStatement",
            NodeKind::ForeachStatement => "ForeachStatement",
            NodeKind::ForStatement => "ForStatement",
            NodeKind::WhileStatement => "WhileStatement",
            NodeKind::DoWhileStatement => "DoWhileStatement",
            NodeKind::GlobalStatement => "GlobalStatement",
            NodeKind::StaticStatement => "StaticStatement",
            NodeKind::Expression => "Expression",
            NodeKind::AssignmentExpression => "AssignmentExpression",
            NodeKind::UnaryExpression => "UnaryExpression",
            NodeKind::ListExpression => "ListExpression",
            NodeKind::ArrayExpression => "ArrayExpression",
            NodeKind::ArrayIndexExpression => "ArrayIndexExpression",
            NodeKind::IssetExpression => "IssetExpression",
            NodeKind::AllocationExpression => "AllocationExpression",
            NodeKind::FunctionPostfix => "FunctionPostfix",
            NodeKind::MethodPostfix => "MethodPostfix",
            NodeKind::PropertyPostfix => "PropertyPostfix",
            NodeKind::Arguments => "Arguments",
            NodeKind::NamedArgument => "NamedArgument",
            NodeKind::Variable => "Variable",
        }
    }

    /// Kinds that open a new variable scope
    pub fn is_callable_unit(&self) -> bool {
        matches!(self, NodeKind::Function | NodeKind::Method | NodeKind::Closure)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PHP superglobals; never treated as local variables
pub const SUPERGLOBALS: &[&str] = &[
    "$GLOBALS", "$_SERVER", "$_GET", "$_POST", "$_FILES", "$_COOKIE", "$_SESSION", "$_REQUEST",
    "$_ENV",
];

#[derive(Debug, Clone)]
struct SyntaxNode {
    kind: NodeKind,
    image: String,
    begin_line: usize,
    end_line: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    is_abstract: bool,
}

/// A syntax tree for one source file
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Create a tree holding only a `Program` root spanning the given lines
    pub fn new(begin_line: usize, end_line: usize) -> Self {
        Self {
            nodes: vec![SyntaxNode {
                kind: NodeKind::Program,
                image: String::new(),
                begin_line,
                end_line,
                parent: None,
                children: Vec::new(),
                is_abstract: false,
            }],
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> Node<'_> {
        self.node(self.root_id())
    }

    /// Append a node as the last child of `parent`
    pub fn push(
        &mut self,
        kind: NodeKind,
        image: impl Into<String>,
        begin_line: usize,
        end_line: usize,
        parent: NodeId,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            kind,
            image: image.into(),
            begin_line,
            end_line,
            parent: Some(parent),
            children: Vec::new(),
            is_abstract: false,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn set_abstract(&mut self, id: NodeId) {
        self.nodes[id.index()].is_abstract = true;
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root always exists
        false
    }

    /// Every function and method in the file, in document order
    ///
    /// Closures are not units; they are analyzed as part of their enclosing
    /// function or method.
    pub fn units(&self) -> Vec<Node<'_>> {
        self.root()
            .descendants()
            .filter(|n| matches!(n.kind(), NodeKind::Function | NodeKind::Method))
            .collect()
    }
}

/// Borrowed handle to a node of a [`SyntaxTree`]
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t SyntaxNode {
        &self.tree.nodes[self.id.index()]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.data().kind == kind
    }

    /// Textual identifier of the node (variable name, callee, keyword)
    pub fn image(&self) -> &'t str {
        &self.data().image
    }

    pub fn begin_line(&self) -> usize {
        self.data().begin_line
    }

    pub fn end_line(&self) -> usize {
        self.data().end_line
    }

    pub fn is_abstract(&self) -> bool {
        self.data().is_abstract
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| tree.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.data()
            .children
            .get(index)
            .map(|&id| self.tree.node(id))
    }

    /// Position of this node among its parent's children
    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.data().parent?;
        self.tree.nodes[parent.index()]
            .children
            .iter()
            .position(|&id| id == self.id)
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        let index = self.index_in_parent()?;
        self.parent()?.child(index + 1)
    }

    /// True when the node is the last child of its parent (the root counts as last)
    pub fn is_last_child(&self) -> bool {
        self.next_sibling().is_none()
    }

    pub fn first_child_of_kind(&self, kind: NodeKind) -> Option<Node<'t>> {
        self.children().find(|child| child.is(kind))
    }

    /// All strict descendants in pre-order
    pub fn descendants(&self) -> Descendants<'t> {
        let mut stack: Vec<NodeId> = self.data().children.clone();
        stack.reverse();
        Descendants {
            tree: self.tree,
            stack,
        }
    }

    pub fn descendants_of_kind(&self, kind: NodeKind) -> Vec<Node<'t>> {
        self.descendants().filter(|n| n.is(kind)).collect()
    }

    pub fn ancestors(&self) -> Ancestors<'t> {
        Ancestors {
            next: self.parent(),
        }
    }

    /// A variable read that belongs to the local symbol table
    ///
    /// `$this` and superglobals are excluded; property and static member
    /// names are never lowered as `Variable` nodes in the first place.
    pub fn is_local_variable(&self) -> bool {
        if !self.is(NodeKind::Variable) {
            return false;
        }
        let image = self.image();
        image != "$this" && !SUPERGLOBALS.contains(&image)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:?}) {}..{}",
            self.kind(),
            self.image(),
            self.begin_line(),
            self.end_line()
        )
    }
}

/// Pre-order iterator over a node's descendants
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = &self.tree.nodes[id.index()].children;
        self.stack.extend(children.iter().rev());
        Some(self.tree.node(id))
    }
}

/// Iterator walking up the parent chain
pub struct Ancestors<'t> {
    next: Option<Node<'t>>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
