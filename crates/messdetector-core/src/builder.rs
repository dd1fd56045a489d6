//! Lowering of a mago PHP program into a [`SyntaxTree`]
//!
//! The builder walks the mago AST the same way the analysis visitors do and
//! emits one node per construct the rules care about. Constructs the rules
//! never inspect (literals, arrow functions, `match`) become opaque
//! `Expression` leaves so that argument positions stay intact.

use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;

use crate::line_index::LineIndex;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

/// Builds a [`SyntaxTree`] from a parsed program
pub struct TreeBuilder<'s> {
    source: &'s str,
    lines: LineIndex,
    tree: SyntaxTree,
}

impl<'s> TreeBuilder<'s> {
    pub fn new(source: &'s str) -> Self {
        let lines = LineIndex::new(source);
        let tree = SyntaxTree::new(1, lines.line_count());
        Self {
            source,
            lines,
            tree,
        }
    }

    /// Lower a whole program
    pub fn build(mut self, program: &Program<'_>) -> SyntaxTree {
        let root = self.tree.root_id();
        for stmt in program.statements.iter() {
            self.statement(stmt, root);
        }
        self.tree
    }

    fn text(&self, span: Span) -> &'s str {
        let start = span.start.offset as usize;
        let end = span.end.offset as usize;
        self.source.get(start..end).unwrap_or("")
    }

    /// Source text between two offsets, trimmed (operator tokens)
    fn between(&self, start: usize, end: usize) -> &'s str {
        if start >= end {
            return "";
        }
        self.source.get(start..end).unwrap_or("").trim()
    }

    fn push(&mut self, kind: NodeKind, image: &str, span: Span, parent: NodeId) -> NodeId {
        let (begin, end) = self.lines.lines(span);
        self.tree.push(kind, image, begin, end, parent)
    }

    fn push_lines(
        &mut self,
        kind: NodeKind,
        image: &str,
        (begin, end): (usize, usize),
        parent: NodeId,
    ) -> NodeId {
        self.tree.push(kind, image, begin, end, parent)
    }

    /// Lines covered by a statement list, falling back to `outer` when empty
    fn sequence_lines<'a, 'b, I>(&self, stmts: I, outer: Span) -> (usize, usize)
    where
        I: IntoIterator<Item = &'a Statement<'b>>,
        'b: 'a,
    {
        let mut first = None;
        let mut last = None;
        for stmt in stmts {
            let span = stmt.span();
            if first.is_none() {
                first = Some(span);
            }
            last = Some(span);
        }
        match (first, last) {
            (Some(first), Some(last)) => {
                (self.lines.lines(first).0, self.lines.lines(last).1)
            }
            _ => self.lines.lines(outer),
        }
    }

    // ==================== Statements ====================

    fn statement(&mut self, stmt: &Statement<'_>, parent: NodeId) {
        match stmt {
            Statement::Expression(expr_stmt) => {
                if let Expression::Throw(throw) = &expr_stmt.expression {
                    let id = self.push(NodeKind::ThrowStatement, "throw", stmt.span(), parent);
                    self.expression(&throw.exception, id);
                } else {
                    let id = self.push(NodeKind::Statement, "", stmt.span(), parent);
                    self.expression(&expr_stmt.expression, id);
                }
            }
            Statement::Return(ret) => {
                let id = self.push(NodeKind::ReturnStatement, "return", stmt.span(), parent);
                if let Some(value) = &ret.value {
                    self.expression(value, id);
                }
            }
            Statement::Echo(echo) => {
                let id = self.push(NodeKind::EchoStatement, "echo", stmt.span(), parent);
                for value in echo.values.iter() {
                    self.expression(value, id);
                }
            }
            Statement::Block(block) => {
                let id = self.push(NodeKind::ScopeStatement, "", stmt.span(), parent);
                for inner in block.statements.iter() {
                    self.statement(inner, id);
                }
            }
            Statement::If(if_stmt) => self.if_statement(if_stmt, stmt.span(), parent),
            Statement::Switch(switch) => {
                let id = self.push(NodeKind::SwitchStatement, "switch", stmt.span(), parent);
                self.expression(&switch.expression, id);
                match &switch.body {
                    SwitchBody::BraceDelimited(body) => {
                        for case in body.cases.iter() {
                            self.switch_case(case, id);
                        }
                    }
                    SwitchBody::ColonDelimited(body) => {
                        for case in body.cases.iter() {
                            self.switch_case(case, id);
                        }
                    }
                }
            }
            Statement::Try(try_stmt) => {
                let id = self.push(NodeKind::TryStatement, "try", stmt.span(), parent);
                let block = self.push(NodeKind::ScopeStatement, "", try_stmt.block.span(), id);
                for inner in try_stmt.block.statements.iter() {
                    self.statement(inner, block);
                }
                for catch in try_stmt.catch_clauses.iter() {
                    let catch_id = self.push(NodeKind::CatchStatement, "catch", catch.span(), id);
                    if let Some(var) = &catch.variable {
                        let name = self.text(var.span());
                        self.push(NodeKind::Variable, name, var.span(), catch_id);
                    }
                    let block =
                        self.push(NodeKind::ScopeStatement, "", catch.block.span(), catch_id);
                    for inner in catch.block.statements.iter() {
                        self.statement(inner, block);
                    }
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    let finally_id =
                        self.push(NodeKind::FinallyStatement, "finally", finally.span(), id);
                    let block =
                        self.push(NodeKind::ScopeStatement, "", finally.block.span(), finally_id);
                    for inner in finally.block.statements.iter() {
                        self.statement(inner, block);
                    }
                }
            }
            Statement::Foreach(foreach) => {
                let id = self.push(NodeKind::ForeachStatement, "foreach", stmt.span(), parent);
                self.expression(&foreach.expression, id);
                match &foreach.target {
                    ForeachTarget::Value(value) => {
                        self.target(&value.value, id);
                    }
                    ForeachTarget::KeyValue(kv) => {
                        self.target(&kv.key, id);
                        self.target(&kv.value, id);
                    }
                }
                match &foreach.body {
                    ForeachBody::Statement(body) => self.body_statement(body, id),
                    ForeachBody::ColonDelimited(body) => {
                        let lines = self.sequence_lines(body.statements.iter(), body.span());
                        self.colon_body(body.statements.iter(), lines, id);
                    }
                }
            }
            Statement::For(for_stmt) => {
                let id = self.push(NodeKind::ForStatement, "for", stmt.span(), parent);
                for expr in for_stmt.initializations.iter() {
                    self.expression(expr, id);
                }
                for expr in for_stmt.conditions.iter() {
                    self.expression(expr, id);
                }
                for expr in for_stmt.increments.iter() {
                    self.expression(expr, id);
                }
                match &for_stmt.body {
                    ForBody::Statement(body) => self.body_statement(body, id),
                    ForBody::ColonDelimited(body) => {
                        let lines = self.sequence_lines(body.statements.iter(), body.span());
                        self.colon_body(body.statements.iter(), lines, id);
                    }
                }
            }
            Statement::While(while_stmt) => {
                let id = self.push(NodeKind::WhileStatement, "while", stmt.span(), parent);
                self.expression(&while_stmt.condition, id);
                match &while_stmt.body {
                    WhileBody::Statement(body) => self.body_statement(body, id),
                    WhileBody::ColonDelimited(body) => {
                        let lines = self.sequence_lines(body.statements.iter(), body.span());
                        self.colon_body(body.statements.iter(), lines, id);
                    }
                }
            }
            Statement::DoWhile(do_while) => {
                let id = self.push(NodeKind::DoWhileStatement, "do", stmt.span(), parent);
                self.body_statement(&do_while.statement, id);
                self.expression(&do_while.condition, id);
            }
            Statement::Global(global) => {
                let id = self.push(NodeKind::GlobalStatement, "global", stmt.span(), parent);
                for var in global.variables.iter() {
                    self.variable(var, id);
                }
            }
            Statement::Static(static_stmt) => {
                let id = self.push(NodeKind::StaticStatement, "static", stmt.span(), parent);
                for item in static_stmt.items.iter() {
                    let span = item.variable().span();
                    let name = self.text(span);
                    self.push(NodeKind::Variable, name, span, id);
                }
            }
            Statement::Function(func) => {
                let name = self.text(func.name.span());
                let id = self.push(NodeKind::Function, name, stmt.span(), parent);
                self.parameters(
                    func.parameter_list.parameters.iter().map(|p| (p.span(), p.variable.span())),
                    func.parameter_list.span(),
                    id,
                );
                self.scope(func.body.statements.iter(), func.body.span(), id);
            }
            Statement::Class(class) => {
                let name = self.text(class.name.span());
                let id = self.push(NodeKind::Class, name, stmt.span(), parent);
                for member in class.members.iter() {
                    self.class_member(member, id);
                }
            }
            Statement::Trait(tr) => {
                let name = self.text(tr.name.span());
                let id = self.push(NodeKind::Class, name, stmt.span(), parent);
                for member in tr.members.iter() {
                    self.class_member(member, id);
                }
            }
            Statement::Interface(iface) => {
                let name = self.text(iface.name.span());
                let id = self.push(NodeKind::Class, name, stmt.span(), parent);
                for member in iface.members.iter() {
                    self.class_member(member, id);
                }
            }
            Statement::Enum(en) => {
                let name = self.text(en.name.span());
                let id = self.push(NodeKind::Class, name, stmt.span(), parent);
                for member in en.members.iter() {
                    self.class_member(member, id);
                }
            }
            Statement::Namespace(ns) => match &ns.body {
                NamespaceBody::Implicit(body) => {
                    for inner in body.statements.iter() {
                        self.statement(inner, parent);
                    }
                }
                NamespaceBody::BraceDelimited(body) => {
                    for inner in body.statements.iter() {
                        self.statement(inner, parent);
                    }
                }
            },
            _ => {
                // break, continue, unset, inline HTML, ...
                self.push(NodeKind::Statement, "", stmt.span(), parent);
            }
        }
    }

    /// Wrap a loop/branch body; a braced block becomes the `ScopeStatement` itself
    fn body_statement(&mut self, stmt: &Statement<'_>, parent: NodeId) {
        if let Statement::Block(block) = stmt {
            let id = self.push(NodeKind::ScopeStatement, "", stmt.span(), parent);
            for inner in block.statements.iter() {
                self.statement(inner, id);
            }
        } else {
            let id = self.push(NodeKind::ScopeStatement, "", stmt.span(), parent);
            self.statement(stmt, id);
        }
    }

    fn colon_body<'a, 'b, I>(&mut self, stmts: I, lines: (usize, usize), parent: NodeId)
    where
        I: IntoIterator<Item = &'a Statement<'b>>,
        'b: 'a,
    {
        let id = self.push_lines(NodeKind::ScopeStatement, "", lines, parent);
        for inner in stmts {
            self.statement(inner, id);
        }
    }

    fn if_statement(&mut self, if_stmt: &If<'_>, span: Span, parent: NodeId) {
        let id = self.push(NodeKind::IfStatement, "if", span, parent);
        self.expression(&if_stmt.condition, id);
        match &if_stmt.body {
            IfBody::Statement(body) => {
                self.body_statement(&body.statement, id);
                for else_if in body.else_if_clauses.iter() {
                    let else_if_id =
                        self.push(NodeKind::ElseIfStatement, "elseif", else_if.span(), id);
                    self.expression(&else_if.condition, else_if_id);
                    self.body_statement(&else_if.statement, else_if_id);
                }
                if let Some(else_clause) = &body.else_clause {
                    let else_id =
                        self.push(NodeKind::ElseStatement, "else", else_clause.span(), id);
                    self.body_statement(&else_clause.statement, else_id);
                }
            }
            IfBody::ColonDelimited(body) => {
                let lines = self.sequence_lines(body.statements.iter(), body.span());
                self.colon_body(body.statements.iter(), lines, id);
                for else_if in body.else_if_clauses.iter() {
                    let else_if_id =
                        self.push(NodeKind::ElseIfStatement, "elseif", else_if.span(), id);
                    self.expression(&else_if.condition, else_if_id);
                    let lines = self.sequence_lines(else_if.statements.iter(), else_if.span());
                    self.colon_body(else_if.statements.iter(), lines, else_if_id);
                }
                if let Some(else_clause) = &body.else_clause {
                    let else_id =
                        self.push(NodeKind::ElseStatement, "else", else_clause.span(), id);
                    let lines =
                        self.sequence_lines(else_clause.statements.iter(), else_clause.span());
                    self.colon_body(else_clause.statements.iter(), lines, else_id);
                }
            }
        }
    }

    fn switch_case(&mut self, case: &SwitchCase<'_>, parent: NodeId) {
        match case {
            SwitchCase::Expression(case) => {
                let lines = self.sequence_lines(case.statements.iter(), case.span());
                let lines = (self.lines.lines(case.span()).0, lines.1);
                let id = self.push_lines(NodeKind::SwitchLabel, "case", lines, parent);
                self.expression(&case.expression, id);
                for stmt in case.statements.iter() {
                    self.statement(stmt, id);
                }
            }
            SwitchCase::Default(case) => {
                let lines = self.sequence_lines(case.statements.iter(), case.span());
                let lines = (self.lines.lines(case.span()).0, lines.1);
                let id = self.push_lines(NodeKind::SwitchLabel, "default", lines, parent);
                for stmt in case.statements.iter() {
                    self.statement(stmt, id);
                }
            }
        }
    }

    fn class_member(&mut self, member: &ClassLikeMember<'_>, parent: NodeId) {
        if let ClassLikeMember::Method(method) = member {
            let id = self.push(NodeKind::Method, method.name.value, method.span(), parent);
            self.parameters(
                method
                    .parameter_list
                    .parameters
                    .iter()
                    .map(|p| (p.span(), p.variable.span())),
                method.parameter_list.span(),
                id,
            );
            match &method.body {
                MethodBody::Concrete(body) => {
                    self.scope(body.statements.iter(), body.span(), id);
                }
                MethodBody::Abstract(_) => self.tree.set_abstract(id),
            }
        }
    }

    /// `FormalParameters` from `(parameter span, variable span)` pairs
    fn parameters<I>(&mut self, params: I, list_span: Span, parent: NodeId)
    where
        I: IntoIterator<Item = (Span, Span)>,
    {
        let id = self.push(NodeKind::FormalParameters, "", list_span, parent);
        for (param_span, var_span) in params {
            let param = self.push(NodeKind::FormalParameter, "", param_span, id);
            let name = self.text(var_span);
            self.push(NodeKind::VariableDeclarator, name, var_span, param);
        }
    }

    fn scope<'a, 'b, I>(&mut self, stmts: I, span: Span, parent: NodeId)
    where
        I: IntoIterator<Item = &'a Statement<'b>>,
        'b: 'a,
    {
        let id = self.push(NodeKind::Scope, "", span, parent);
        for inner in stmts {
            self.statement(inner, id);
        }
    }

    // ==================== Expressions ====================

    /// Lower an expression in a binding position (assignment or foreach target)
    ///
    /// Array literals in such positions are destructuring patterns.
    fn target(&mut self, expr: &Expression<'_>, parent: NodeId) {
        match expr {
            Expression::Array(arr) => {
                let id = self.push(NodeKind::ListExpression, "[", expr.span(), parent);
                self.array_elements(arr.elements.iter(), id, true);
            }
            Expression::List(list) => {
                let id = self.push(NodeKind::ListExpression, "list", expr.span(), parent);
                self.array_elements(list.elements.iter(), id, true);
            }
            Expression::Parenthesized(paren) => self.target(&paren.expression, parent),
            _ => self.expression(expr, parent),
        }
    }

    fn array_elements<'a, 'b, I>(&mut self, elements: I, parent: NodeId, binding: bool)
    where
        I: IntoIterator<Item = &'a ArrayElement<'b>>,
        'b: 'a,
    {
        for element in elements {
            match element {
                ArrayElement::KeyValue(kv) => {
                    self.expression(&kv.key, parent);
                    if binding {
                        self.target(&kv.value, parent);
                    } else {
                        self.expression(&kv.value, parent);
                    }
                }
                ArrayElement::Value(val) => {
                    if binding {
                        self.target(&val.value, parent);
                    } else {
                        self.expression(&val.value, parent);
                    }
                }
                ArrayElement::Variadic(var) => self.expression(&var.value, parent),
                _ => {}
            }
        }
    }

    fn variable(&mut self, var: &Variable<'_>, parent: NodeId) {
        let span = var.span();
        let text = self.text(span);
        match var {
            Variable::Direct(_) => {
                self.push(NodeKind::Variable, text, span, parent);
            }
            // Variable variables are not local symbol reads
            _ => {
                self.push(NodeKind::Expression, text, span, parent);
            }
        }
    }

    /// `print $x`, `clone $x` and other keyword forms with a single operand
    fn keyword_operand(&mut self, keyword: &str, operand: &Expression<'_>, span: Span, parent: NodeId) {
        let id = self.push(NodeKind::Expression, keyword, span, parent);
        self.expression(operand, id);
    }

    fn arguments<'a, 'b, I>(&mut self, args: I, span: Span, parent: NodeId)
    where
        I: IntoIterator<Item = &'a Argument<'b>>,
        'b: 'a,
    {
        let id = self.push(NodeKind::Arguments, "", span, parent);
        for arg in args {
            match arg {
                Argument::Positional(positional) => self.expression(&positional.value, id),
                Argument::Named(named) => {
                    let name = self.text(named.name.span());
                    let named_id = self.push(NodeKind::NamedArgument, name, arg.span(), id);
                    self.expression(&named.value, named_id);
                }
            }
        }
    }

    fn expression(&mut self, expr: &Expression<'_>, parent: NodeId) {
        let span = expr.span();
        match expr {
            Expression::Variable(var) => self.variable(var, parent),
            Expression::Parenthesized(paren) => self.expression(&paren.expression, parent),
            Expression::Assignment(assign) => {
                let op = self.between(
                    assign.lhs.span().end.offset as usize,
                    assign.rhs.span().start.offset as usize,
                );
                let id = self.push(NodeKind::AssignmentExpression, op, span, parent);
                self.target(&assign.lhs, id);
                self.expression(&assign.rhs, id);
            }
            Expression::Binary(binary) => {
                let op = self.between(
                    binary.lhs.span().end.offset as usize,
                    binary.rhs.span().start.offset as usize,
                );
                let id = self.push(NodeKind::Expression, op, span, parent);
                self.expression(&binary.lhs, id);
                self.expression(&binary.rhs, id);
            }
            Expression::UnaryPrefix(unary) => {
                let op = self.between(
                    span.start.offset as usize,
                    unary.operand.span().start.offset as usize,
                );
                let id = self.push(NodeKind::UnaryExpression, op, span, parent);
                self.expression(&unary.operand, id);
            }
            Expression::UnaryPostfix(unary) => {
                let op = self.between(
                    unary.operand.span().end.offset as usize,
                    span.end.offset as usize,
                );
                let id = self.push(NodeKind::UnaryExpression, op, span, parent);
                self.expression(&unary.operand, id);
            }
            Expression::Conditional(ternary) => {
                let id = self.push(NodeKind::Expression, "?", span, parent);
                self.expression(&ternary.condition, id);
                if let Some(then) = &ternary.then {
                    self.expression(then, id);
                }
                self.expression(&ternary.r#else, id);
            }
            Expression::Call(Call::Function(call)) => {
                let callee: &Expression<'_> = &call.function;
                let name = match callee {
                    Expression::Identifier(ident) => self.text(ident.span()),
                    _ => "",
                };
                let id = self.push(NodeKind::FunctionPostfix, name, span, parent);
                if !matches!(callee, Expression::Identifier(_)) {
                    self.expression(callee, id);
                }
                self.arguments(
                    call.argument_list.arguments.iter(),
                    call.argument_list.span(),
                    id,
                );
            }
            Expression::Call(Call::Method(call)) => {
                let name = self.text(call.method.span());
                let id = self.push(NodeKind::MethodPostfix, name, span, parent);
                self.expression(&call.object, id);
                self.arguments(
                    call.argument_list.arguments.iter(),
                    call.argument_list.span(),
                    id,
                );
            }
            Expression::Call(Call::NullSafeMethod(call)) => {
                let name = self.text(call.method.span());
                let id = self.push(NodeKind::MethodPostfix, name, span, parent);
                self.expression(&call.object, id);
                self.arguments(
                    call.argument_list.arguments.iter(),
                    call.argument_list.span(),
                    id,
                );
            }
            Expression::Call(Call::StaticMethod(call)) => {
                let name = self.text(call.method.span());
                let id = self.push(NodeKind::MethodPostfix, name, span, parent);
                self.expression(&call.class, id);
                self.arguments(
                    call.argument_list.arguments.iter(),
                    call.argument_list.span(),
                    id,
                );
            }
            Expression::Access(Access::Property(access)) => {
                let name = self.text(access.property.span());
                let id = self.push(NodeKind::PropertyPostfix, name, span, parent);
                self.expression(&access.object, id);
            }
            Expression::Access(Access::NullSafeProperty(access)) => {
                let name = self.text(access.property.span());
                let id = self.push(NodeKind::PropertyPostfix, name, span, parent);
                self.expression(&access.object, id);
            }
            Expression::Access(Access::StaticProperty(access)) => {
                let name = self.text(access.property.span());
                let id = self.push(NodeKind::PropertyPostfix, name, span, parent);
                self.expression(&access.class, id);
            }
            Expression::Access(Access::ClassConstant(access)) => {
                let name = self.text(access.constant.span());
                let id = self.push(NodeKind::PropertyPostfix, name, span, parent);
                self.expression(&access.class, id);
            }
            Expression::ArrayAccess(access) => {
                let id = self.push(NodeKind::ArrayIndexExpression, "[", span, parent);
                self.expression(&access.array, id);
                self.expression(&access.index, id);
            }
            Expression::ArrayAppend(append) => {
                let id = self.push(NodeKind::ArrayIndexExpression, "[", span, parent);
                self.expression(&append.array, id);
            }
            Expression::Array(arr) => {
                let id = self.push(NodeKind::ArrayExpression, "[", span, parent);
                self.array_elements(arr.elements.iter(), id, false);
            }
            Expression::LegacyArray(arr) => {
                let id = self.push(NodeKind::ArrayExpression, "array", span, parent);
                self.array_elements(arr.elements.iter(), id, false);
            }
            Expression::List(list) => {
                let id = self.push(NodeKind::ListExpression, "list", span, parent);
                self.array_elements(list.elements.iter(), id, true);
            }
            Expression::Closure(closure) => {
                let id = self.push(NodeKind::Closure, "function", span, parent);
                self.parameters(
                    closure
                        .parameter_list
                        .parameters
                        .iter()
                        .map(|p| (p.span(), p.variable.span())),
                    closure.parameter_list.span(),
                    id,
                );
                if let Some(use_clause) = &closure.use_clause {
                    let use_id = self.push(NodeKind::ClosureUse, "use", use_clause.span(), id);
                    for item in use_clause.variables.iter() {
                        let var_span = item.variable.span();
                        let name = self.text(var_span);
                        let owner = match item.ampersand {
                            Some(_) => self.push(NodeKind::UnaryExpression, "&", item.span(), use_id),
                            None => use_id,
                        };
                        self.push(NodeKind::Variable, name, var_span, owner);
                    }
                }
                self.scope(closure.body.statements.iter(), closure.body.span(), id);
            }
            Expression::Instantiation(inst) => {
                let id = self.push(NodeKind::AllocationExpression, "new", span, parent);
                self.expression(&inst.class, id);
                if let Some(args) = &inst.argument_list {
                    self.arguments(args.arguments.iter(), args.span(), id);
                }
            }
            Expression::Construct(Construct::Isset(isset)) => {
                let id = self.push(NodeKind::IssetExpression, "isset", span, parent);
                for value in isset.values.iter() {
                    self.expression(value, id);
                }
            }
            Expression::Construct(Construct::Empty(empty)) => {
                let id = self.push(NodeKind::Expression, "empty", span, parent);
                self.expression(&empty.value, id);
            }
            Expression::Throw(throw) => {
                let id = self.push(NodeKind::Expression, "throw", span, parent);
                self.expression(&throw.exception, id);
            }
            Expression::Construct(Construct::Print(print)) => {
                self.keyword_operand("print", print.value, span, parent);
            }
            Expression::Construct(Construct::Eval(eval)) => {
                self.keyword_operand("eval", eval.value, span, parent);
            }
            Expression::Construct(Construct::Include(include)) => {
                self.keyword_operand("include", include.value, span, parent);
            }
            Expression::Construct(Construct::IncludeOnce(include)) => {
                self.keyword_operand("include_once", include.value, span, parent);
            }
            Expression::Construct(Construct::Require(require)) => {
                self.keyword_operand("require", require.value, span, parent);
            }
            Expression::Construct(Construct::RequireOnce(require)) => {
                self.keyword_operand("require_once", require.value, span, parent);
            }
            Expression::Construct(Construct::Exit(exit)) => {
                let id = self.push(NodeKind::Expression, "exit", span, parent);
                if let Some(args) = &exit.arguments {
                    self.arguments(args.arguments.iter(), args.span(), id);
                }
            }
            Expression::Construct(Construct::Die(die)) => {
                let id = self.push(NodeKind::Expression, "die", span, parent);
                if let Some(args) = &die.arguments {
                    self.arguments(args.arguments.iter(), args.span(), id);
                }
            }
            Expression::Clone(clone) => {
                self.keyword_operand("clone", clone.object, span, parent);
            }
            Expression::Yield(Yield::Value(yield_value)) => {
                let id = self.push(NodeKind::Expression, "yield", span, parent);
                if let Some(value) = yield_value.value {
                    self.expression(value, id);
                }
            }
            Expression::Yield(Yield::Pair(pair)) => {
                let id = self.push(NodeKind::Expression, "yield", span, parent);
                self.expression(pair.key, id);
                self.expression(pair.value, id);
            }
            Expression::Yield(Yield::From(from)) => {
                self.keyword_operand("yield from", from.iterator, span, parent);
            }
            Expression::Pipe(pipe) => {
                let id = self.push(NodeKind::Expression, "|>", span, parent);
                self.expression(pipe.input, id);
                self.expression(pipe.callable, id);
            }
            Expression::CompositeString(composite) => {
                let (image, parts) = match composite {
                    CompositeString::Interpolated(string) => ("\"", &string.parts),
                    CompositeString::Document(string) => ("<<<", &string.parts),
                    CompositeString::ShellExecute(string) => ("`", &string.parts),
                };
                let id = self.push(NodeKind::Expression, image, span, parent);
                for part in parts.iter() {
                    match part {
                        StringPart::Expression(inner) => self.expression(inner, id),
                        StringPart::BracedExpression(braced) => self.expression(braced.expression, id),
                        StringPart::Literal(_) => {}
                    }
                }
            }
            Expression::AnonymousClass(class) => {
                let id = self.push(NodeKind::AllocationExpression, "new", span, parent);
                if let Some(args) = &class.argument_list {
                    self.arguments(args.arguments.iter(), args.span(), id);
                }
                let class_id = self.push(NodeKind::Class, "class@anonymous", span, id);
                for member in class.members.iter() {
                    self.class_member(member, class_id);
                }
            }
            Expression::Identifier(ident) => {
                let name = self.text(ident.span());
                self.push(NodeKind::Expression, name, span, parent);
            }
            // Literals, arrow functions, match, ...
            _ => {
                self.push(NodeKind::Expression, "", span, parent);
            }
        }
    }
}
