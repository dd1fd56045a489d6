//! Check for code following a `return` or `throw` in the same block
//!
//! Every terminator that is not the final statement of its enclosing block
//! is reported; the statements after it can never run.
//!
//! Two finality modes are available through the `finality` option:
//! - `structural` (default): a terminator is final when it has no next
//!   sibling in its statement list.
//! - `lines`: finality is inferred from line numbers, recognizing the end
//!   of the function body, an `if`/`elseif`/`else` branch, a `switch` case,
//!   a `try`, `catch` or `finally` block, and a closure body. This mode
//!   assumes one statement per line.

use super::{parent_of, Check, CheckContext, RuleError, RuleOptions, Violation};
use crate::issue::Severity;
use messdetector_core::{Node, NodeKind};

const RULE: &str = "UnreachableCode";

/// How the end of a block is detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Finality {
    #[default]
    Structural,
    Lines,
}

impl Finality {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "structural" => Some(Finality::Structural),
            "lines" => Some(Finality::Lines),
            _ => None,
        }
    }

    fn from_options(options: &RuleOptions) -> Self {
        let value = options.string("finality", "structural");
        Self::from_str(&value).unwrap_or_else(|| {
            options.warn_invalid("finality", &toml::Value::String(value), "structural");
            Finality::Structural
        })
    }
}

pub struct UnreachableCodeCheck;

impl Check for UnreachableCodeCheck {
    fn id(&self) -> &'static str {
        RULE
    }

    fn description(&self) -> &'static str {
        "Detects statements that follow a return or throw in the same block"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn options(&self) -> &'static [(&'static str, &'static str)] {
        &[("finality", "structural")]
    }

    fn apply(&self, unit: Node<'_>, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, RuleError> {
        if unit.is_abstract() {
            return Ok(Vec::new());
        }
        if unit.first_child_of_kind(NodeKind::Scope).is_none() {
            return Err(RuleError::missing_child(unit, NodeKind::Scope));
        }

        let finality = Finality::from_options(ctx.options);
        let mut violations = Vec::new();

        for terminator in terminators(unit) {
            let reachable = match finality {
                Finality::Structural => terminator.is_last_child(),
                Finality::Lines => ends_its_block(terminator, unit)?,
            };
            if !reachable {
                violations.push(Violation::at(RULE, terminator, terminator.image()));
            }
        }

        Ok(violations)
    }

    fn message(&self, token: &str) -> String {
        format!("The code after this '{}' statement is unreachable.", token)
    }
}

/// Every `return`/`throw` of the unit, closures included, nested named functions excluded
fn terminators<'t>(unit: Node<'t>) -> Vec<Node<'t>> {
    unit.descendants()
        .filter(|n| matches!(n.kind(), NodeKind::ReturnStatement | NodeKind::ThrowStatement))
        .filter(|n| {
            n.ancestors()
                .find(|a| matches!(a.kind(), NodeKind::Function | NodeKind::Method))
                == Some(unit)
        })
        .collect()
}

// ==================== Line based finality ====================

/// `node` ends on the last line of `scope`, or on the line before its closing brace
fn is_final_statement(scope: Node<'_>, node: Node<'_>) -> bool {
    node.end_line() == scope.end_line() || node.end_line() + 1 == scope.end_line()
}

fn ends_its_block(terminator: Node<'_>, unit: Node<'_>) -> Result<bool, RuleError> {
    let parent = parent_of(terminator)?;

    Ok(is_final_in_unit(terminator, parent, unit)
        || is_at_end_of_if(terminator, parent)?
        || is_at_end_of_switch_case(terminator, parent)?
        || is_at_end_of_try(terminator, parent)?
        || is_at_end_of_catch(terminator, parent)?
        || is_at_end_of_finally(terminator, parent)?
        || is_at_end_of_closure(terminator, parent)?)
}

fn is_final_in_unit(terminator: Node<'_>, parent: Node<'_>, unit: Node<'_>) -> bool {
    parent.is(NodeKind::Scope) && is_final_statement(unit, terminator)
}

fn is_at_end_of_if(terminator: Node<'_>, parent: Node<'_>) -> Result<bool, RuleError> {
    if !parent.is(NodeKind::ScopeStatement) {
        return Ok(false);
    }
    let branch = parent_of(parent)?;
    Ok(matches!(
        branch.kind(),
        NodeKind::IfStatement | NodeKind::ElseIfStatement | NodeKind::ElseStatement
    ) && is_final_statement(parent, terminator))
}

/// Case labels have no closing line, so the match is exact
fn is_at_end_of_switch_case(terminator: Node<'_>, parent: Node<'_>) -> Result<bool, RuleError> {
    if !parent.is(NodeKind::SwitchLabel) {
        return Ok(false);
    }
    let switch = parent_of(parent)?;
    Ok(switch.is(NodeKind::SwitchStatement) && terminator.end_line() == parent.end_line())
}

fn is_at_end_of_try(terminator: Node<'_>, parent: Node<'_>) -> Result<bool, RuleError> {
    if !parent.is(NodeKind::ScopeStatement) {
        return Ok(false);
    }
    let try_stmt = parent_of(parent)?;
    if !try_stmt.is(NodeKind::TryStatement) || !is_final_statement(parent, terminator) {
        return Ok(false);
    }
    if try_stmt.first_child_of_kind(NodeKind::FinallyStatement).is_some() {
        return Ok(false);
    }
    nothing_follows(try_stmt)
}

fn is_at_end_of_catch(terminator: Node<'_>, parent: Node<'_>) -> Result<bool, RuleError> {
    if !parent.is(NodeKind::ScopeStatement) {
        return Ok(false);
    }
    let catch = parent_of(parent)?;
    Ok(catch.is(NodeKind::CatchStatement) && is_final_statement(parent, terminator))
}

fn is_at_end_of_finally(terminator: Node<'_>, parent: Node<'_>) -> Result<bool, RuleError> {
    if !parent.is(NodeKind::ScopeStatement) {
        return Ok(false);
    }
    let finally = parent_of(parent)?;
    if !finally.is(NodeKind::FinallyStatement) || !is_final_statement(parent, terminator) {
        return Ok(false);
    }
    let try_stmt = parent_of(finally)?;
    nothing_follows(try_stmt)
}

fn is_at_end_of_closure(terminator: Node<'_>, parent: Node<'_>) -> Result<bool, RuleError> {
    if !parent.is(NodeKind::Scope) {
        return Ok(false);
    }
    let closure = parent_of(parent)?;
    Ok(closure.is(NodeKind::Closure) && is_final_statement(parent, terminator))
}

/// The whole `try` construct is the last statement of its own block
fn nothing_follows(try_stmt: Node<'_>) -> Result<bool, RuleError> {
    let block = parent_of(try_stmt)?;
    Ok(is_final_statement(block, try_stmt))
}
