//! Check for local variables that are read but never defined
//!
//! Each function or method is analyzed as one scope frame. Closures open
//! their own frame: reads inside a closure never count against the
//! enclosing scope, and definitions in the enclosing scope are not credited
//! to the closure unless the name is captured with `use`. The `use` clause
//! itself belongs to the enclosing frame: `use ($x)` reads `$x` there and
//! `use (&$x)` defines it.
//!
//! Within a frame the first read of every name is the candidate. A
//! candidate is cleared when it is a parameter, a captured name, or when
//! its first appearance is itself a definition:
//! - the target of an assignment (`$a = 1`, `$a .= 'x'`, `$a[] = 1`)
//! - a `foreach` key or value binding, including `&$value`
//! - a `catch` binding
//! - an element of `list(...)` / `[...]` destructuring
//! - a `global` or `static` declaration
//!
//! With `ignorePregMatch`, the third argument of `preg_match` and
//! `preg_match_all` is treated as an output parameter.

use super::{parent_of, Check, CheckContext, RuleError, RuleOptions, Violation};
use crate::issue::Severity;
use messdetector_core::{Node, NodeKind};

const RULE: &str = "UndefinedVariable";

const PREG_FUNCTIONS: &[&str] = &["preg_match", "preg_match_all"];

pub struct UndefinedVariableCheck;

#[derive(Debug, Clone, Copy)]
struct Settings {
    ignore_preg_match: bool,
    analyze_closures: bool,
}

impl Settings {
    fn from_options(options: &RuleOptions) -> Self {
        Self {
            ignore_preg_match: options.bool("ignorePregMatch", false),
            analyze_closures: options.bool("analyzeClosures", true),
        }
    }
}

impl Check for UndefinedVariableCheck {
    fn id(&self) -> &'static str {
        RULE
    }

    fn description(&self) -> &'static str {
        "Detects local variables that are used without ever being defined"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn options(&self) -> &'static [(&'static str, &'static str)] {
        &[("ignorePregMatch", "false"), ("analyzeClosures", "true")]
    }

    fn apply(&self, unit: Node<'_>, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, RuleError> {
        if unit.is_abstract() {
            return Ok(Vec::new());
        }

        let settings = Settings::from_options(ctx.options);
        let mut violations = Vec::new();
        analyze_scope(unit, &settings, &mut violations)?;
        Ok(violations)
    }

    fn message(&self, token: &str) -> String {
        format!(
            "Avoid using undefined variables such as '{}' which will lead to PHP notices.",
            token
        )
    }
}

/// Run the pipeline on one frame, then recurse into the closures it owns
fn analyze_scope<'t>(
    owner: Node<'t>,
    settings: &Settings,
    out: &mut Vec<Violation>,
) -> Result<(), RuleError> {
    let mut frame = ScopeFrame::new(owner);
    frame.collect();
    frame.remove_parameters()?;
    if owner.is(NodeKind::Closure) {
        frame.remove_captures();
    }
    frame.remove_definitions()?;
    if settings.ignore_preg_match {
        frame.remove_preg_match_outputs()?;
    }
    out.extend(
        frame
            .candidates
            .iter()
            .map(|node| Violation::at(RULE, *node, node.image())),
    );

    if settings.analyze_closures {
        for closure in owned_closures(owner) {
            analyze_scope(closure, settings, out)?;
        }
    }

    Ok(())
}

/// The function, method or closure whose symbol table `node` belongs to
///
/// Names in a closure's `use` clause are looked up where the closure is
/// created, so that closure is skipped.
fn owning_scope<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let mut in_use_clause = false;
    for ancestor in node.ancestors() {
        if ancestor.is(NodeKind::ClosureUse) {
            in_use_clause = true;
        } else if ancestor.kind().is_callable_unit() {
            if !in_use_clause {
                return Some(ancestor);
            }
            in_use_clause = false;
        }
    }
    None
}

fn owned_closures<'t>(owner: Node<'t>) -> Vec<Node<'t>> {
    owner
        .descendants_of_kind(NodeKind::Closure)
        .into_iter()
        .filter(|closure| owning_scope(*closure) == Some(owner))
        .collect()
}

/// Working state for one lexical scope
struct ScopeFrame<'t> {
    owner: Node<'t>,
    /// First read of each candidate name, in document order
    candidates: Vec<Node<'t>>,
}

impl<'t> ScopeFrame<'t> {
    fn new(owner: Node<'t>) -> Self {
        Self {
            owner,
            candidates: Vec::new(),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.candidates.iter().any(|c| c.image() == name)
    }

    fn remove_name(&mut self, name: &str) {
        self.candidates.retain(|c| c.image() != name);
    }

    fn collect(&mut self) {
        for variable in self.owner.descendants_of_kind(NodeKind::Variable) {
            if !variable.is_local_variable() {
                continue;
            }
            if owning_scope(variable) != Some(self.owner) {
                continue;
            }
            if !self.contains(variable.image()) {
                self.candidates.push(variable);
            }
        }
    }

    fn remove_parameters(&mut self) -> Result<(), RuleError> {
        let parameters = self
            .owner
            .first_child_of_kind(NodeKind::FormalParameters)
            .ok_or_else(|| RuleError::missing_child(self.owner, NodeKind::FormalParameters))?;

        for declarator in parameters.descendants_of_kind(NodeKind::VariableDeclarator) {
            self.remove_name(declarator.image());
        }
        Ok(())
    }

    fn remove_captures(&mut self) {
        if let Some(uses) = self.owner.first_child_of_kind(NodeKind::ClosureUse) {
            for captured in uses.descendants_of_kind(NodeKind::Variable) {
                self.remove_name(captured.image());
            }
        }
    }

    fn remove_definitions(&mut self) -> Result<(), RuleError> {
        let mut kept = Vec::with_capacity(self.candidates.len());
        for candidate in self.candidates.drain(..) {
            if !is_definition(candidate)? {
                kept.push(candidate);
            }
        }
        self.candidates = kept;
        Ok(())
    }

    fn remove_preg_match_outputs(&mut self) -> Result<(), RuleError> {
        let mut kept = Vec::with_capacity(self.candidates.len());
        for candidate in self.candidates.drain(..) {
            if !is_preg_match_output(candidate)? {
                kept.push(candidate);
            }
        }
        self.candidates = kept;
        Ok(())
    }
}

fn is_first_child(node: Node<'_>) -> bool {
    node.index_in_parent() == Some(0)
}

/// Whether this appearance of the variable binds it
fn is_definition(variable: Node<'_>) -> Result<bool, RuleError> {
    let parent = parent_of(variable)?;
    let defined = match parent.kind() {
        NodeKind::AssignmentExpression => is_first_child(variable),
        // Child 0 is the iterated expression, the rest are bindings
        NodeKind::ForeachStatement => !is_first_child(variable),
        NodeKind::CatchStatement
        | NodeKind::ListExpression
        | NodeKind::GlobalStatement
        | NodeKind::StaticStatement => true,
        // `&$value` binding or `use (&$x)`; a cast or `@` on the iterated
        // expression is a read
        NodeKind::UnaryExpression => match parent.parent() {
            Some(grandparent) if grandparent.is(NodeKind::ForeachStatement) => !is_first_child(parent),
            Some(grandparent) => grandparent.is(NodeKind::ClosureUse),
            None => false,
        },
        NodeKind::ArrayIndexExpression => is_first_child(variable) && is_element_write(parent)?,
        _ => false,
    };
    Ok(defined)
}

/// `$a[...] = ...` and nested forms write through the base variable
fn is_element_write(mut index: Node<'_>) -> Result<bool, RuleError> {
    loop {
        let parent = parent_of(index)?;
        match parent.kind() {
            NodeKind::ArrayIndexExpression if is_first_child(index) => index = parent,
            NodeKind::AssignmentExpression => return Ok(is_first_child(index)),
            NodeKind::ListExpression => return Ok(true),
            _ => return Ok(false),
        }
    }
}

/// Third positional argument of `preg_match` / `preg_match_all`
fn is_preg_match_output(variable: Node<'_>) -> Result<bool, RuleError> {
    let arguments = parent_of(variable)?;
    if !arguments.is(NodeKind::Arguments) {
        return Ok(false);
    }
    let call = parent_of(arguments)?;
    if !call.is(NodeKind::FunctionPostfix) {
        return Ok(false);
    }

    let name = call.image().rsplit('\\').next().unwrap_or_default();
    if !PREG_FUNCTIONS.iter().any(|f| f.eq_ignore_ascii_case(name)) {
        return Ok(false);
    }

    Ok(arguments.child_count() >= 3 && arguments.child(2) == Some(variable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{lines, tokens};
    use messdetector_core::SyntaxTree;
    use std::path::Path;

    fn check(source: &str) -> Vec<String> {
        tokens(&UndefinedVariableCheck, source, &RuleOptions::empty(RULE))
    }

    fn check_with(source: &str, options: RuleOptions) -> Vec<String> {
        tokens(&UndefinedVariableCheck, source, &options)
    }

    #[test]
    fn test_isset_only_is_reported_once() {
        let source = r#"<?php
function foo() {
    isset($a);
    isset($a);
    echo $a;
}
"#;
        assert_eq!(check(source), vec!["$a"]);
    }

    #[test]
    fn test_parameters_are_defined() {
        let source = r#"<?php
function foo($a, &$b, ...$rest) {
    echo $a, $a, $b, $rest;
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_read_before_assignment() {
        let source = r#"<?php
function foo() {
    echo $a;
    $a = 1;
}
"#;
        let found = lines(&UndefinedVariableCheck, source, &RuleOptions::empty(RULE));
        assert_eq!(found, vec![("$a".to_string(), 3)]);
    }

    #[test]
    fn test_assignment_forms() {
        let source = r#"<?php
function foo() {
    $a = 1;
    $b .= 'x';
    list($c, $d) = bar();
    [$e, [$f, $g]] = bar();
    $h[] = 1;
    $i['k']['j'] = 2;
    echo $a, $b, $c, $d, $e, $f, $g, $h, $i;
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_foreach_iterated_unary_is_a_read() {
        let source = r#"<?php
function foo() {
    foreach ((array) $config as $v) {
        echo $v;
    }
    foreach (@$items as &$w) {
        echo $w;
    }
}
"#;
        assert_eq!(check(source), vec!["$config", "$items"]);
    }

    #[test]
    fn test_reads_inside_strings_and_keyword_forms() {
        let source = r#"<?php
function foo() {
    echo "Hello $name";
    echo <<<EOT
    Dear {$user->name}
    EOT;
    print $other;
    include $file;
    yield $item;
    return clone $obj;
}
"#;
        assert_eq!(
            check(source),
            vec!["$name", "$user", "$other", "$file", "$item", "$obj"]
        );
    }

    #[test]
    fn test_assignment_value_is_not_a_definition() {
        let source = r#"<?php
function foo() {
    $a = $b;
    $list[$key] = 1;
}
"#;
        assert_eq!(check(source), vec!["$b", "$key"]);
    }

    #[test]
    fn test_foreach_bindings() {
        let source = r#"<?php
function foo() {
    foreach ($items as $key => $value) {
        echo $key, $value;
    }
    foreach ($this->items as &$ref) {
        $ref = 1;
    }
    foreach ($this->items as [$x, $y]) {
        echo $x, $y;
    }
}
"#;
        assert_eq!(check(source), vec!["$items"]);
    }

    #[test]
    fn test_catch_global_and_static() {
        let source = r#"<?php
function foo() {
    global $config;
    static $count = 0;
    try {
        bar($config, $count);
    } catch (Exception $e) {
        echo $e->getMessage();
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_this_and_superglobals_are_ignored() {
        let source = r#"<?php
class Foo {
    public function bar() {
        return [$this->baz, $_GET['a'], $_SERVER, $GLOBALS];
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_abstract_methods_are_skipped() {
        let source = r#"<?php
abstract class Foo {
    abstract public function bar($a);
}
interface Baz {
    public function qux($b);
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_preg_match_option() {
        let source = r#"<?php
function foo($pattern, $subject) {
    preg_match($pattern, $subject, $matches);
    return $matches;
}
"#;
        assert_eq!(check(source), vec!["$matches"]);

        let options = RuleOptions::empty(RULE).with("ignorePregMatch", true);
        assert!(check_with(source, options).is_empty());
    }

    #[test]
    fn test_preg_match_qualified_names() {
        let source = r#"<?php
function foo($p, $s) {
    \preg_match($p, $s, $a);
    Foo\PREG_MATCH_ALL($p, $s, $b);
    preg_replace($p, $s, $c);
}
"#;
        let options = RuleOptions::empty(RULE).with("ignorePregMatch", true);
        assert_eq!(check_with(source, options), vec!["$c"]);
    }

    #[test]
    fn test_preg_match_with_two_arguments() {
        let source = r#"<?php
function foo($p) {
    preg_match($p, 'subject');
    return $m;
}
"#;
        let options = RuleOptions::empty(RULE).with("ignorePregMatch", true);
        assert_eq!(check_with(source, options), vec!["$m"]);
    }

    #[test]
    fn test_preg_match_output_must_be_third_argument() {
        let source = r#"<?php
function foo($s) {
    preg_match($p, $s, $m);
}
"#;
        let options = RuleOptions::empty(RULE).with("ignorePregMatch", true);
        assert_eq!(check_with(source, options), vec!["$p"]);
    }

    #[test]
    fn test_closure_is_its_own_scope() {
        let source = r#"<?php
function foo() {
    $outer = 1;
    $f = function ($param) use ($captured) {
        return $param + $captured + $outer + $inner;
    };
    return $f;
}
"#;
        // `$captured` is read in `foo` by the `use` clause; inside the
        // closure it is defined
        assert_eq!(check(source), vec!["$captured", "$outer", "$inner"]);
    }

    #[test]
    fn test_use_clause_reads_enclosing_scope() {
        let source = r#"<?php
function foo($known) {
    $a = function () use ($known, $undefined) {
        return $known . $undefined;
    };
    $b = function () use (&$total) {
        $total = 1;
    };
    return $total;
}
"#;
        let found = lines(&UndefinedVariableCheck, source, &RuleOptions::empty(RULE));
        assert_eq!(found, vec![("$undefined".to_string(), 3)]);

        let options = RuleOptions::empty(RULE).with("analyzeClosures", false);
        assert_eq!(check_with(source, options), vec!["$undefined"]);
    }

    #[test]
    fn test_closure_reads_do_not_leak_into_outer_scope() {
        let source = r#"<?php
function foo() {
    $f = function () {
        $local = 1;
        return $local;
    };
    return $local;
}
"#;
        assert_eq!(check(source), vec!["$local"]);
    }

    #[test]
    fn test_closure_pass_can_be_disabled() {
        let source = r#"<?php
function foo() {
    return function () {
        return $missing;
    };
}
"#;
        assert_eq!(check(source), vec!["$missing"]);

        let options = RuleOptions::empty(RULE).with("analyzeClosures", false);
        assert!(check_with(source, options).is_empty());
    }

    #[test]
    fn test_nested_closures() {
        let source = r#"<?php
function foo() {
    return function ($a) {
        return function () use ($a) {
            return $a . $b;
        };
    };
}
"#;
        assert_eq!(check(source), vec!["$b"]);
    }

    #[test]
    fn test_reference_fixture_class() {
        let source = r#"<?php
namespace Testing;

class TestUndefinedLocalVariable
{
    public $whatever = [];

    public function preg_match()
    {
        $pattern = '/[a-z]/';
        preg_match($pattern, '/asdf/', $matches);
    }

    public function preg_match_all()
    {
        $subject = 'string';
        preg_match_all($pattern, $subject, $matches);
    }

    public function unused($test)
    {
        return function($functionVar1, $functionVar2) use ($test) {
            isset($functionVar3);
        };

        isset($functionVar3);

        isset($test);

        isset($functionVar1);

        isset($adsf, $adsf);

        $adsf = 'what';

        foreach ($this->whatever as &$var)
        {
            isset($var);
        }

        foreach ($this->whatever as $var2)
        {
            isset($var2);
        }

        foreach ($var3 as $var4)
        {
            isset($var4);
        }

        isset($variable['test'], $variable['what']);
    }

    public function unused2()
    {
        list($page, $limit, $offset) = $this->getPaginationProperties();

        isset($page, $limit, $offset);

        try
        {

        }
        catch (Exception $exc)
        {
            echo $exc->getTraceAsString();
        }
    }
}
"#;
        assert_eq!(
            check(source),
            vec![
                "$matches",
                "$pattern",
                "$matches",
                "$functionVar3",
                "$functionVar1",
                "$adsf",
                "$var3",
                "$variable",
                "$functionVar3",
            ]
        );

        let options = RuleOptions::empty(RULE).with("ignorePregMatch", true);
        assert_eq!(
            check_with(source, options),
            vec![
                "$pattern",
                "$functionVar3",
                "$functionVar1",
                "$adsf",
                "$var3",
                "$variable",
                "$functionVar3",
            ]
        );
    }

    #[test]
    fn test_missing_formal_parameters_is_an_error() {
        let mut tree = SyntaxTree::new(1, 3);
        let root = tree.root_id();
        let func = tree.push(NodeKind::Function, "broken", 1, 3, root);
        let scope = tree.push(NodeKind::Scope, "", 1, 3, func);
        tree.push(NodeKind::Variable, "$a", 2, 2, scope);

        let options = RuleOptions::empty(RULE);
        let ctx = CheckContext {
            file_path: Path::new("test.php"),
            options: &options,
        };
        let result = UndefinedVariableCheck.apply(tree.node(func), &ctx);
        assert_eq!(
            result,
            Err(RuleError::MissingChild {
                parent: NodeKind::Function,
                kind: NodeKind::FormalParameters,
                line: 1,
            })
        );
    }

    #[test]
    fn test_message() {
        assert_eq!(
            UndefinedVariableCheck.message("$foo"),
            "Avoid using undefined variables such as '$foo' which will lead to PHP notices."
        );
    }
}
