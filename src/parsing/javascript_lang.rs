//! JavaScript/JSX extractor. Functions, classes, calls (incl. JSX elements,
//! `handle*`/`on*` event-handler heuristics, `.call`/`.apply`/`.bind`
//! rewriting, the higher-order callback catalogue of §4.4 item 7, and
//! optional-chaining `uncertain` tagging), CommonJS + ESM imports.

use std::collections::{HashMap, HashSet};

use tree_sitter::{Node, Parser};

use crate::types::{
    Call, EnclosingFunction, Export, ExportKind, Function, Import, ImportKind, Language,
    Parameter, Span, StateConstant, TypeDecl, TypeKind, Usage,
};

use super::extractor::{
    check_recursion_depth, column_of, end_line_of, line_of, preceding_doc_comment, text_of,
    Extractor,
};
use super::rust_lang::find_usages_generic;

pub struct JavaScriptExtractor {
    parser: Parser,
}

impl JavaScriptExtractor {
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|e| format!("javascript grammar init failed: {e}"))?;
        Ok(Self { parser })
    }

    pub(super) fn language_id(&self) -> Language {
        Language::JavaScript
    }
}

pub(super) fn params_of(node: &Node, source: &str) -> (Box<str>, Vec<Parameter>) {
    let mut out = Vec::new();
    let Some(params_node) = node.child_by_field_name("parameters") else {
        return ("()".into(), out);
    };
    let mut cursor = params_node.walk();
    for child in params_node.children(&mut cursor) {
        match child.kind() {
            "identifier" | "required_parameter" => out.push(Parameter {
                name: text_of(&child, source).into(),
                type_annotation: None,
                default_value: None,
                is_optional: false,
                is_rest: false,
            }),
            "assignment_pattern" => {
                let left = child.child_by_field_name("left");
                let right = child.child_by_field_name("right");
                out.push(Parameter {
                    name: left.map(|l| text_of(&l, source).to_string()).unwrap_or_default().into(),
                    type_annotation: None,
                    default_value: right.map(|r| text_of(&r, source).into()),
                    is_optional: true,
                    is_rest: false,
                });
            }
            "rest_pattern" => out.push(Parameter {
                name: text_of(&child, source).into(),
                type_annotation: None,
                default_value: None,
                is_optional: false,
                is_rest: true,
            }),
            "object_pattern" | "array_pattern" => out.push(Parameter {
                name: text_of(&child, source).into(),
                type_annotation: None,
                default_value: None,
                is_optional: false,
                is_rest: false,
            }),
            _ => {}
        }
    }
    (text_of(&params_node, source).into(), out)
}

pub(super) fn function_from_decl(node: Node, source: &str, is_method: bool, receiver_type: Option<Box<str>>) -> Function {
    let name = node
        .child_by_field_name("name")
        .map(|n| text_of(&n, source).to_string())
        .unwrap_or_default();
    let (params_text, params) = params_of(&node, source);
    let docstring = preceding_doc_comment(&node, source, &["comment"]);
    Function {
        name: name.into(),
        params_text,
        params,
        return_type: node
            .child_by_field_name("return_type")
            .map(|t| text_of(&t, source).into()),
        span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
        name_line: None,
        indentation: column_of(&node),
        modifiers: modifiers_of(&node, source),
        docstring,
        decorators: Vec::new(),
        generics: node
            .child_by_field_name("type_parameters")
            .map(|t| text_of(&t, source).into()),
        is_method,
        receiver_type,
    }
}

pub(super) fn modifiers_of(node: &Node, source: &str) -> Vec<Box<str>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match text_of(&child, source) {
            "static" | "async" | "get" | "set" | "public" | "private" | "protected" | "readonly" | "abstract" => {
                out.push(text_of(&child, source).into())
            }
            _ => {}
        }
    }
    out
}

pub(super) fn walk_functions(node: Node, source: &str, out: &mut Vec<Function>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if !has_ancestor(&node, "class_body") {
                out.push(function_from_decl(node, source, false, None));
            }
            return;
        }
        "variable_declarator" => {
            if let Some(value) = node.child_by_field_name("value") {
                if matches!(value.kind(), "arrow_function" | "function_expression") {
                    if let Some(name) = node.child_by_field_name("name") {
                        let mut f = function_from_decl(value, source, false, None);
                        f.name = text_of(&name, source).into();
                        f.span = Span::new(line_of(&node), column_of(&node), end_line_of(&value), 0);
                        out.push(f);
                    }
                }
            }
            return;
        }
        "class_declaration" | "class" => {
            let class_name = node
                .child_by_field_name("name")
                .map(|n| text_of(&n, source).to_string())
                .unwrap_or_default();
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    if child.kind() == "method_definition" {
                        out.push(function_from_decl(child, source, true, Some(class_name.clone().into())));
                    }
                }
            }
            return;
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_functions(child, source, out, depth + 1);
    }
}

fn has_ancestor(node: &Node, kind: &str) -> bool {
    let mut parent = node.parent();
    while let Some(p) = parent {
        if p.kind() == kind {
            return true;
        }
        parent = p.parent();
    }
    false
}

pub(super) fn walk_types(node: Node, source: &str, out: &mut Vec<TypeDecl>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    if matches!(node.kind(), "class_declaration" | "class") {
        let name: Box<str> = node
            .child_by_field_name("name")
            .map(|n| text_of(&n, source))
            .unwrap_or_default()
            .into();
        let mut extends = None;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "class_heritage" {
                let mut hcursor = child.walk();
                for h in child.children(&mut hcursor) {
                    if h.kind() != "extends" {
                        extends = Some(text_of(&h, source).into());
                    }
                }
            }
        }
        let mut members = Vec::new();
        walk_functions(node, source, &mut members, depth);
        out.push(TypeDecl {
            name,
            kind: TypeKind::Class,
            span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
            members,
            modifiers: Vec::new(),
            extends,
            implements: Vec::new(),
            generics: node
                .child_by_field_name("type_parameters")
                .map(|t| text_of(&t, source).into()),
            docstring: preceding_doc_comment(&node, source, &["comment"]),
        });
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_types(child, source, out, depth + 1);
    }
}

pub(super) fn walk_state_constants(node: Node, source: &str, out: &mut Vec<StateConstant>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    if node.kind() == "variable_declarator" && !has_ancestor(&node, "function_declaration") && !has_ancestor(&node, "arrow_function") {
        if let Some(name_node) = node.child_by_field_name("name") {
            if name_node.kind() == "identifier" {
                let name = text_of(&name_node, source);
                if name.chars().any(|c| c.is_alphabetic()) && name.chars().all(|c| c.is_uppercase() || c == '_' || c.is_numeric()) {
                    out.push(StateConstant {
                        name: name.into(),
                        span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
                    });
                }
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_state_constants(child, source, out, depth + 1);
    }
}

/// Closed catalogue of higher-order operations (§4.4 item 7): identifier/
/// member-expression arguments at these positions are *confirmed*
/// callbacks (`isFunctionReference=true`, `isPotentialCallback=false`)
/// rather than merely potential ones.
enum CallbackRule {
    None,
    Position(usize),
    All,
}

const ARRAY_CALLBACK_METHODS: &[&str] = &[
    "map", "filter", "forEach", "reduce", "reduceRight", "find", "findIndex", "some", "every", "sort", "flatMap",
];
const ALL_ARG_CALLBACK_METHODS: &[&str] = &["then", "catch", "finally"];
const POSITIONAL_CALLBACK_METHODS: &[(&str, usize)] = &[
    ("addEventListener", 1),
    ("removeEventListener", 1),
    ("on", 1),
    ("once", 1),
    ("off", 1),
    ("setTimeout", 0),
    ("setInterval", 0),
    ("setImmediate", 0),
];

fn callback_rule(callee_name: &str) -> CallbackRule {
    if ARRAY_CALLBACK_METHODS.contains(&callee_name) {
        CallbackRule::Position(0)
    } else if ALL_ARG_CALLBACK_METHODS.contains(&callee_name) {
        CallbackRule::All
    } else if let Some((_, pos)) = POSITIONAL_CALLBACK_METHODS.iter().find(|(n, _)| *n == callee_name) {
        CallbackRule::Position(*pos)
    } else {
        CallbackRule::None
    }
}

/// The name used to look `callee_name` up in the higher-order catalogue:
/// the bare identifier, or the last segment of a member expression
/// (`promise.then` -> `then`).
fn callee_name_for_catalogue(func_node: &Node, source: &str) -> String {
    match func_node.kind() {
        "identifier" => text_of(func_node, source).to_string(),
        "member_expression" => func_node
            .child_by_field_name("property")
            .map(|p| text_of(&p, source).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// `f.call(...)`/`f.apply(...)`/`f.bind(...)` (§4.4 item 3): the thing
/// actually being invoked is `f`, not `call`/`apply`/`bind` itself.
fn rewrite_call_apply_bind<'a>(func_node: Node<'a>, source: &str) -> Option<Node<'a>> {
    if func_node.kind() != "member_expression" {
        return None;
    }
    let property = func_node.child_by_field_name("property")?;
    if matches!(text_of(&property, source), "call" | "apply" | "bind") {
        func_node.child_by_field_name("object")
    } else {
        None
    }
}

/// Pre-pass ("local-alias map", "non-callable set"): `const a = b`,
/// ternary assignments whose branches are identifiers, and bindings to
/// literals/`new X()` results. One map for the whole file rather than
/// scoped per function — alias/non-callable bindings are treated as plain
/// file-level local state rather than mandating exact scope boundaries.
fn collect_bindings(node: Node, source: &str, aliases: &mut HashMap<String, Vec<String>>, non_callable: &mut HashSet<String>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    if node.kind() == "variable_declarator" {
        if let (Some(name_node), Some(value)) = (node.child_by_field_name("name"), node.child_by_field_name("value")) {
            if name_node.kind() == "identifier" {
                let name = text_of(&name_node, source).to_string();
                match value.kind() {
                    "identifier" => {
                        aliases.insert(name, vec![text_of(&value, source).to_string()]);
                    }
                    "ternary_expression" => {
                        let mut targets = Vec::new();
                        if let Some(c) = value.child_by_field_name("consequence") {
                            if c.kind() == "identifier" {
                                targets.push(text_of(&c, source).to_string());
                            }
                        }
                        if let Some(a) = value.child_by_field_name("alternative") {
                            if a.kind() == "identifier" {
                                targets.push(text_of(&a, source).to_string());
                            }
                        }
                        if !targets.is_empty() {
                            aliases.insert(name, targets);
                        }
                    }
                    "number" | "string" | "true" | "false" | "null" | "undefined" | "array" | "object" | "template_string" => {
                        non_callable.insert(name);
                    }
                    "new_expression" => {
                        non_callable.insert(name);
                    }
                    _ => {}
                }
            } else if name_node.kind() == "object_pattern" {
                let mut pcursor = name_node.walk();
                for prop in name_node.children(&mut pcursor) {
                    if prop.kind() == "pair_pattern" {
                        let key = prop.child_by_field_name("key").map(|k| text_of(&k, source).to_string());
                        let value = prop.child_by_field_name("value").map(|v| text_of(&v, source).to_string());
                        if let (Some(key), Some(value)) = (key, value) {
                            aliases.insert(value, vec![key]);
                        }
                    }
                }
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_bindings(child, source, aliases, non_callable, depth + 1);
    }
}

/// Scan a call's argument list for bare-identifier/member-expression
/// arguments and emit each as a function-reference [`Call`] (§4.4 item
/// 7): confirmed (`isPotentialCallback=false`) when `callee_name` and the
/// argument position match the higher-order catalogue, otherwise
/// reported but marked potential only.
fn scan_callback_args(
    args_node: Node,
    source: &str,
    callee_name: &str,
    out: &mut Vec<Call>,
    enclosing: &[EnclosingFunction],
    non_callable: &HashSet<String>,
) {
    let rule = callback_rule(callee_name);
    let mut cursor = args_node.walk();
    for (idx, child) in args_node.named_children(&mut cursor).enumerate() {
        let (name, receiver, is_method) = match child.kind() {
            "identifier" => (text_of(&child, source).to_string(), None, false),
            "member_expression" => {
                let property = child
                    .child_by_field_name("property")
                    .map(|p| text_of(&p, source).to_string())
                    .unwrap_or_default();
                let object = child.child_by_field_name("object").map(|o| text_of(&o, source).to_string());
                (property, object, true)
            }
            _ => continue,
        };
        if name.is_empty() || non_callable.contains(&name) {
            continue;
        }
        let confirmed = matches!(rule, CallbackRule::All) || matches!(rule, CallbackRule::Position(p) if p == idx);
        out.push(Call {
            callee_name: name.into(),
            line: line_of(&child),
            is_method,
            receiver: receiver.map(|r| r.into()),
            self_attribute: None,
            is_constructor: false,
            is_macro: false,
            is_jsx_component: false,
            is_event_handler: false,
            enclosing_function: enclosing.last().cloned(),
            is_function_reference: true,
            is_potential_callback: !confirmed,
            uncertain: false,
            resolved_names: Vec::new(),
            arguments_text: String::new().into(),
            positional_args: 0,
            named_args: 0,
            has_spread_arg: false,
        });
    }
}

/// Bare-identifier/member-expression JSX attribute values (§4.4 item 9),
/// e.g. `onClick={handler}` — restricted to `on*` event-prop names so
/// ordinary data props (`value={x}`) aren't mistaken for callbacks.
fn emit_jsx_attribute_reference(node: Node, source: &str, out: &mut Vec<Call>, enclosing: &[EnclosingFunction]) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let attr_name = text_of(&name_node, source);
    if !(attr_name.starts_with("on") && attr_name.chars().nth(2).is_some_and(|c| c.is_uppercase())) {
        return;
    }
    let Some(value_node) = node.child_by_field_name("value") else { return };
    if value_node.kind() != "jsx_expression" {
        return;
    }
    let Some(inner) = value_node.named_child(0) else { return };
    let (name, receiver, is_method) = match inner.kind() {
        "identifier" => (text_of(&inner, source).to_string(), None, false),
        "member_expression" => {
            let property = inner.child_by_field_name("property").map(|p| text_of(&p, source).to_string()).unwrap_or_default();
            let object = inner.child_by_field_name("object").map(|o| text_of(&o, source).to_string());
            (property, object, true)
        }
        _ => return,
    };
    if name.is_empty() {
        return;
    }
    out.push(Call {
        callee_name: name.into(),
        line: line_of(&inner),
        is_method,
        receiver: receiver.map(|r| r.into()),
        self_attribute: None,
        is_constructor: false,
        is_macro: false,
        is_jsx_component: false,
        is_event_handler: false,
        enclosing_function: enclosing.last().cloned(),
        is_function_reference: true,
        is_potential_callback: true,
        uncertain: false,
        resolved_names: Vec::new(),
        arguments_text: String::new().into(),
        positional_args: 0,
        named_args: 0,
        has_spread_arg: false,
    });
}

pub(super) fn walk_calls(
    node: Node,
    source: &str,
    out: &mut Vec<Call>,
    enclosing: &mut Vec<EnclosingFunction>,
    depth: usize,
) {
    let mut aliases = HashMap::new();
    let mut non_callable = HashSet::new();
    collect_bindings(node, source, &mut aliases, &mut non_callable, 0);
    walk_calls_inner(node, source, out, enclosing, &aliases, &non_callable, depth);
}

fn walk_calls_inner(
    node: Node,
    source: &str,
    out: &mut Vec<Call>,
    enclosing: &mut Vec<EnclosingFunction>,
    aliases: &HashMap<String, Vec<String>>,
    non_callable: &HashSet<String>,
    depth: usize,
) {
    if !check_recursion_depth(depth) {
        return;
    }
    let pushed = match node.kind() {
        "function_declaration" | "method_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                enclosing.push(EnclosingFunction {
                    name: text_of(&name_node, source).into(),
                    start_line: line_of(&node),
                    end_line: end_line_of(&node),
                });
                true
            } else {
                false
            }
        }
        _ => false,
    };

    match node.kind() {
        "call_expression" => {
            if let Some(func_node) = node.child_by_field_name("function") {
                let args_node = node.child_by_field_name("arguments");
                let args_text = args_node.map(|a| text_of(&a, source)).unwrap_or("()");
                let uncertain = text_of(&func_node, source).contains("?.");
                let target = rewrite_call_apply_bind(func_node, source).unwrap_or(func_node);
                emit_call(target, source, args_text, out, enclosing, aliases, uncertain);
                if let Some(args_node) = args_node {
                    let catalogue_name = callee_name_for_catalogue(&func_node, source);
                    scan_callback_args(args_node, source, &catalogue_name, out, enclosing, non_callable);
                }
            }
        }
        "jsx_opening_element" | "jsx_self_closing_element" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = text_of(&name_node, source);
                let is_component = name.chars().next().is_some_and(|c| c.is_uppercase());
                out.push(Call {
                    callee_name: name.into(),
                    line: line_of(&node),
                    is_method: false,
                    receiver: None,
                    self_attribute: None,
                    is_constructor: false,
                    is_macro: false,
                    is_jsx_component: is_component,
                    is_event_handler: false,
                    enclosing_function: enclosing.last().cloned(),
                    is_function_reference: false,
                    is_potential_callback: false,
                    uncertain: false,
                    resolved_names: Vec::new(),
                    arguments_text: String::new().into(),
                    positional_args: 0,
                    named_args: 0,
                    has_spread_arg: false,
                });
            }
        }
        "jsx_attribute" => emit_jsx_attribute_reference(node, source, out, enclosing),
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_calls_inner(child, source, out, enclosing, aliases, non_callable, depth + 1);
    }

    if pushed {
        enclosing.pop();
    }
}

/// Built-in/host objects whose methods are never in-project calls (§9 open
/// question: "the canonical list ... is left as an implementation detail").
/// `obj.method()` on one of these is skipped outright rather than risking a
/// same-named in-project function absorbing `console.log`/`Math.max`/etc.
pub(super) const JS_HOST_OBJECTS: &[&str] = &[
    "JSON", "Math", "console", "Object", "Array", "Promise", "process", "require", "module",
    "exports", "window", "document",
];

fn emit_call(
    func_node: Node,
    source: &str,
    args_text: &str,
    out: &mut Vec<Call>,
    enclosing: &[EnclosingFunction],
    aliases: &HashMap<String, Vec<String>>,
    uncertain: bool,
) {
    let (callee_name, receiver, is_method) = match func_node.kind() {
        "identifier" => (text_of(&func_node, source).to_string(), None, false),
        "member_expression" => {
            let property = func_node
                .child_by_field_name("property")
                .map(|p| text_of(&p, source).to_string())
                .unwrap_or_default();
            let object = func_node
                .child_by_field_name("object")
                .map(|o| text_of(&o, source).to_string());
            (property, object, true)
        }
        _ => (text_of(&func_node, source).to_string(), None, false),
    };
    if is_method && receiver.as_deref().is_some_and(|r| JS_HOST_OBJECTS.contains(&r)) {
        return;
    }
    let is_constructor = has_ancestor(&func_node, "new_expression");
    let is_event_handler = callee_name.starts_with("handle")
        || (callee_name.starts_with("on") && callee_name.chars().nth(2).is_some_and(|c| c.is_uppercase()));
    let (positional, named, spread) = count_js_args(args_text);
    let resolved_names: Vec<Box<str>> = aliases
        .get(&callee_name)
        .map(|v| v.iter().map(|s| s.as_str().into()).collect())
        .unwrap_or_default();
    out.push(Call {
        callee_name: callee_name.into(),
        line: line_of(&func_node),
        is_method,
        receiver: receiver.map(|r| r.into()),
        self_attribute: None,
        is_constructor,
        is_macro: false,
        is_jsx_component: false,
        is_event_handler,
        enclosing_function: enclosing.last().cloned(),
        is_function_reference: false,
        is_potential_callback: false,
        uncertain,
        resolved_names,
        arguments_text: args_text.into(),
        positional_args: positional,
        named_args: named,
        has_spread_arg: spread,
    });
}

fn count_js_args(args_text: &str) -> (u32, u32, bool) {
    let inner = args_text.trim().trim_start_matches('(').trim_end_matches(')').trim();
    if inner.is_empty() {
        return (0, 0, false);
    }
    let mut positional = 0;
    let mut spread = false;
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut parts = Vec::new();
    for (i, c) in inner.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if part.starts_with("...") {
            spread = true;
        } else {
            positional += 1;
        }
    }
    (positional, 0, spread)
}

pub(super) fn walk_imports(node: Node, source: &str, out: &mut Vec<Import>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    match node.kind() {
        "import_statement" => {
            let source_path = node
                .child_by_field_name("source")
                .map(|s| text_of(&s, source).trim_matches(|c| c == '"' || c == '\'').to_string())
                .unwrap_or_default();
            let mut names = Vec::new();
            let mut kind = ImportKind::Named;
            let mut aliases = HashMap::new();
            if let Some(clause) = node.child_by_field_name("import_clause") {
                collect_import_clause(clause, source, &mut names, &mut kind, &mut aliases);
            }
            out.push(Import {
                source: source_path.into(),
                names,
                kind,
                line: line_of(&node),
                aliases,
                dynamic: false,
            });
        }
        "call_expression" => {
            if let Some(func) = node.child_by_field_name("function") {
                if text_of(&func, source) == "require" {
                    if let Some(args) = node.child_by_field_name("arguments") {
                        if let Some(first) = args.named_child(0) {
                            out.push(Import {
                                source: text_of(&first, source).trim_matches(|c| c == '"' || c == '\'').into(),
                                names: Vec::new(),
                                kind: ImportKind::Require,
                                line: line_of(&node),
                                aliases: HashMap::new(),
                                dynamic: false,
                            });
                        }
                    }
                } else if text_of(&func, source) == "import" {
                    if let Some(args) = node.child_by_field_name("arguments") {
                        if let Some(first) = args.named_child(0) {
                            out.push(Import {
                                source: text_of(&first, source).trim_matches(|c| c == '"' || c == '\'').into(),
                                names: Vec::new(),
                                kind: ImportKind::Dynamic,
                                line: line_of(&node),
                                aliases: HashMap::new(),
                                dynamic: true,
                            });
                        }
                    }
                }
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_imports(child, source, out, depth + 1);
    }
}

fn collect_import_clause(
    clause: Node,
    source: &str,
    names: &mut Vec<Box<str>>,
    kind: &mut ImportKind,
    aliases: &mut HashMap<Box<str>, Box<str>>,
) {
    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                names.push(text_of(&child, source).into());
                *kind = ImportKind::Default;
            }
            "namespace_import" => {
                *kind = ImportKind::Namespace;
                if let Some(id) = child.named_child(0) {
                    names.push(text_of(&id, source).into());
                }
            }
            "named_imports" => {
                let mut ncursor = child.walk();
                for spec in child.children(&mut ncursor) {
                    if spec.kind() == "import_specifier" {
                        let name = spec
                            .child_by_field_name("name")
                            .map(|n| text_of(&n, source).to_string())
                            .unwrap_or_default();
                        if let Some(alias) = spec.child_by_field_name("alias") {
                            aliases.insert(name.clone().into(), text_of(&alias, source).into());
                        }
                        names.push(name.into());
                    }
                }
            }
            _ => {}
        }
    }
}

pub(super) fn walk_exports(node: Node, source: &str, out: &mut Vec<Export>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    if node.kind() == "export_statement" {
        let is_default = node.children(&mut node.walk()).any(|c| c.kind() == "default");
        // `export {X} from '...'` / `export * from '...'`: the `from`
        // clause's field splices its `source` string directly onto this
        // node (tree-sitter inlines the hidden `_from_clause` rule).
        let re_export_source: Option<Box<str>> = node
            .child_by_field_name("source")
            .map(|s| text_of(&s, source).trim_matches(|c| c == '"' || c == '\'').into());
        if let Some(decl) = node.child_by_field_name("declaration") {
            let name_node = match decl.kind() {
                "function_declaration" | "class_declaration" | "generator_function_declaration" => {
                    decl.child_by_field_name("name")
                }
                "lexical_declaration" | "variable_declaration" => decl
                    .named_child(0)
                    .and_then(|d| d.child_by_field_name("name")),
                _ => None,
            };
            if let Some(name_node) = name_node {
                out.push(Export {
                    name: text_of(&name_node, source).into(),
                    kind: if is_default { ExportKind::Default } else { ExportKind::Named },
                    line: line_of(&node),
                    source: None,
                });
            }
        } else {
            let mut cursor = node.walk();
            let mut saw_export_clause = false;
            for child in node.children(&mut cursor) {
                if child.kind() == "export_clause" {
                    saw_export_clause = true;
                    let mut ncursor = child.walk();
                    for spec in child.children(&mut ncursor) {
                        if spec.kind() == "export_specifier" {
                            if let Some(name) = spec.child_by_field_name("name") {
                                out.push(Export {
                                    name: text_of(&name, source).into(),
                                    kind: if re_export_source.is_some() { ExportKind::ReExport } else { ExportKind::Named },
                                    line: line_of(&node),
                                    source: re_export_source.clone(),
                                });
                            }
                        }
                    }
                } else if child.kind() == "identifier" && is_default {
                    out.push(Export {
                        name: text_of(&child, source).into(),
                        kind: ExportKind::Default,
                        line: line_of(&node),
                        source: None,
                    });
                }
            }
            if !saw_export_clause {
                if let Some(src) = &re_export_source {
                    // `export * from '...'` — a namespace re-export with no
                    // named specifiers.
                    out.push(Export {
                        name: "*".into(),
                        kind: ExportKind::ReExport,
                        line: line_of(&node),
                        source: Some(src.clone()),
                    });
                }
            }
        }
        return;
    }
    if node.kind() == "assignment_expression" {
        if let Some(left) = node.child_by_field_name("left") {
            if left.kind() == "member_expression" {
                let object = left.child_by_field_name("object");
                let object_text = object.map(|o| text_of(&o, source)).unwrap_or_default();
                let property_name = left.child_by_field_name("property").map(|p| text_of(&p, source));
                // `module.exports = X` (whole value) vs. `exports.foo = X` /
                // `module.exports.foo = X` (named property).
                let is_whole_module_exports = object_text == "module"
                    && property_name == Some("exports");
                let is_named_property = object_text == "exports"
                    || (object.is_some_and(|o| o.kind() == "member_expression" && text_of(&o, source) == "module.exports"));
                if is_whole_module_exports {
                    if let Some(right) = node.child_by_field_name("right") {
                        out.push(Export {
                            name: text_of(&right, source).into(),
                            kind: ExportKind::CommonJs,
                            line: line_of(&node),
                            source: None,
                        });
                    }
                } else if is_named_property {
                    if let Some(name) = property_name {
                        out.push(Export {
                            name: name.into(),
                            kind: ExportKind::CommonJs,
                            line: line_of(&node),
                            source: None,
                        });
                    }
                }
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_exports(child, source, out, depth + 1);
    }
}

impl Extractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        self.language_id()
    }

    fn find_functions(&mut self, source: &str) -> Vec<Function> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        walk_functions(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_classes(&mut self, source: &str) -> Vec<TypeDecl> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        walk_types(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_state_objects(&mut self, source: &str) -> Vec<StateConstant> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        walk_state_constants(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_calls_in_code(&mut self, source: &str) -> Vec<Call> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut enclosing = Vec::new();
        walk_calls(tree.root_node(), source, &mut out, &mut enclosing, 0);
        out
    }

    fn find_imports_in_code(&mut self, source: &str) -> Vec<Import> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        walk_imports(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_exports_in_code(&mut self, source: &str) -> Vec<Export> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        walk_exports(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_usages_in_code(&mut self, source: &str, name: &str) -> Vec<Usage> {
        find_usages_generic(&mut self.parser, source, name, &["comment"], &["string", "template_string"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> JavaScriptExtractor {
        JavaScriptExtractor::new().unwrap()
    }

    #[test]
    fn host_object_method_calls_are_not_emitted() {
        let mut ex = extractor();
        let calls = ex.find_calls_in_code("function run() {\n  console.log('hi');\n  Math.max(1, 2);\n}\n");
        assert!(!calls.iter().any(|c| c.callee_name.as_ref() == "log"));
        assert!(!calls.iter().any(|c| c.callee_name.as_ref() == "max"));
    }

    #[test]
    fn in_project_method_calls_still_emit_normally() {
        let mut ex = extractor();
        let calls = ex.find_calls_in_code("function run(widget) {\n  widget.render();\n}\n");
        assert!(calls.iter().any(|c| c.callee_name.as_ref() == "render"));
    }

    #[test]
    fn re_export_with_source_is_tagged_and_carries_source() {
        let mut ex = extractor();
        let exports = ex.find_exports_in_code("export { helper } from './util';\n");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].name.as_ref(), "helper");
        assert_eq!(exports[0].kind, ExportKind::ReExport);
        assert_eq!(exports[0].source.as_deref(), Some("./util"));
    }

    #[test]
    fn plain_named_export_has_no_source() {
        let mut ex = extractor();
        let exports = ex.find_exports_in_code("const helper = 1;\nexport { helper };\n");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].kind, ExportKind::Named);
        assert_eq!(exports[0].source, None);
    }

    #[test]
    fn star_re_export_is_captured() {
        let mut ex = extractor();
        let exports = ex.find_exports_in_code("export * from './util';\n");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].name.as_ref(), "*");
        assert_eq!(exports[0].kind, ExportKind::ReExport);
        assert_eq!(exports[0].source.as_deref(), Some("./util"));
    }

    #[test]
    fn commonjs_named_property_exports_are_captured() {
        let mut ex = extractor();
        let exports = ex.find_exports_in_code("exports.helper = function() {};\nmodule.exports.other = 1;\n");
        assert_eq!(exports.len(), 2);
        assert!(exports.iter().any(|e| e.name.as_ref() == "helper"));
        assert!(exports.iter().any(|e| e.name.as_ref() == "other"));
        assert!(exports.iter().all(|e| e.kind == ExportKind::CommonJs));
    }

    #[test]
    fn commonjs_whole_value_export_is_still_captured() {
        let mut ex = extractor();
        let exports = ex.find_exports_in_code("module.exports = Widget;\n");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].name.as_ref(), "Widget");
        assert_eq!(exports[0].kind, ExportKind::CommonJs);
    }
}
