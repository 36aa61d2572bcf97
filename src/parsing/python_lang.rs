//! Python extractor. Same walk-and-classify shape as [`super::rust_lang`],
//! adapted to Python's grammar: `decorated_definition` wrapping, `self.attr`
//! typing for method-resolution rule 3 (§4.6), and leading-docstring
//! extraction instead of preceding line comments.

use std::collections::HashMap;

use tree_sitter::{Node, Parser};

use crate::types::{
    Call, EnclosingFunction, Export, ExportKind, Function, Import, ImportKind, Language,
    Parameter, Span, StateConstant, TypeDecl, TypeKind, Usage,
};

use super::extractor::{
    check_recursion_depth, column_of, end_line_of, leading_docstring, line_of, text_of, Extractor,
};
use super::rust_lang::find_usages_generic;

pub struct PythonExtractor {
    parser: Parser,
}

impl PythonExtractor {
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| format!("python grammar init failed: {e}"))?;
        Ok(Self { parser })
    }

    fn decorators_of(&self, node: Node, source: &str) -> Vec<Box<str>> {
        let mut out = Vec::new();
        if let Some(parent) = node.parent() {
            if parent.kind() == "decorated_definition" {
                let mut cursor = parent.walk();
                for child in parent.children(&mut cursor) {
                    if child.kind() == "decorator" {
                        out.push(text_of(&child, source).trim_start_matches('@').into());
                    }
                }
            }
        }
        out
    }

    fn params_of(&self, node: &Node, source: &str) -> (Box<str>, Vec<Parameter>) {
        let mut out = Vec::new();
        let Some(params_node) = node.child_by_field_name("parameters") else {
            return ("()".into(), out);
        };
        let mut cursor = params_node.walk();
        for child in params_node.children(&mut cursor) {
            match child.kind() {
                "identifier" => out.push(Parameter {
                    name: text_of(&child, source).into(),
                    type_annotation: None,
                    default_value: None,
                    is_optional: false,
                    is_rest: false,
                }),
                "typed_parameter" => {
                    let name = child
                        .child(0)
                        .map(|n| text_of(&n, source).to_string())
                        .unwrap_or_default();
                    let ty = child.child_by_field_name("type");
                    out.push(Parameter {
                        name: name.into(),
                        type_annotation: ty.map(|t| text_of(&t, source).into()),
                        default_value: None,
                        is_optional: false,
                        is_rest: false,
                    });
                }
                "default_parameter" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| text_of(&n, source).to_string())
                        .unwrap_or_default();
                    let value = child.child_by_field_name("value");
                    out.push(Parameter {
                        name: name.into(),
                        type_annotation: None,
                        default_value: value.map(|v| text_of(&v, source).into()),
                        is_optional: true,
                        is_rest: false,
                    });
                }
                "typed_default_parameter" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| text_of(&n, source).to_string())
                        .unwrap_or_default();
                    let ty = child.child_by_field_name("type");
                    let value = child.child_by_field_name("value");
                    out.push(Parameter {
                        name: name.into(),
                        type_annotation: ty.map(|t| text_of(&t, source).into()),
                        default_value: value.map(|v| text_of(&v, source).into()),
                        is_optional: true,
                        is_rest: false,
                    });
                }
                "list_splat_pattern" | "dictionary_splat_pattern" => out.push(Parameter {
                    name: text_of(&child, source).into(),
                    type_annotation: None,
                    default_value: None,
                    is_optional: false,
                    is_rest: true,
                }),
                _ => {}
            }
        }
        (text_of(&params_node, source).into(), out)
    }

    fn function_from_node(&self, node: Node, source: &str, is_method: bool, receiver_type: Option<Box<str>>) -> Function {
        let name = node
            .child_by_field_name("name")
            .map(|n| text_of(&n, source).to_string())
            .unwrap_or_default();
        let (params_text, params) = self.params_of(&node, source);
        let return_type = node
            .child_by_field_name("return_type")
            .map(|t| text_of(&t, source).into());
        let decorators = self.decorators_of(node, source);
        let docstring = node
            .child_by_field_name("body")
            .and_then(|b| leading_docstring(&b, source, "string"));
        let outer_start = if decorators.is_empty() {
            line_of(&node)
        } else {
            node.parent().map(|p| line_of(&p)).unwrap_or(line_of(&node))
        };
        Function {
            name: name.into(),
            params_text,
            params,
            return_type,
            span: Span::new(outer_start, column_of(&node), end_line_of(&node), 0),
            name_line: if outer_start != line_of(&node) {
                Some(line_of(&node))
            } else {
                None
            },
            indentation: column_of(&node),
            modifiers: Vec::new(),
            docstring,
            decorators,
            generics: None,
            is_method,
            receiver_type,
        }
    }

    fn walk_functions(&self, node: Node, source: &str, out: &mut Vec<Function>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "function_definition" {
            let in_class = has_ancestor(&node, "class_definition");
            if !in_class {
                out.push(self.function_from_node(node, source, false, None));
            }
            return;
        }
        if node.kind() == "class_definition" {
            let class_name = node
                .child_by_field_name("name")
                .map(|n| text_of(&n, source).to_string())
                .unwrap_or_default();
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    let target = if child.kind() == "decorated_definition" {
                        child.children(&mut child.walk()).find(|c| c.kind() == "function_definition")
                    } else if child.kind() == "function_definition" {
                        Some(child)
                    } else {
                        None
                    };
                    if let Some(func_node) = target {
                        out.push(self.function_from_node(func_node, source, true, Some(class_name.clone().into())));
                    }
                }
            }
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_functions(child, source, out, depth + 1);
        }
    }

    fn walk_types(&self, node: Node, source: &str, out: &mut Vec<TypeDecl>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "class_definition" {
            let name: Box<str> = node
                .child_by_field_name("name")
                .map(|n| text_of(&n, source))
                .unwrap_or_default()
                .into();
            let bases: Vec<Box<str>> = node
                .child_by_field_name("superclasses")
                .map(|sc| {
                    let mut cursor = sc.walk();
                    sc.children(&mut cursor)
                        .filter(|c| c.kind() == "identifier" || c.kind() == "attribute")
                        .map(|c| text_of(&c, source).into())
                        .collect()
                })
                .unwrap_or_default();
            let docstring = node
                .child_by_field_name("body")
                .and_then(|b| leading_docstring(&b, source, "string"));
            let mut members = Vec::new();
            self.walk_functions(node, source, &mut members, depth);
            out.push(TypeDecl {
                name,
                kind: TypeKind::Class,
                span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
                members,
                modifiers: Vec::new(),
                extends: bases.first().cloned(),
                implements: bases.into_iter().skip(1).collect(),
                generics: None,
                docstring,
            });
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_types(child, source, out, depth + 1);
        }
    }

    fn walk_state_constants(&self, node: Node, source: &str, out: &mut Vec<StateConstant>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "module" {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "expression_statement" {
                    if let Some(assign) = child.child(0) {
                        if assign.kind() == "assignment" {
                            if let Some(left) = assign.child_by_field_name("left") {
                                if left.kind() == "identifier" {
                                    let name = text_of(&left, source);
                                    if name.chars().all(|c| c.is_uppercase() || c == '_' || c.is_numeric()) {
                                        out.push(StateConstant {
                                            name: name.into(),
                                            span: Span::new(line_of(&child), column_of(&child), end_line_of(&child), 0),
                                        });
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn walk_calls(
        &self,
        node: Node,
        source: &str,
        out: &mut Vec<Call>,
        enclosing: &mut Vec<EnclosingFunction>,
        depth: usize,
    ) {
        if !check_recursion_depth(depth) {
            return;
        }
        let pushed = if node.kind() == "function_definition" {
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
        } else {
            false
        };

        if node.kind() == "call" {
            if let Some(func_node) = node.child_by_field_name("function") {
                let args = node
                    .child_by_field_name("arguments")
                    .map(|a| text_of(&a, source))
                    .unwrap_or("()");
                self.emit_call(func_node, source, args, out, enclosing);
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_calls(child, source, out, enclosing, depth + 1);
        }

        if pushed {
            enclosing.pop();
        }
    }

    fn emit_call(
        &self,
        func_node: Node,
        source: &str,
        args_text: &str,
        out: &mut Vec<Call>,
        enclosing: &[EnclosingFunction],
    ) {
        let (callee_name, receiver, is_method, self_attribute) = match func_node.kind() {
            "identifier" => (text_of(&func_node, source).to_string(), None, false, None),
            "attribute" => {
                let attr = func_node
                    .child_by_field_name("attribute")
                    .map(|a| text_of(&a, source).to_string())
                    .unwrap_or_default();
                let object = func_node.child_by_field_name("object");
                let object_text = object.map(|o| text_of(&o, source).to_string());
                // `self.attr.method(...)` (§4.4 item 2): the receiver
                // itself is `self.attr`, one level deeper than the plain
                // `self.method()` case. Record `attr` so method
                // resolution can look it up in `instance_attribute_types`
                // (§4.6 rule 3) rather than treating the call as
                // uncertain.
                let self_attr = object.and_then(|o| {
                    if o.kind() != "attribute" {
                        return None;
                    }
                    let inner_object = o.child_by_field_name("object")?;
                    if !matches!(text_of(&inner_object, source), "self" | "cls") {
                        return None;
                    }
                    let inner_attr = o.child_by_field_name("attribute")?;
                    Some(text_of(&inner_attr, source).to_string())
                });
                (attr, object_text, true, self_attr)
            }
            _ => (text_of(&func_node, source).to_string(), None, false, None),
        };
        let is_constructor = callee_name.chars().next().is_some_and(|c| c.is_uppercase());
        let (positional, named, spread) = count_python_args(args_text);
        out.push(Call {
            callee_name: callee_name.into(),
            line: line_of(&func_node),
            is_method,
            receiver: receiver.map(|r| r.into()),
            self_attribute,
            is_constructor,
            is_macro: false,
            is_jsx_component: false,
            is_event_handler: false,
            enclosing_function: enclosing.last().cloned(),
            is_function_reference: false,
            is_potential_callback: false,
            uncertain: false,
            resolved_names: Vec::new(),
            arguments_text: args_text.into(),
            positional_args: positional,
            named_args: named,
            has_spread_arg: spread,
        });
    }

    fn walk_imports(&self, node: Node, source: &str, out: &mut Vec<Import>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    match child.kind() {
                        "dotted_name" => out.push(Import {
                            source: text_of(&child, source).into(),
                            names: Vec::new(),
                            kind: ImportKind::Named,
                            line: line_of(&node),
                            aliases: HashMap::new(),
                            dynamic: false,
                        }),
                        "aliased_import" => {
                            let name = child
                                .child_by_field_name("name")
                                .map(|n| text_of(&n, source).to_string())
                                .unwrap_or_default();
                            let alias = child
                                .child_by_field_name("alias")
                                .map(|a| text_of(&a, source).to_string())
                                .unwrap_or_default();
                            let mut aliases = HashMap::new();
                            aliases.insert(name.clone().into(), alias.into());
                            out.push(Import {
                                source: name.into(),
                                names: Vec::new(),
                                kind: ImportKind::Named,
                                line: line_of(&node),
                                aliases,
                                dynamic: false,
                            });
                        }
                        _ => {}
                    }
                }
            }
            "import_from_statement" => {
                let module = node
                    .child_by_field_name("module_name")
                    .map(|m| text_of(&m, source).to_string())
                    .unwrap_or_default();
                let mut names = Vec::new();
                let mut cursor = node.walk();
                let mut wildcard = false;
                for child in node.children(&mut cursor) {
                    match child.kind() {
                        "dotted_name" if text_of(&child, source) != module => {
                            names.push(text_of(&child, source).into())
                        }
                        "wildcard_import" => wildcard = true,
                        "aliased_import" => {
                            if let Some(n) = child.child_by_field_name("name") {
                                names.push(text_of(&n, source).into());
                            }
                        }
                        _ => {}
                    }
                }
                out.push(Import {
                    source: module.into(),
                    names: if wildcard { vec!["*".into()] } else { names },
                    kind: ImportKind::Relative,
                    line: line_of(&node),
                    aliases: HashMap::new(),
                    dynamic: false,
                });
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_imports(child, source, out, depth + 1);
        }
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

fn count_python_args(args_text: &str) -> (u32, u32, bool) {
    let inner = args_text.trim().trim_start_matches('(').trim_end_matches(')').trim();
    if inner.is_empty() {
        return (0, 0, false);
    }
    let mut positional = 0;
    let mut named = 0;
    let mut spread = false;
    for part in split_top_level(inner) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if part.starts_with("**") || part.starts_with('*') {
            spread = true;
        } else if part.contains('=') && !part.contains("==") {
            named += 1;
        } else {
            positional += 1;
        }
    }
    (positional, named, spread)
}

fn split_top_level(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
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
    parts
}

impl Extractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn find_functions(&mut self, source: &str) -> Vec<Function> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.walk_functions(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_classes(&mut self, source: &str) -> Vec<TypeDecl> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.walk_types(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_state_objects(&mut self, source: &str) -> Vec<StateConstant> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.walk_state_constants(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_calls_in_code(&mut self, source: &str) -> Vec<Call> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut enclosing = Vec::new();
        self.walk_calls(tree.root_node(), source, &mut out, &mut enclosing, 0);
        out
    }

    fn find_imports_in_code(&mut self, source: &str) -> Vec<Import> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.walk_imports(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_exports_in_code(&mut self, source: &str) -> Vec<Export> {
        // Python has no export keyword; every module-level, non-underscore
        // name is importable (§6 table: "all non-underscore top-level names").
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cursor = tree.root_node().walk();
        for child in tree.root_node().children(&mut cursor) {
            let name_node = match child.kind() {
                "function_definition" | "class_definition" => child.child_by_field_name("name"),
                "decorated_definition" => child
                    .children(&mut child.walk())
                    .find(|c| c.kind() == "function_definition" || c.kind() == "class_definition")
                    .and_then(|d| d.child_by_field_name("name")),
                _ => None,
            };
            if let Some(name_node) = name_node {
                let name = text_of(&name_node, source);
                if !name.starts_with('_') {
                    out.push(Export {
                        name: name.into(),
                        kind: ExportKind::Named,
                        line: line_of(&child),
                        source: None,
                    });
                }
            }
        }
        out
    }

    fn find_usages_in_code(&mut self, source: &str, name: &str) -> Vec<Usage> {
        find_usages_generic(&mut self.parser, source, name, &["comment"], &["string"])
    }

    fn find_instance_attribute_types(&mut self, source: &str) -> HashMap<Box<str>, HashMap<Box<str>, Box<str>>> {
        let Some(tree) = self.parser.parse(source, None) else {
            return HashMap::new();
        };
        let mut result = HashMap::new();
        let mut cursor = tree.root_node().walk();
        for class_node in tree.root_node().children(&mut cursor) {
            if class_node.kind() != "class_definition" {
                continue;
            }
            let class_name: Box<str> = class_node
                .child_by_field_name("name")
                .map(|n| text_of(&n, source))
                .unwrap_or_default()
                .into();
            let mut attrs = HashMap::new();
            if let Some(body) = class_node.child_by_field_name("body") {
                self.collect_typed_self_attrs(body, source, &mut attrs, 0);
            }
            if !attrs.is_empty() {
                result.insert(class_name, attrs);
            }
        }
        result
    }
}

impl PythonExtractor {
    fn collect_typed_self_attrs(&self, node: Node, source: &str, out: &mut HashMap<Box<str>, Box<str>>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "assignment" {
            if let (Some(left), Some(type_node)) = (
                node.child_by_field_name("left"),
                node.child_by_field_name("type"),
            ) {
                if left.kind() == "attribute" {
                    if let Some(obj) = left.child_by_field_name("object") {
                        if text_of(&obj, source) == "self" {
                            if let Some(attr) = left.child_by_field_name("attribute") {
                                out.insert(text_of(&attr, source).into(), text_of(&type_node, source).into());
                            }
                        }
                    }
                }
            } else if let (Some(left), Some(right)) = (
                node.child_by_field_name("left"),
                node.child_by_field_name("right"),
            ) {
                if left.kind() == "attribute" && right.kind() == "call" {
                    if let Some(obj) = left.child_by_field_name("object") {
                        if text_of(&obj, source) == "self" {
                            if let (Some(attr), Some(func)) =
                                (left.child_by_field_name("attribute"), right.child_by_field_name("function"))
                            {
                                out.insert(text_of(&attr, source).into(), text_of(&func, source).into());
                            }
                        }
                    }
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_typed_self_attrs(child, source, out, depth + 1);
        }
    }
}
