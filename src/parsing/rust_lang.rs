//! Rust extractor: a hand-rolled recursive `tree_sitter::Node` walk per
//! operation, impl-block ancestry used to distinguish free functions
//! from methods, `use_tree` recursion for grouped/aliased/glob imports.

use std::collections::{HashMap, HashSet};

use tree_sitter::{Node, Parser};

use crate::types::{
    Call, EnclosingFunction, Export, ExportKind, Function, Import, ImportKind, Language,
    Parameter, Span, StateConstant, TypeDecl, TypeKind, Usage, UsageKind,
};

use super::extractor::{
    check_recursion_depth, column_of, end_line_of, line_of, preceding_doc_comment, text_of,
    Extractor,
};

const DOC_KINDS: &[&str] = &["line_comment", "block_comment"];

pub struct RustExtractor {
    parser: Parser,
}

impl RustExtractor {
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| format!("rust grammar init failed: {e}"))?;
        Ok(Self { parser })
    }

    fn parse_tree(&mut self, source: &str) -> Option<tree_sitter::Tree> {
        self.parser.parse(source, None)
    }

    fn modifiers_of(node: &Node, source: &str) -> Vec<Box<str>> {
        let mut mods = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "visibility_modifier" => mods.push(text_of(&child, source).into()),
                "function_modifiers" => {
                    let text = text_of(&child, source);
                    for word in text.split_whitespace() {
                        mods.push(word.into());
                    }
                }
                _ => {}
            }
        }
        mods
    }

    fn decorators_of(node: &Node, source: &str) -> Vec<Box<str>> {
        let mut out = Vec::new();
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if s.kind() == "attribute_item" {
                out.push(text_of(&s, source).into());
                sibling = s.prev_sibling();
            } else {
                break;
            }
        }
        out.reverse();
        out
    }

    fn params_of(node: &Node, source: &str) -> (Box<str>, Vec<Parameter>) {
        let mut params = Vec::new();
        if let Some(params_node) = node.child_by_field_name("parameters") {
            let text = text_of(&params_node, source);
            let mut cursor = params_node.walk();
            for child in params_node.children(&mut cursor) {
                match child.kind() {
                    "parameter" => {
                        let pattern = child.child_by_field_name("pattern");
                        let ty = child.child_by_field_name("type");
                        let name = pattern
                            .map(|p| text_of(&p, source).to_string())
                            .unwrap_or_default();
                        params.push(Parameter {
                            name: name.into(),
                            type_annotation: ty.map(|t| text_of(&t, source).into()),
                            default_value: None,
                            is_optional: false,
                            is_rest: false,
                        });
                    }
                    "self_parameter" => {
                        params.push(Parameter {
                            name: text_of(&child, source).into(),
                            type_annotation: None,
                            default_value: None,
                            is_optional: false,
                            is_rest: false,
                        });
                    }
                    _ => {}
                }
            }
            (text.into(), params)
        } else {
            ("()".into(), params)
        }
    }

    fn function_from_node(
        &self,
        node: Node,
        source: &str,
        is_method: bool,
        receiver_type: Option<Box<str>>,
    ) -> Option<Function> {
        let name_node = node.child_by_field_name("name")?;
        let name: Box<str> = text_of(&name_node, source).into();
        let (params_text, params) = Self::params_of(&node, source);
        let return_type = node
            .child_by_field_name("return_type")
            .map(|t| text_of(&t, source).into());
        let generics = node
            .child_by_field_name("type_parameters")
            .map(|t| text_of(&t, source).into());
        let decorators = Self::decorators_of(&node, source);
        let modifiers = Self::modifiers_of(&node, source);
        let docstring = preceding_doc_comment(&node, source, DOC_KINDS);
        let start_line = decorators
            .first()
            .map(|_| node.prev_sibling().map(|s| line_of(&s)).unwrap_or(line_of(&node)))
            .unwrap_or_else(|| line_of(&node));

        Some(Function {
            name,
            params_text,
            params,
            return_type,
            span: Span::new(start_line, column_of(&node), end_line_of(&node), 0),
            name_line: if start_line != line_of(&node) {
                Some(line_of(&node))
            } else {
                None
            },
            indentation: column_of(&node),
            modifiers,
            docstring,
            decorators,
            generics,
            is_method,
            receiver_type,
        })
    }

    fn walk_functions(&self, node: Node, source: &str, out: &mut Vec<Function>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        match node.kind() {
            "function_item" => {
                let in_impl = has_ancestor(&node, "impl_item");
                if !in_impl {
                    if let Some(f) = self.function_from_node(node, source, false, None) {
                        out.push(f);
                    }
                }
                // do not descend into nested function bodies for top-level list (§4.3)
                return;
            }
            "impl_item" => {
                let receiver = node
                    .child_by_field_name("type")
                    .map(|t| text_of(&t, source).to_string());
                if let Some(body) = node.child_by_field_name("body") {
                    let mut bcursor = body.walk();
                    for child in body.children(&mut bcursor) {
                        if child.kind() == "function_item" {
                            if let Some(f) = self.function_from_node(
                                child,
                                source,
                                true,
                                receiver.clone().map(|s| s.into_boxed_str()),
                            ) {
                                out.push(f);
                            }
                        }
                    }
                }
                return;
            }
            "trait_item" => {
                // trait method signatures are members, collected via find_classes
                return;
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_functions(child, source, out, depth + 1);
        }
    }

    fn members_of_body(&self, body: Option<Node>, source: &str, receiver: &str) -> Vec<Function> {
        let mut members = Vec::new();
        if let Some(body) = body {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                if child.kind() == "function_item" || child.kind() == "function_signature_item" {
                    if let Some(f) =
                        self.function_from_node(child, source, true, Some(receiver.into()))
                    {
                        members.push(f);
                    }
                }
            }
        }
        members
    }

    fn walk_types(&self, node: Node, source: &str, out: &mut Vec<TypeDecl>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        let kind = match node.kind() {
            "struct_item" => Some(TypeKind::Struct),
            "enum_item" => Some(TypeKind::Enum),
            "trait_item" => Some(TypeKind::Trait),
            "type_item" => Some(TypeKind::TypeAlias),
            "mod_item" => Some(TypeKind::Module),
            "macro_definition" => Some(TypeKind::Macro),
            "impl_item" => Some(TypeKind::Impl),
            _ => None,
        };
        if let Some(kind) = kind {
            if kind == TypeKind::Impl {
                let ty = node
                    .child_by_field_name("type")
                    .map(|t| text_of(&t, source).to_string())
                    .unwrap_or_default();
                let trait_name = node
                    .child_by_field_name("trait")
                    .map(|t| text_of(&t, source).to_string());
                let name = trait_name
                    .clone()
                    .map(|t| format!("{ty} as {t}"))
                    .unwrap_or_else(|| ty.clone());
                let members = self.members_of_body(node.child_by_field_name("body"), source, &ty);
                out.push(TypeDecl {
                    name: name.into(),
                    kind: TypeKind::Impl,
                    span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
                    members,
                    modifiers: Vec::new(),
                    extends: None,
                    implements: trait_name.map(|t| t.into()).into_iter().collect(),
                    generics: node
                        .child_by_field_name("type_parameters")
                        .map(|t| text_of(&t, source).into()),
                    docstring: None,
                });
            } else if let Some(name_node) = node.child_by_field_name("name") {
                let name: Box<str> = text_of(&name_node, source).into();
                let members = if kind == TypeKind::Trait {
                    self.members_of_body(node.child_by_field_name("body"), source, &name)
                } else {
                    Vec::new()
                };
                out.push(TypeDecl {
                    name,
                    kind,
                    span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
                    members,
                    modifiers: Self::modifiers_of(&node, source),
                    extends: None,
                    implements: Vec::new(),
                    generics: node
                        .child_by_field_name("type_parameters")
                        .map(|t| text_of(&t, source).into()),
                    docstring: preceding_doc_comment(&node, source, DOC_KINDS),
                });
            }
            if kind != TypeKind::Module {
                return;
            }
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
        if matches!(node.kind(), "const_item" | "static_item") && !has_ancestor(&node, "function_item") {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = text_of(&name_node, source);
                if is_state_like_name(name) {
                    out.push(StateConstant {
                        name: name.into(),
                        span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
                    });
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_state_constants(child, source, out, depth + 1);
        }
    }

    fn walk_calls(
        &self,
        node: Node,
        source: &str,
        out: &mut Vec<Call>,
        enclosing: &mut Vec<EnclosingFunction>,
        aliases: &HashMap<String, String>,
        depth: usize,
    ) {
        if !check_recursion_depth(depth) {
            return;
        }
        let pushed = if node.kind() == "function_item" {
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

        match node.kind() {
            "macro_invocation" => {
                if let Some(macro_node) = node.child_by_field_name("macro") {
                    let name = text_of(&macro_node, source);
                    out.push(Call {
                        callee_name: name.into(),
                        line: line_of(&node),
                        is_method: false,
                        receiver: None,
                        self_attribute: None,
                        is_constructor: false,
                        is_macro: true,
                        is_jsx_component: false,
                        is_event_handler: false,
                        enclosing_function: enclosing.last().cloned(),
                        is_function_reference: false,
                        is_potential_callback: false,
                        uncertain: false,
                        resolved_names: Vec::new(),
                        arguments_text: node
                            .child_by_field_name("token_tree")
                            .map(|t| text_of(&t, source).into())
                            .unwrap_or_default(),
                        positional_args: 0,
                        named_args: 0,
                        has_spread_arg: false,
                    });
                }
            }
            "call_expression" => {
                if let Some(function_node) = node.child_by_field_name("function") {
                    let args = node
                        .child_by_field_name("arguments")
                        .map(|a| text_of(&a, source))
                        .unwrap_or("()");
                    self.emit_call(function_node, source, args, out, enclosing, aliases);
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_calls(child, source, out, enclosing, aliases, depth + 1);
        }

        if pushed {
            enclosing.pop();
        }
    }

    fn emit_call(
        &self,
        function_node: Node,
        source: &str,
        args_text: &str,
        out: &mut Vec<Call>,
        enclosing: &[EnclosingFunction],
        aliases: &HashMap<String, String>,
    ) {
        let (callee_name, receiver, is_method) = match function_node.kind() {
            "identifier" => (text_of(&function_node, source).to_string(), None, false),
            "field_expression" => {
                let field = function_node
                    .child_by_field_name("field")
                    .map(|f| text_of(&f, source).to_string())
                    .unwrap_or_default();
                let value = function_node
                    .child_by_field_name("value")
                    .map(|v| text_of(&v, source).to_string());
                (field, value, true)
            }
            "scoped_identifier" => {
                let name = function_node
                    .child_by_field_name("name")
                    .map(|n| text_of(&n, source).to_string())
                    .unwrap_or_default();
                let path = function_node
                    .child_by_field_name("path")
                    .map(|p| text_of(&p, source).to_string());
                (name, path, true)
            }
            _ => (text_of(&function_node, source).to_string(), None, false),
        };
        let is_constructor = callee_name == "new" || callee_name.chars().next().is_some_and(|c| c.is_uppercase());
        let resolved = aliases
            .get(&callee_name)
            .map(|r| vec![r.as_str().into()])
            .unwrap_or_default();
        let (positional, named, spread) = count_args(args_text);
        out.push(Call {
            callee_name: callee_name.into(),
            line: line_of(&function_node),
            is_method,
            receiver: receiver.map(|r| r.into()),
            self_attribute: None,
            is_constructor,
            is_macro: false,
            is_jsx_component: false,
            is_event_handler: false,
            enclosing_function: enclosing.last().cloned(),
            is_function_reference: false,
            is_potential_callback: false,
            uncertain: false,
            resolved_names: resolved,
            arguments_text: args_text.into(),
            positional_args: positional,
            named_args: named,
            has_spread_arg: spread,
        });
    }

    fn collect_let_aliases(&self, node: Node, source: &str, out: &mut HashMap<String, String>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "let_declaration" {
            if let (Some(pattern), Some(value)) = (
                node.child_by_field_name("pattern"),
                node.child_by_field_name("value"),
            ) {
                if pattern.kind() == "identifier" && value.kind() == "identifier" {
                    out.insert(
                        text_of(&pattern, source).to_string(),
                        text_of(&value, source).to_string(),
                    );
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_let_aliases(child, source, out, depth + 1);
        }
    }

    fn walk_uses(&self, node: Node, source: &str, out: &mut Vec<Import>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "use_declaration" {
            if let Some(tree_node) = node
                .children(&mut node.walk())
                .find(|n| n.kind() == "use_tree" || n.kind() == "scoped_use_list" || n.kind() == "use_wildcard" || n.kind() == "identifier" || n.kind() == "scoped_identifier")
            {
                self.extract_use_tree(tree_node, source, line_of(&node), String::new(), out);
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_uses(child, source, out, depth + 1);
        }
    }

    fn extract_use_tree(&self, node: Node, source: &str, line: u32, prefix: String, out: &mut Vec<Import>) {
        match node.kind() {
            "use_wildcard" => {
                let path = node
                    .child(0)
                    .map(|n| text_of(&n, source).to_string())
                    .unwrap_or(prefix);
                out.push(Import {
                    source: path.into(),
                    names: vec!["*".into()],
                    kind: ImportKind::Named,
                    line,
                    aliases: HashMap::new(),
                    dynamic: false,
                });
            }
            "use_as_clause" => {
                let path_node = node.child(0);
                let alias_node = node.child_by_field_name("alias");
                if let (Some(path), Some(alias)) = (path_node, alias_node) {
                    let path_text = text_of(&path, source).to_string();
                    let alias_text = text_of(&alias, source).to_string();
                    let mut aliases = HashMap::new();
                    aliases.insert(path_text.clone().into(), alias_text.into());
                    out.push(Import {
                        source: path_text.into(),
                        names: Vec::new(),
                        kind: ImportKind::Named,
                        line,
                        aliases,
                        dynamic: false,
                    });
                }
            }
            "use_list" => {
                let mut cursor = node.walk();
                for item in node.children(&mut cursor) {
                    if item.kind() == "use_tree" || item.kind() == "identifier" || item.kind() == "scoped_identifier" || item.kind() == "use_as_clause" || item.kind() == "use_wildcard" {
                        self.extract_use_tree(item, source, line, prefix.clone(), out);
                    }
                }
            }
            "scoped_use_list" => {
                let path_prefix = node
                    .child_by_field_name("path")
                    .map(|p| text_of(&p, source).to_string())
                    .unwrap_or(prefix);
                if let Some(list) = node.child_by_field_name("list") {
                    self.extract_use_tree(list, source, line, path_prefix, out);
                }
            }
            "identifier" | "scoped_identifier" => {
                out.push(Import {
                    source: text_of(&node, source).into(),
                    names: Vec::new(),
                    kind: ImportKind::Named,
                    line,
                    aliases: HashMap::new(),
                    dynamic: false,
                });
            }
            "use_tree" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.extract_use_tree(child, source, line, prefix.clone(), out);
                }
            }
            _ => {}
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

fn is_state_like_name(name: &str) -> bool {
    let all_caps = name.chars().any(|c| c.is_alphabetic()) && name.chars().all(|c| c.is_uppercase() || c == '_' || c.is_numeric());
    let config_suffix = ["Config", "Settings", "Options", "State", "Store", "Context"]
        .iter()
        .any(|suffix| name.ends_with(suffix));
    all_caps || config_suffix
}

fn count_args(args_text: &str) -> (u32, u32, bool) {
    let inner = args_text.trim().trim_start_matches('(').trim_end_matches(')').trim();
    if inner.is_empty() {
        return (0, 0, false);
    }
    let mut positional = 0u32;
    let mut named = 0u32;
    let mut spread = false;
    let mut depth = 0i32;
    let mut start = 0usize;
    let bytes = inner.as_bytes();
    let mut parts = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth -= 1,
            b',' if depth == 0 => {
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
        if part.starts_with("..") {
            spread = true;
        } else if part.contains(':') && !part.starts_with("::") {
            named += 1;
        } else {
            positional += 1;
        }
    }
    (positional, named, spread)
}

impl Extractor for RustExtractor {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn find_functions(&mut self, source: &str) -> Vec<Function> {
        let Some(tree) = self.parse_tree(source) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.walk_functions(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_classes(&mut self, source: &str) -> Vec<TypeDecl> {
        let Some(tree) = self.parse_tree(source) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.walk_types(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_state_objects(&mut self, source: &str) -> Vec<StateConstant> {
        let Some(tree) = self.parse_tree(source) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.walk_state_constants(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_calls_in_code(&mut self, source: &str) -> Vec<Call> {
        let Some(tree) = self.parse_tree(source) else {
            return Vec::new();
        };
        let mut aliases = HashMap::new();
        self.collect_let_aliases(tree.root_node(), source, &mut aliases, 0);
        let mut out = Vec::new();
        let mut enclosing = Vec::new();
        self.walk_calls(tree.root_node(), source, &mut out, &mut enclosing, &aliases, 0);
        out
    }

    fn find_imports_in_code(&mut self, source: &str) -> Vec<Import> {
        let Some(tree) = self.parse_tree(source) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.walk_uses(tree.root_node(), source, &mut out, 0);
        out
    }

    fn find_exports_in_code(&mut self, source: &str) -> Vec<Export> {
        // Every item carrying a visibility modifier is exported (§6 table).
        let Some(tree) = self.parse_tree(source) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        collect_visible_items(tree.root_node(), source, &mut out, &mut seen, 0);
        out
    }

    fn find_usages_in_code(&mut self, source: &str, name: &str) -> Vec<Usage> {
        find_usages_generic(&mut self.parser, source, name, &["line_comment", "block_comment"], &["string_literal", "raw_string_literal"])
    }
}

fn collect_visible_items(
    node: Node,
    source: &str,
    out: &mut Vec<Export>,
    seen: &mut HashSet<(String, u32)>,
    depth: usize,
) {
    if !check_recursion_depth(depth) {
        return;
    }
    let kind_name = match node.kind() {
        "function_item" | "struct_item" | "enum_item" | "trait_item" | "type_item" | "const_item" | "static_item" | "mod_item" => {
            node.child_by_field_name("name")
        }
        _ => None,
    };
    if let Some(name_node) = kind_name {
        let has_pub = node
            .children(&mut node.walk())
            .any(|c| c.kind() == "visibility_modifier");
        if has_pub {
            let name = text_of(&name_node, source).to_string();
            let line = line_of(&node);
            if seen.insert((name.clone(), line)) {
                out.push(Export {
                    name: name.into(),
                    kind: ExportKind::Named,
                    line,
                    source: None,
                });
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_visible_items(child, source, out, seen, depth + 1);
    }
}

/// Shared usage classifier: walks every leaf identifier matching `name`
/// and classifies it by syntactic role and by whether it sits inside a
/// comment/string node (§4.3 `findUsagesInCode`, §8 boundary behavior).
pub(super) fn find_usages_generic(
    parser: &mut Parser,
    source: &str,
    name: &str,
    comment_kinds: &[&str],
    string_kinds: &[&str],
) -> Vec<Usage> {
    let Some(tree) = parser.parse(source, None) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    walk_usages(tree.root_node(), source, name, comment_kinds, string_kinds, &mut out, 0);
    out
}

fn walk_usages(
    node: Node,
    source: &str,
    name: &str,
    comment_kinds: &[&str],
    string_kinds: &[&str],
    out: &mut Vec<Usage>,
    depth: usize,
) {
    if !check_recursion_depth(depth) {
        return;
    }
    let kind = node.kind();
    let in_code = !(comment_kinds.contains(&kind) || string_kinds.contains(&kind));
    if (kind == "identifier" || kind == "type_identifier" || kind == "field_identifier")
        && text_of(&node, source) == name
    {
        let usage_kind = classify_usage(&node);
        out.push(Usage {
            line: line_of(&node),
            column: column_of(&node),
            kind: usage_kind,
            in_code,
        });
    } else if !in_code && text_of(&node, source).contains(name) {
        // occurrence appears inside a string/comment node's text; still
        // reported (as non-code) so codeOnly=false can surface it.
        if let Some(offset) = text_of(&node, source).find(name) {
            let line = line_of(&node) + text_of(&node, source)[..offset].matches('\n').count() as u32;
            out.push(Usage {
                line,
                column: 0,
                kind: UsageKind::Reference,
                in_code: false,
            });
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_usages(child, source, name, comment_kinds, string_kinds, out, depth + 1);
    }
}

fn classify_usage(node: &Node) -> UsageKind {
    let parent = node.parent();
    match parent.map(|p| p.kind()) {
        Some("function_item") | Some("struct_item") | Some("enum_item") | Some("trait_item")
        | Some("type_item") | Some("const_item") | Some("static_item") | Some("mod_item")
        | Some("class_declaration") | Some("function_declaration") | Some("method_definition") => {
            UsageKind::Definition
        }
        Some("call_expression") | Some("macro_invocation") => UsageKind::Call,
        Some("use_declaration") | Some("import_statement") | Some("use_tree") => UsageKind::Import,
        _ => UsageKind::Reference,
    }
}
