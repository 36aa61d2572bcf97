//! Java extractor. Methods and constructors live in `class_body`/
//! `interface_body`; `modifiers` nodes (not separate keyword tokens, as in
//! JS) carry visibility and `static`/`final`/`abstract`.

use std::collections::HashMap;

use tree_sitter::{Node, Parser};

use crate::types::{
    Call, EnclosingFunction, Export, ExportKind, Function, Import, ImportKind, Language,
    Parameter, Span, StateConstant, TypeDecl, TypeKind, Usage,
};

use super::extractor::{check_recursion_depth, column_of, end_line_of, line_of, preceding_doc_comment, text_of, Extractor};
use super::rust_lang::find_usages_generic;

pub struct JavaExtractor {
    parser: Parser,
}

impl JavaExtractor {
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| format!("java grammar init failed: {e}"))?;
        Ok(Self { parser })
    }

    fn modifiers_of(&self, node: &Node, source: &str) -> Vec<Box<str>> {
        let mut out = Vec::new();
        if let Some(mods) = node.child_by_field_name("modifiers") {
            let mut cursor = mods.walk();
            for child in mods.children(&mut cursor) {
                if child.kind() != "marker_annotation" && child.kind() != "annotation" {
                    out.push(text_of(&child, source).into());
                }
            }
        }
        out
    }

    fn decorators_of(&self, node: &Node, source: &str) -> Vec<Box<str>> {
        let mut out = Vec::new();
        if let Some(mods) = node.child_by_field_name("modifiers") {
            let mut cursor = mods.walk();
            for child in mods.children(&mut cursor) {
                if child.kind() == "marker_annotation" || child.kind() == "annotation" {
                    out.push(text_of(&child, source).trim_start_matches('@').into());
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
            if child.kind() == "formal_parameter" || child.kind() == "spread_parameter" {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| text_of(&n, source).to_string())
                    .unwrap_or_default();
                let ty = child.child_by_field_name("type");
                out.push(Parameter {
                    name: name.into(),
                    type_annotation: ty.map(|t| text_of(&t, source).into()),
                    default_value: None,
                    is_optional: false,
                    is_rest: child.kind() == "spread_parameter",
                });
            }
        }
        (text_of(&params_node, source).into(), out)
    }

    fn function_from_node(&self, node: Node, source: &str, class_name: Option<Box<str>>) -> Function {
        let name = node
            .child_by_field_name("name")
            .map(|n| text_of(&n, source).to_string())
            .unwrap_or_default();
        let (params_text, params) = self.params_of(&node, source);
        let return_type = node
            .child_by_field_name("type")
            .map(|t| text_of(&t, source).into());
        Function {
            name: name.into(),
            params_text,
            params,
            return_type,
            span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
            name_line: None,
            indentation: column_of(&node),
            modifiers: self.modifiers_of(&node, source),
            docstring: preceding_doc_comment(&node, source, &["line_comment", "block_comment"]),
            decorators: self.decorators_of(&node, source),
            generics: node
                .child_by_field_name("type_parameters")
                .map(|t| text_of(&t, source).into()),
            is_method: class_name.is_some(),
            receiver_type: class_name,
        }
    }

    fn members_of(&self, body: Option<Node>, source: &str, class_name: &str) -> Vec<Function> {
        let mut out = Vec::new();
        if let Some(body) = body {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                if matches!(child.kind(), "method_declaration" | "constructor_declaration") {
                    out.push(self.function_from_node(child, source, Some(class_name.into())));
                }
            }
        }
        out
    }

    fn walk_functions(&self, node: Node, source: &str, out: &mut Vec<Function>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if matches!(node.kind(), "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration") {
            let name = node
                .child_by_field_name("name")
                .map(|n| text_of(&n, source).to_string())
                .unwrap_or_default();
            out.extend(self.members_of(node.child_by_field_name("body"), source, &name));
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
        let kind = match node.kind() {
            "class_declaration" => Some(TypeKind::Class),
            "interface_declaration" => Some(TypeKind::Interface),
            "enum_declaration" => Some(TypeKind::Enum),
            "record_declaration" => Some(TypeKind::Record),
            _ => None,
        };
        if let Some(kind) = kind {
            let name: Box<str> = node
                .child_by_field_name("name")
                .map(|n| text_of(&n, source))
                .unwrap_or_default()
                .into();
            let extends = node
                .child_by_field_name("superclass")
                .map(|s| text_of(&s, source).trim_start_matches("extends").trim().into());
            let implements = node
                .child_by_field_name("interfaces")
                .map(|i| {
                    i.children(&mut i.walk())
                        .filter(|c| c.kind() == "type_identifier" || c.kind() == "generic_type")
                        .map(|c| text_of(&c, source).into())
                        .collect()
                })
                .unwrap_or_default();
            let members = self.members_of(node.child_by_field_name("body"), source, &name);
            out.push(TypeDecl {
                name,
                kind,
                span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
                members,
                modifiers: self.modifiers_of(&node, source),
                extends,
                implements,
                generics: node
                    .child_by_field_name("type_parameters")
                    .map(|t| text_of(&t, source).into()),
                docstring: preceding_doc_comment(&node, source, &["line_comment", "block_comment"]),
            });
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
        if node.kind() == "field_declaration" {
            let mods = self.modifiers_of(&node, source);
            let is_static_final = mods.iter().any(|m| &**m == "static") && mods.iter().any(|m| &**m == "final");
            if is_static_final {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if child.kind() == "variable_declarator" {
                        if let Some(name_node) = child.child_by_field_name("name") {
                            out.push(StateConstant {
                                name: text_of(&name_node, source).into(),
                                span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
                            });
                        }
                    }
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_state_constants(child, source, out, depth + 1);
        }
    }

    fn walk_calls(&self, node: Node, source: &str, out: &mut Vec<Call>, enclosing: &mut Vec<EnclosingFunction>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        let pushed = if matches!(node.kind(), "method_declaration" | "constructor_declaration") {
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
            "method_invocation" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| text_of(&n, source).to_string())
                    .unwrap_or_default();
                let receiver = node.child_by_field_name("object").map(|o| text_of(&o, source).to_string());
                let args = node
                    .child_by_field_name("arguments")
                    .map(|a| text_of(&a, source))
                    .unwrap_or("()");
                out.push(Call {
                    callee_name: name.into(),
                    line: line_of(&node),
                    is_method: true,
                    receiver: receiver.map(|r| r.into()),
                    self_attribute: None,
                    is_constructor: false,
                    is_macro: false,
                    is_jsx_component: false,
                    is_event_handler: false,
                    enclosing_function: enclosing.last().cloned(),
                    is_function_reference: false,
                    is_potential_callback: false,
                    uncertain: false,
                    resolved_names: Vec::new(),
                    arguments_text: args.into(),
                    positional_args: count_comma_args(args),
                    named_args: 0,
                    has_spread_arg: false,
                });
            }
            "object_creation_expression" => {
                let ty = node
                    .child_by_field_name("type")
                    .map(|t| text_of(&t, source).to_string())
                    .unwrap_or_default();
                let args = node
                    .child_by_field_name("arguments")
                    .map(|a| text_of(&a, source))
                    .unwrap_or("()");
                out.push(Call {
                    callee_name: ty.into(),
                    line: line_of(&node),
                    is_method: false,
                    receiver: None,
                    self_attribute: None,
                    is_constructor: true,
                    is_macro: false,
                    is_jsx_component: false,
                    is_event_handler: false,
                    enclosing_function: enclosing.last().cloned(),
                    is_function_reference: false,
                    is_potential_callback: false,
                    uncertain: false,
                    resolved_names: Vec::new(),
                    arguments_text: args.into(),
                    positional_args: count_comma_args(args),
                    named_args: 0,
                    has_spread_arg: false,
                });
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_calls(child, source, out, enclosing, depth + 1);
        }

        if pushed {
            enclosing.pop();
        }
    }

    fn walk_imports(&self, node: Node, source: &str, out: &mut Vec<Import>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "import_declaration" {
            let is_static = node.children(&mut node.walk()).any(|c| c.kind() == "static");
            let is_wildcard = text_of(&node, source).trim_end_matches(';').ends_with('*');
            let path_text = text_of(&node, source)
                .trim_start_matches("import")
                .trim_start_matches("static")
                .trim_end_matches(';')
                .trim()
                .trim_end_matches(".*")
                .to_string();
            out.push(Import {
                source: path_text.into(),
                names: if is_wildcard { vec!["*".into()] } else { Vec::new() },
                kind: if is_static { ImportKind::Static } else { ImportKind::Named },
                line: line_of(&node),
                aliases: HashMap::new(),
                dynamic: false,
            });
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_imports(child, source, out, depth + 1);
        }
    }
}

fn count_comma_args(args_text: &str) -> u32 {
    let inner = args_text.trim().trim_start_matches('(').trim_end_matches(')').trim();
    if inner.is_empty() {
        0
    } else {
        inner.matches(',').count() as u32 + 1
    }
}

impl Extractor for JavaExtractor {
    fn language(&self) -> Language {
        Language::Java
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
        // Java exports by `public` modifier on top-level declarations (§6 table).
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cursor = tree.root_node().walk();
        for child in tree.root_node().children(&mut cursor) {
            if matches!(child.kind(), "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration") {
                let mods = self.modifiers_of(&child, source);
                if mods.iter().any(|m| &**m == "public") {
                    if let Some(name_node) = child.child_by_field_name("name") {
                        out.push(Export {
                            name: text_of(&name_node, source).into(),
                            kind: ExportKind::Named,
                            line: line_of(&child),
                            source: None,
                        });
                    }
                }
            }
        }
        out
    }

    fn find_usages_in_code(&mut self, source: &str, name: &str) -> Vec<Usage> {
        find_usages_generic(&mut self.parser, source, name, &["line_comment", "block_comment"], &["string_literal"])
    }
}
