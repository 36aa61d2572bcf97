//! Go extractor. Methods carry an explicit receiver (`func (r *Repo) Save()`)
//! rather than living inside a class body, so function/method separation
//! follows the `receiver` field instead of ancestor-walking (contrast
//! [`super::rust_lang`]'s impl-block walk).

use std::collections::HashMap;

use tree_sitter::{Node, Parser};

use crate::types::{
    Call, EnclosingFunction, Export, ExportKind, Function, Import, ImportKind, Language,
    Parameter, Span, StateConstant, TypeDecl, TypeKind, Usage,
};

use super::extractor::{check_recursion_depth, column_of, end_line_of, line_of, preceding_doc_comment, text_of, Extractor};
use super::rust_lang::find_usages_generic;

pub struct GoExtractor {
    parser: Parser,
}

impl GoExtractor {
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| format!("go grammar init failed: {e}"))?;
        Ok(Self { parser })
    }

    fn params_of(&self, node: &Node, source: &str) -> (Box<str>, Vec<Parameter>) {
        let mut out = Vec::new();
        let Some(params_node) = node.child_by_field_name("parameters") else {
            return ("()".into(), out);
        };
        let mut cursor = params_node.walk();
        for child in params_node.children(&mut cursor) {
            if child.kind() == "parameter_declaration" {
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
                    is_rest: false,
                });
            } else if child.kind() == "variadic_parameter_declaration" {
                out.push(Parameter {
                    name: text_of(&child, source).into(),
                    type_annotation: None,
                    default_value: None,
                    is_optional: false,
                    is_rest: true,
                });
            }
        }
        (text_of(&params_node, source).into(), out)
    }

    fn function_from_node(&self, node: Node, source: &str) -> Function {
        let name = node
            .child_by_field_name("name")
            .map(|n| text_of(&n, source).to_string())
            .unwrap_or_default();
        let (params_text, params) = self.params_of(&node, source);
        let return_type = node
            .child_by_field_name("result")
            .map(|r| text_of(&r, source).into());
        let receiver = node.child_by_field_name("receiver").map(|r| {
            let text = text_of(&r, source);
            text.trim_start_matches('*').to_string()
        });
        Function {
            name: name.into(),
            params_text,
            params,
            return_type,
            span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
            name_line: None,
            indentation: column_of(&node),
            modifiers: Vec::new(),
            docstring: preceding_doc_comment(&node, source, &["comment"]),
            decorators: Vec::new(),
            generics: node
                .child_by_field_name("type_parameters")
                .map(|t| text_of(&t, source).into()),
            is_method: receiver.is_some(),
            receiver_type: receiver.map(|r| r.into()),
        }
    }

    fn walk_functions(&self, node: Node, source: &str, out: &mut Vec<Function>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if matches!(node.kind(), "function_declaration" | "method_declaration") {
            out.push(self.function_from_node(node, source));
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
        if node.kind() == "type_declaration" {
            let mut cursor = node.walk();
            for spec in node.children(&mut cursor) {
                if spec.kind() != "type_spec" {
                    continue;
                }
                let name: Box<str> = spec
                    .child_by_field_name("name")
                    .map(|n| text_of(&n, source))
                    .unwrap_or_default()
                    .into();
                let ty = spec.child_by_field_name("type");
                let kind = match ty.map(|t| t.kind()) {
                    Some("struct_type") => TypeKind::Struct,
                    Some("interface_type") => TypeKind::Interface,
                    _ => TypeKind::TypeAlias,
                };
                out.push(TypeDecl {
                    name,
                    kind,
                    span: Span::new(line_of(&spec), column_of(&spec), end_line_of(&spec), 0),
                    members: Vec::new(),
                    modifiers: Vec::new(),
                    extends: None,
                    implements: Vec::new(),
                    generics: spec
                        .child_by_field_name("type_parameters")
                        .map(|t| text_of(&t, source).into()),
                    docstring: preceding_doc_comment(&node, source, &["comment"]),
                });
            }
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
        if matches!(node.kind(), "const_declaration" | "var_declaration") && !has_ancestor(&node, "block") {
            let mut cursor = node.walk();
            for spec in node.children(&mut cursor) {
                if matches!(spec.kind(), "const_spec" | "var_spec") {
                    let mut scursor = spec.walk();
                    for ident in spec.children(&mut scursor) {
                        if ident.kind() == "identifier" {
                            let name = text_of(&ident, source);
                            if name.chars().any(|c| c.is_uppercase()) {
                                out.push(StateConstant {
                                    name: name.into(),
                                    span: Span::new(line_of(&spec), column_of(&spec), end_line_of(&spec), 0),
                                });
                            }
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
        let pushed = if matches!(node.kind(), "function_declaration" | "method_declaration") {
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

        if node.kind() == "call_expression" {
            if let Some(func_node) = node.child_by_field_name("function") {
                let args = node
                    .child_by_field_name("arguments")
                    .map(|a| text_of(&a, source))
                    .unwrap_or("()");
                let (callee_name, receiver, is_method) = match func_node.kind() {
                    "selector_expression" => {
                        let field = func_node
                            .child_by_field_name("field")
                            .map(|f| text_of(&f, source).to_string())
                            .unwrap_or_default();
                        let operand = func_node
                            .child_by_field_name("operand")
                            .map(|o| text_of(&o, source).to_string());
                        (field, operand, true)
                    }
                    _ => (text_of(&func_node, source).to_string(), None, false),
                };
                let is_constructor = callee_name.starts_with("New");
                out.push(Call {
                    callee_name: callee_name.into(),
                    line: line_of(&func_node),
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
                    resolved_names: Vec::new(),
                    arguments_text: args.into(),
                    positional_args: args.matches(',').count() as u32 + if args.trim_matches(|c| c == '(' || c == ')').trim().is_empty() { 0 } else { 1 },
                    named_args: 0,
                    has_spread_arg: args.contains("..."),
                });
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

    fn walk_imports(&self, node: Node, source: &str, out: &mut Vec<Import>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "import_declaration" {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                self.collect_import_spec(child, source, line_of(&node), out, depth);
            }
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_imports(child, source, out, depth + 1);
        }
    }

    fn collect_import_spec(&self, node: Node, source: &str, line: u32, out: &mut Vec<Import>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "import_spec" {
            let path = node
                .child_by_field_name("path")
                .map(|p| text_of(&p, source).trim_matches('"').to_string())
                .unwrap_or_default();
            let alias = node.child_by_field_name("name").map(|n| text_of(&n, source).to_string());
            let mut aliases = HashMap::new();
            let kind = if let Some(alias) = &alias {
                if alias == "_" {
                    ImportKind::SideEffect
                } else {
                    aliases.insert(path.clone().into(), alias.clone().into());
                    ImportKind::Named
                }
            } else {
                ImportKind::Named
            };
            out.push(Import {
                source: path.into(),
                names: Vec::new(),
                kind,
                line,
                aliases,
                dynamic: false,
            });
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_import_spec(child, source, line, out, depth + 1);
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

impl Extractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
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
        // Go exports by capitalization, no keyword (§6 table).
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for f in self.find_functions(source) {
            if f.name.chars().next().is_some_and(|c| c.is_uppercase()) && !f.is_method {
                out.push(Export {
                    name: f.name,
                    kind: ExportKind::Named,
                    line: f.span.start_line,
                    source: None,
                });
            }
        }
        let mut types = Vec::new();
        self.walk_types(tree.root_node(), source, &mut types, 0);
        for t in types {
            if t.name.chars().next().is_some_and(|c| c.is_uppercase()) {
                out.push(Export {
                    name: t.name,
                    kind: ExportKind::Named,
                    line: t.span.start_line,
                    source: None,
                });
            }
        }
        out
    }

    fn find_usages_in_code(&mut self, source: &str, name: &str) -> Vec<Usage> {
        find_usages_generic(&mut self.parser, source, name, &["comment"], &["interpreted_string_literal", "raw_string_literal"])
    }
}
