//! TypeScript/TSX extractor. Reuses the JavaScript walk functions (the
//! two grammars share almost all node kinds) and adds `interface`/`type`
//! declarations and TS-only modifiers (`public`/`private`/`readonly`).

use std::collections::HashMap;

use tree_sitter::{Node, Parser};

use crate::types::{
    Call, Export, Function, Import, Language, Span, StateConstant, TypeDecl, TypeKind, Usage,
};

use super::extractor::{check_recursion_depth, column_of, end_line_of, line_of, preceding_doc_comment, text_of, Extractor};
use super::javascript_lang::{walk_calls, walk_exports, walk_functions, walk_imports, walk_state_constants};
use super::rust_lang::find_usages_generic;

pub struct TypeScriptExtractor {
    parser: Parser,
}

impl TypeScriptExtractor {
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
            .map_err(|e| format!("typescript grammar init failed: {e}"))?;
        Ok(Self { parser })
    }
}

fn walk_ts_types(node: Node, source: &str, out: &mut Vec<TypeDecl>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    match node.kind() {
        "interface_declaration" => {
            let name: Box<str> = node
                .child_by_field_name("name")
                .map(|n| text_of(&n, source))
                .unwrap_or_default()
                .into();
            let extends: Vec<Box<str>> = node
                .children(&mut node.walk())
                .find(|c| c.kind() == "extends_type_clause")
                .map(|c| {
                    c.children(&mut c.walk())
                        .filter(|t| t.kind() == "type_identifier" || t.kind() == "generic_type")
                        .map(|t| text_of(&t, source).into())
                        .collect()
                })
                .unwrap_or_default();
            out.push(TypeDecl {
                name,
                kind: TypeKind::Interface,
                span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
                members: Vec::new(),
                modifiers: Vec::new(),
                extends: extends.first().cloned(),
                implements: extends.into_iter().skip(1).collect(),
                generics: node
                    .child_by_field_name("type_parameters")
                    .map(|t| text_of(&t, source).into()),
                docstring: preceding_doc_comment(&node, source, &["comment"]),
            });
            return;
        }
        "type_alias_declaration" => {
            let name: Box<str> = node
                .child_by_field_name("name")
                .map(|n| text_of(&n, source))
                .unwrap_or_default()
                .into();
            out.push(TypeDecl {
                name,
                kind: TypeKind::TypeAlias,
                span: Span::new(line_of(&node), column_of(&node), end_line_of(&node), 0),
                members: Vec::new(),
                modifiers: Vec::new(),
                extends: None,
                implements: Vec::new(),
                generics: node
                    .child_by_field_name("type_parameters")
                    .map(|t| text_of(&t, source).into()),
                docstring: preceding_doc_comment(&node, source, &["comment"]),
            });
            return;
        }
        "class_declaration" | "class" => {
            let name: Box<str> = node
                .child_by_field_name("name")
                .map(|n| text_of(&n, source))
                .unwrap_or_default()
                .into();
            let mut implements = Vec::new();
            let mut extends = None;
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "class_heritage" {
                    let mut hcursor = child.walk();
                    for h in child.children(&mut hcursor) {
                        match h.kind() {
                            "extends_clause" => {
                                if let Some(val) = h.named_child(0) {
                                    extends = Some(text_of(&val, source).into());
                                }
                            }
                            "implements_clause" => {
                                let mut icursor = h.walk();
                                for t in h.children(&mut icursor) {
                                    if t.kind() == "type_identifier" || t.kind() == "generic_type" {
                                        implements.push(text_of(&t, source).into());
                                    }
                                }
                            }
                            _ => {}
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
                implements,
                generics: node
                    .child_by_field_name("type_parameters")
                    .map(|t| text_of(&t, source).into()),
                docstring: preceding_doc_comment(&node, source, &["comment"]),
            });
            return;
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_ts_types(child, source, out, depth + 1);
    }
}

impl Extractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        Language::TypeScript
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
        walk_ts_types(tree.root_node(), source, &mut out, 0);
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
        for decl in self.find_classes(source) {
            if matches!(decl.kind, TypeKind::Interface | TypeKind::TypeAlias) {
                out.push(Export {
                    name: decl.name,
                    kind: crate::types::ExportKind::TypeOnly,
                    line: decl.span.start_line,
                    source: None,
                });
            }
        }
        out
    }

    fn find_usages_in_code(&mut self, source: &str, name: &str) -> Vec<Usage> {
        find_usages_generic(&mut self.parser, source, name, &["comment"], &["string", "template_string"])
    }

    fn find_instance_attribute_types(&mut self, _source: &str) -> HashMap<Box<str>, HashMap<Box<str>, Box<str>>> {
        HashMap::new()
    }
}
