//! HTML extractor. No function/class/state concepts apply to HTML markup
//! itself, but `<script>` elements embed a full JavaScript program: each
//! `raw_text` body is handed to a [`JavaScriptExtractor`] and every result
//! line-shifted back into the HTML file's coordinate space (§6 table: HTML
//! is "five core + HTML via embedded script", not a leaf language). Outside
//! `<script>`, the remaining structural signal is `<script src>`/`<link
//! href>` as imports and inline `on*="handler()"` attributes as calls.

use tree_sitter::{Node, Parser};

use crate::types::{
    Call, EnclosingFunction, Export, Function, Import, ImportKind, Language, Span, StateConstant,
    TypeDecl, Usage,
};

use super::extractor::{check_recursion_depth, line_of, text_of, Extractor};
use super::javascript_lang::JavaScriptExtractor;
use super::rust_lang::find_usages_generic;

pub struct HtmlExtractor {
    parser: Parser,
    script: JavaScriptExtractor,
}

impl HtmlExtractor {
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_html::LANGUAGE.into())
            .map_err(|e| format!("html grammar init failed: {e}"))?;
        let script = JavaScriptExtractor::new()?;
        Ok(Self { parser, script })
    }

    fn walk_elements(&self, node: Node, source: &str, imports: &mut Vec<Import>, calls: &mut Vec<Call>, depth: usize) {
        if !check_recursion_depth(depth) {
            return;
        }
        if node.kind() == "start_tag" || node.kind() == "self_closing_tag" {
            let mut attr_name = None;
            let mut attr_value = None;
            let mut event_attr: Option<(String, String)> = None;
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "attribute" {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| text_of(&n, source).to_string())
                        .unwrap_or_default();
                    let value = child
                        .child_by_field_name("value")
                        .map(|v| text_of(&v, source).trim_matches(|c| c == '"' || c == '\'').to_string())
                        .unwrap_or_default();
                    if (name == "src" || name == "href") && !value.is_empty() {
                        attr_name = Some(name);
                        attr_value = Some(value);
                    } else if name.starts_with("on") && !value.is_empty() {
                        event_attr = Some((name, value));
                    }
                }
            }
            if let (Some(_), Some(value)) = (attr_name, attr_value) {
                imports.push(Import {
                    source: value.into(),
                    names: Vec::new(),
                    kind: ImportKind::SideEffect,
                    line: line_of(&node),
                    aliases: Default::default(),
                    dynamic: false,
                });
            }
            if let Some((attr, handler)) = event_attr {
                let callee = handler
                    .trim_end_matches("()")
                    .split('(')
                    .next()
                    .unwrap_or(&handler)
                    .trim()
                    .to_string();
                calls.push(Call {
                    callee_name: callee.into(),
                    line: line_of(&node),
                    is_method: false,
                    receiver: None,
                    self_attribute: None,
                    is_constructor: false,
                    is_macro: false,
                    is_jsx_component: false,
                    is_event_handler: true,
                    enclosing_function: None::<EnclosingFunction>,
                    is_function_reference: false,
                    is_potential_callback: true,
                    uncertain: true,
                    resolved_names: Vec::new(),
                    arguments_text: handler.into(),
                    positional_args: 0,
                    named_args: 0,
                    has_spread_arg: false,
                });
                let _ = attr;
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_elements(child, source, imports, calls, depth + 1);
        }
    }
}

/// Every `<script>` element's `raw_text` body node, found anywhere in the
/// document (depth-guarded like every other recursive walk here).
fn script_bodies<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    if node.kind() == "script_element" {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "raw_text" {
                out.push(child);
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        script_bodies(child, out, depth + 1);
    }
}

/// Lines inside an embedded script body are 1-based *within that body*; add
/// this many lines to place them back in the HTML file's own numbering.
fn script_delta(raw_text: &Node) -> u32 {
    line_of(raw_text).saturating_sub(1)
}

fn offset_span(span: Span, delta: u32) -> Span {
    Span::new(span.start_line + delta, span.start_column, span.end_line + delta, span.end_column)
}

fn offset_function(mut f: Function, delta: u32) -> Function {
    f.span = offset_span(f.span, delta);
    f.name_line = f.name_line.map(|l| l + delta);
    f
}

fn offset_type(mut t: TypeDecl, delta: u32) -> TypeDecl {
    t.span = offset_span(t.span, delta);
    t.members = t.members.into_iter().map(|m| offset_function(m, delta)).collect();
    t
}

fn offset_state(mut s: StateConstant, delta: u32) -> StateConstant {
    s.span = offset_span(s.span, delta);
    s
}

fn offset_call(mut c: Call, delta: u32) -> Call {
    c.line += delta;
    c.enclosing_function = c.enclosing_function.map(|e| EnclosingFunction {
        name: e.name,
        start_line: e.start_line + delta,
        end_line: e.end_line + delta,
    });
    c
}

fn offset_import(mut i: Import, delta: u32) -> Import {
    i.line += delta;
    i
}

fn offset_export(mut e: Export, delta: u32) -> Export {
    e.line += delta;
    e
}

impl Extractor for HtmlExtractor {
    fn language(&self) -> Language {
        Language::Html
    }

    fn find_functions(&mut self, source: &str) -> Vec<Function> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut bodies = Vec::new();
        script_bodies(tree.root_node(), &mut bodies, 0);
        let mut out = Vec::new();
        for node in &bodies {
            let delta = script_delta(node);
            let body = text_of(node, source);
            out.extend(self.script.find_functions(body).into_iter().map(|f| offset_function(f, delta)));
        }
        out
    }

    fn find_classes(&mut self, source: &str) -> Vec<TypeDecl> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut bodies = Vec::new();
        script_bodies(tree.root_node(), &mut bodies, 0);
        let mut out = Vec::new();
        for node in &bodies {
            let delta = script_delta(node);
            let body = text_of(node, source);
            out.extend(self.script.find_classes(body).into_iter().map(|t| offset_type(t, delta)));
        }
        out
    }

    fn find_state_objects(&mut self, source: &str) -> Vec<StateConstant> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut bodies = Vec::new();
        script_bodies(tree.root_node(), &mut bodies, 0);
        let mut out = Vec::new();
        for node in &bodies {
            let delta = script_delta(node);
            let body = text_of(node, source);
            out.extend(self.script.find_state_objects(body).into_iter().map(|s| offset_state(s, delta)));
        }
        out
    }

    fn find_calls_in_code(&mut self, source: &str) -> Vec<Call> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut imports = Vec::new();
        let mut calls = Vec::new();
        self.walk_elements(tree.root_node(), source, &mut imports, &mut calls, 0);

        let mut bodies = Vec::new();
        script_bodies(tree.root_node(), &mut bodies, 0);
        for node in &bodies {
            let delta = script_delta(node);
            let body = text_of(node, source);
            calls.extend(self.script.find_calls_in_code(body).into_iter().map(|c| offset_call(c, delta)));
        }
        calls
    }

    fn find_imports_in_code(&mut self, source: &str) -> Vec<Import> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut imports = Vec::new();
        let mut calls = Vec::new();
        self.walk_elements(tree.root_node(), source, &mut imports, &mut calls, 0);

        let mut bodies = Vec::new();
        script_bodies(tree.root_node(), &mut bodies, 0);
        for node in &bodies {
            let delta = script_delta(node);
            let body = text_of(node, source);
            imports.extend(self.script.find_imports_in_code(body).into_iter().map(|i| offset_import(i, delta)));
        }
        imports
    }

    fn find_exports_in_code(&mut self, source: &str) -> Vec<Export> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut bodies = Vec::new();
        script_bodies(tree.root_node(), &mut bodies, 0);
        let mut out = Vec::new();
        for node in &bodies {
            let delta = script_delta(node);
            let body = text_of(node, source);
            out.extend(self.script.find_exports_in_code(body).into_iter().map(|e| offset_export(e, delta)));
        }
        out
    }

    fn find_usages_in_code(&mut self, source: &str, name: &str) -> Vec<Usage> {
        find_usages_generic(&mut self.parser, source, name, &["comment"], &["quoted_attribute_value", "raw_text"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_script_functions_are_line_shifted_and_visible() {
        let mut extractor = HtmlExtractor::new().unwrap();
        let source = "<html>\n<body>\n<script>\nfunction greet() {\n  return 1;\n}\n</script>\n</body>\n</html>\n";
        let functions = extractor.find_functions(source);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name.as_ref(), "greet");
        // `function greet` sits on line 4 of the HTML document, not line 1
        // of the isolated script body.
        assert_eq!(functions[0].span.start_line, 4);
    }

    #[test]
    fn embedded_script_calls_resolve_against_the_javascript_extractor() {
        let mut extractor = HtmlExtractor::new().unwrap();
        let source = "<script>\nfunction helper() {}\nhelper();\n</script>\n";
        let calls = extractor.find_calls_in_code(source);
        assert!(calls.iter().any(|c| c.callee_name.as_ref() == "helper" && c.line == 3));
    }

    #[test]
    fn script_src_attribute_is_still_recorded_as_a_side_effect_import() {
        let mut extractor = HtmlExtractor::new().unwrap();
        let source = "<script src=\"./util.js\"></script>\n";
        let imports = extractor.find_imports_in_code(source);
        assert!(imports.iter().any(|i| i.source.as_ref() == "./util.js"));
    }
}
