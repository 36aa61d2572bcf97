//! §4.9 `stacktrace`: resolve a pasted stack trace's frames back into the
//! project. Frame syntax varies by language (Python's `File "...", line
//! N`, Java/JS/Go/Rust's `path:line[:col]`), but every format boils down
//! to a file fragment and a line number once the language-specific
//! wrapping is stripped; resolution against the index is the same for all
//! of them.

use std::path::PathBuf;

use regex::Regex;
use serde::Serialize;

use crate::index::SymbolIndex;
use crate::types::SymbolRecord;

use super::read_lines;

#[derive(Debug, Clone, Serialize)]
pub struct StackFrame {
    pub raw: String,
    pub line: u32,
    pub file: Option<PathBuf>,
    pub symbol: Option<SymbolRecord>,
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StacktraceResult {
    pub frames: Vec<StackFrame>,
}

/// Python's `File "path/to/mod.py", line 42, in func`.
fn python_frame(line: &str) -> Option<(String, u32)> {
    let re = Regex::new(r#"File "([^"]+)", line (\d+)"#).unwrap();
    let caps = re.captures(line)?;
    Some((caps[1].to_string(), caps[2].parse().ok()?))
}

/// Everything else (Java `(Foo.java:42)`, JS `at f (file.js:10:4)`, Go
/// `main.go:17 +0x1d`, Rust `src/lib.rs:9:5`) reduces to a bare
/// `path.ext:line` substring once the surrounding call-site decoration is
/// ignored.
fn generic_frame(line: &str) -> Option<(String, u32)> {
    let re = Regex::new(r"([\w./\\-]+\.\w+):(\d+)").unwrap();
    let caps = re.captures(line)?;
    Some((caps[1].to_string(), caps[2].parse().ok()?))
}

fn parse_frame(line: &str) -> Option<(String, u32)> {
    python_frame(line).or_else(|| generic_frame(line))
}

fn resolve_frame(index: &SymbolIndex, fragment: &str, line: u32) -> (Option<PathBuf>, Option<SymbolRecord>, Option<String>) {
    let normalized = fragment.replace('\\', "/");
    let Some(file) = index.files_sorted().into_iter().find(|f| {
        let rel = f.rel_path.to_string_lossy().replace('\\', "/");
        rel.ends_with(&normalized) || normalized.ends_with(rel.as_str())
    }) else {
        return (None, None, None);
    };
    let symbol = file.symbol_records().into_iter().find(|s| s.span.contains_line(line));
    let snippet = read_lines(&file.abs_path, line.saturating_sub(2).max(1), line + 2);
    (Some(file.rel_path.clone()), symbol, snippet)
}

/// Parse every recognizable frame line in `text` and resolve it against
/// the index; lines that aren't a stack frame (the exception message, a
/// blank separator) are skipped rather than reported as unresolved.
pub fn stacktrace(index: &SymbolIndex, text: &str) -> StacktraceResult {
    let mut frames = Vec::new();
    for raw_line in text.lines() {
        let Some((fragment, line)) = parse_frame(raw_line) else { continue };
        let (file, symbol, snippet) = resolve_frame(index, &fragment, line);
        frames.push(StackFrame { raw: raw_line.to_string(), line, file, symbol, snippet });
    }
    StacktraceResult { frames }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::index::build_project;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn resolves_python_frame_to_enclosing_function() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.py"), "def handler():\n    raise ValueError('boom')\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let trace = format!("Traceback (most recent call last):\n  File \"{}/app.py\", line 2, in handler\nValueError: boom", dir.path().display());
        let result = stacktrace(&index, &trace);
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.frames[0].symbol.as_ref().unwrap().name.as_ref(), "handler");
    }

    #[test]
    fn resolves_java_style_frame() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Foo.java"), "class Foo {\n  void bar() {\n    throw new RuntimeException();\n  }\n}\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let trace = "\tat com.example.Foo.bar(Foo.java:3)";
        let result = stacktrace(&index, trace);
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.frames[0].line, 3);
        assert!(result.frames[0].file.is_some());
    }

    #[test]
    fn skips_non_frame_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn f() {}\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = stacktrace(&index, "Error: something went wrong\ncaused by upstream failure");
        assert!(result.frames.is_empty());
    }
}
