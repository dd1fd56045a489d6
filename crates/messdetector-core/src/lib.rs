//! messdetector-core: syntax tree model for the messdetector rules
//!
//! This crate provides:
//! - `SyntaxTree` / `Node`: an arena-backed tree with parent, child and sibling navigation
//! - `NodeKind`: the closed set of node kinds the rules match on
//! - `LineIndex`: byte offset to line mapping
//! - `TreeBuilder`: lowering of a mago PHP program into a `SyntaxTree`
//! - `parse()`: parse PHP source and lower it in one step

mod builder;
mod line_index;
mod tree;

pub use builder::TreeBuilder;
pub use line_index::LineIndex;
pub use tree::{Ancestors, Descendants, Node, NodeId, NodeKind, SyntaxTree, SUPERGLOBALS};

use bumpalo::Bump;
use mago_database::file::FileId;
use thiserror::Error;

/// Errors raised while turning source text into a [`SyntaxTree`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },
}

/// Parse PHP source and lower it into a [`SyntaxTree`]
///
/// A parse error does not prevent lowering; whatever mago recovered is
/// still returned alongside the error.
pub fn parse(file_name: &str, source: &str) -> (SyntaxTree, Option<BuildError>) {
    let arena = Bump::new();
    let file_id = FileId::new(file_name);
    let (program, parse_error) = mago_syntax::parser::parse_file_content(&arena, file_id, source);

    let error = parse_error.map(|e| BuildError::Parse {
        file: file_name.to_string(),
        message: e.to_string(),
    });

    let tree = TreeBuilder::new(source).build(program);
    (tree, error)
}
