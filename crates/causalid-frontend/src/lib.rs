//! # causalid-frontend
//!
//! Parser, AST, and validation for causal graph description files.

pub mod ast;
pub mod errors;
pub mod parser;
pub mod validate;

// Re-export commonly used types
pub use ast::*;
pub use errors::FrontendError;
pub use parser::parse_graph;
pub use validate::validate_graph;
