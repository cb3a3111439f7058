//! # Abstract Syntax Tree
//!
//! A graph description is a flat list of statements. Chains such as
//! `A -> B -> C` are split into one [`StatementKind::Directed`] hop per arrow
//! at parse time, so later stages never see chains.

use crate::errors::SourceRange;

/// The root of a parsed graph description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphAst {
    pub statements: Vec<Statement>,
}

/// A statement with the range of source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    pub range: Option<SourceRange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// `node A, B`
    Nodes(Vec<String>),
    /// One hop of a chain: every name in `from` points to every name in `to`.
    Directed { from: Vec<String>, to: Vec<String> },
    /// `A <-> B`
    Confounded { left: String, right: String },
    /// `latent U -> A, B`
    Latent { name: String, children: Vec<String> },
}

impl StatementKind {
    /// Names of observed nodes mentioned by this statement, in source order.
    pub fn observed_names(&self) -> Vec<&str> {
        match self {
            Self::Nodes(names) => names.iter().map(String::as_str).collect(),
            Self::Directed { from, to } => from.iter().chain(to).map(String::as_str).collect(),
            Self::Confounded { left, right } => vec![left.as_str(), right.as_str()],
            Self::Latent { children, .. } => children.iter().map(String::as_str).collect(),
        }
    }
}

/// Name given to the latent behind a bidirected arc `left <-> right`.
///
/// The pair is ordered first so `A <-> B` and `B <-> A` name the same latent.
pub fn confounder_name(left: &str, right: &str) -> String {
    if left <= right {
        format!("U_{}_{}", left, right)
    } else {
        format!("U_{}_{}", right, left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confounder_name_is_symmetric() {
        assert_eq!(confounder_name("A", "C"), "U_A_C");
        assert_eq!(confounder_name("C", "A"), "U_A_C");
    }

    #[test]
    fn latent_statement_lists_children_only() {
        let stmt = StatementKind::Latent {
            name: "U".into(),
            children: vec!["A".into(), "B".into()],
        };
        assert_eq!(stmt.observed_names(), vec!["A", "B"]);
    }
}
