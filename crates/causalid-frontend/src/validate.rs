//! # Semantic Validation
//!
//! Checks a parsed graph description beyond syntax:
//!
//! - no self loops (`A -> A`, `A <-> A`)
//! - a latent name is declared once and never used as an observed node
//! - a latent's children are observed nodes
//!
//! Directed cycles are not checked here. They are rejected when the graph is
//! built, since acyclicity is a property of the whole graph rather than of a
//! statement.

use std::collections::HashMap;

use crate::ast::*;
use crate::errors::{FrontendError, SourceRange};

/// Performs semantic validation on a parsed graph description.
pub fn validate_graph(ast: &GraphAst) -> Result<(), FrontendError> {
    let mut latents: HashMap<String, Option<SourceRange>> = HashMap::new();

    for stmt in &ast.statements {
        match &stmt.kind {
            StatementKind::Directed { from, to } => {
                if let Some(name) = from.iter().find(|n| to.contains(n)) {
                    return Err(FrontendError::validation(
                        format!("self loop on '{}'", name),
                        stmt.range,
                    ));
                }
            }
            StatementKind::Confounded { left, right } => {
                if left == right {
                    return Err(FrontendError::validation(
                        format!("bidirected self loop on '{}'", left),
                        stmt.range,
                    ));
                }
                register_latent(&mut latents, confounder_name(left, right), stmt.range, true)?;
            }
            StatementKind::Latent { name, children } => {
                if children.is_empty() {
                    return Err(FrontendError::validation(
                        format!("latent '{}' has no children", name),
                        stmt.range,
                    ));
                }
                register_latent(&mut latents, name.clone(), stmt.range, false)?;
            }
            StatementKind::Nodes(_) => {}
        }
    }

    for stmt in &ast.statements {
        if let Some(name) = stmt
            .kind
            .observed_names()
            .into_iter()
            .find(|n| latents.contains_key(*n))
        {
            return Err(FrontendError::validation(
                format!("'{}' is declared latent but used as an observed node", name),
                stmt.range,
            ));
        }
    }

    Ok(())
}

fn register_latent(
    latents: &mut HashMap<String, Option<SourceRange>>,
    name: String,
    range: Option<SourceRange>,
    anonymous: bool,
) -> Result<(), FrontendError> {
    match latents.get(&name) {
        // repeating `A <-> B` names the same anonymous latent
        Some(_) if anonymous => Ok(()),
        Some(first) => {
            let at = first
                .map(|r| format!(" (first declared at line {})", r.start.line))
                .unwrap_or_default();
            Err(FrontendError::validation(
                format!("latent '{}' declared twice{}", name, at),
                range,
            ))
        }
        None => {
            latents.insert(name, range);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_graph;

    fn check(source: &str) -> Result<(), FrontendError> {
        validate_graph(&parse_graph(source)?)
    }

    #[test]
    fn accepts_frontdoor_graph() {
        assert!(check("A -> B -> C\nA <-> C").is_ok());
    }

    #[test]
    fn repeated_bidirected_arc_is_fine() {
        assert!(check("A <-> C\nC <-> A").is_ok());
    }

    #[test]
    fn rejects_self_loops() {
        let err = check("A -> A").unwrap_err();
        assert!(err.to_string().contains("self loop on 'A'"));
        assert!(check("B <-> B").is_err());
    }

    #[test]
    fn rejects_latent_used_as_observed() {
        let err = check("latent U -> A, B\nU -> C").unwrap_err();
        let diag = err.validation_diagnostic().unwrap();
        assert!(diag.message.contains("'U' is declared latent"));
        assert_eq!(diag.range.unwrap().start.line, 2);
    }

    #[test]
    fn rejects_duplicate_latent() {
        let err = check("latent U -> A\nlatent U -> B").unwrap_err();
        assert!(err.to_string().contains("declared twice"));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn explicit_latent_clashing_with_anonymous_one() {
        assert!(check("A <-> B\nlatent U_A_B -> C").is_err());
    }
}
