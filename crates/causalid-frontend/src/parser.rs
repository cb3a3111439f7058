//! # Graph Description Parser
//!
//! Transforms source text into a [`GraphAst`] using the Pest grammar in
//! `grammar.pest`. No semantic checks happen here; see
//! [`crate::validate::validate_graph`].

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::ast::*;
use crate::errors::{FrontendError, SourceRange};

#[derive(Parser)]
#[grammar = "../grammar.pest"]
pub struct GraphParser;

/// Parses a graph description into an AST.
///
/// # Example
///
/// ```rust,ignore
/// let ast = parse_graph("A -> B -> C\nA <-> C")?;
/// assert_eq!(ast.statements.len(), 3);
/// ```
pub fn parse_graph(source: &str) -> Result<GraphAst, FrontendError> {
    let mut pairs = GraphParser::parse(Rule::graph, source)
        .map_err(|e| FrontendError::ParseError(e.to_string()))?;

    let mut statements = Vec::new();
    if let Some(graph_pair) = pairs.next() {
        debug_assert_eq!(graph_pair.as_rule(), Rule::graph);
        for stmt in graph_pair.into_inner() {
            let range = Some(SourceRange::from_span(stmt.as_span()));
            match stmt.as_rule() {
                Rule::node_stmt => statements.push(Statement {
                    kind: StatementKind::Nodes(build_ident_list(first_list(stmt)?)),
                    range,
                }),
                Rule::latent_stmt => statements.push(Statement {
                    kind: build_latent(stmt)?,
                    range,
                }),
                Rule::confound_stmt => statements.push(Statement {
                    kind: build_confound(stmt)?,
                    range,
                }),
                Rule::chain_stmt => {
                    for kind in build_chain(stmt)? {
                        statements.push(Statement { kind, range });
                    }
                }
                _ => {}
            }
        }
    }

    Ok(GraphAst { statements })
}

fn first_list(pair: Pair<'_, Rule>) -> Result<Pair<'_, Rule>, FrontendError> {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::ident_list)
        .ok_or_else(|| FrontendError::ParseError("expected a list of names".into()))
}

fn build_ident_list(pair: Pair<'_, Rule>) -> Vec<String> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str().to_string())
        .collect()
}

fn build_latent(pair: Pair<'_, Rule>) -> Result<StatementKind, FrontendError> {
    let mut name = None;
    let mut children = Vec::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::ident => name = Some(p.as_str().to_string()),
            Rule::ident_list => children = build_ident_list(p),
            _ => {}
        }
    }
    let name =
        name.ok_or_else(|| FrontendError::ParseError("latent statement without a name".into()))?;
    Ok(StatementKind::Latent { name, children })
}

fn build_confound(pair: Pair<'_, Rule>) -> Result<StatementKind, FrontendError> {
    let names: Vec<String> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str().to_string())
        .collect();
    match <[String; 2]>::try_from(names) {
        Ok([left, right]) => Ok(StatementKind::Confounded { left, right }),
        Err(_) => Err(FrontendError::ParseError(
            "bidirected arc needs exactly two endpoints".into(),
        )),
    }
}

fn build_chain(pair: Pair<'_, Rule>) -> Result<Vec<StatementKind>, FrontendError> {
    let lists: Vec<Vec<String>> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::ident_list)
        .map(build_ident_list)
        .collect();
    if lists.len() < 2 {
        return Err(FrontendError::ParseError(
            "directed chain needs at least one arrow".into(),
        ));
    }
    Ok(lists
        .windows(2)
        .map(|hop| StatementKind::Directed {
            from: hop[0].clone(),
            to: hop[1].clone(),
        })
        .collect())
}
