//! Synthetic graphs shared by the benchmarks.

use causalid_core::{CausalError, CausalGraph};

/// `width` parallel confounders `C_i -> X`, `C_i -> Y`, a mediator chain
/// `X -> M_0 -> .. -> Y` of length `depth`, and bidirected arcs between
/// consecutive confounders.
pub fn create_layered_graph(width: usize, depth: usize) -> Result<CausalGraph, CausalError> {
    let mut builder = CausalGraph::builder().node("X").node("Y");
    for i in 0..width {
        let c = format!("C{}", i);
        builder = builder.edge(c.clone(), "X").edge(c.clone(), "Y");
        if i > 0 {
            builder = builder.confounded(format!("C{}", i - 1), c);
        }
    }
    let mut prev = "X".to_string();
    for j in 0..depth {
        let m = format!("M{}", j);
        builder = builder.edge(prev, m.clone());
        prev = m;
    }
    builder.edge(prev, "Y").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layered_graph_shape() {
        let graph = create_layered_graph(3, 2).unwrap();
        assert_eq!(graph.nodes().len(), 7);
        assert_eq!(graph.latents().len(), 2);
        assert_eq!(graph.edge_count(), 9);
    }
}
