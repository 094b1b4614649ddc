//! Rank relaxation over a frozen node table

use super::NodeTable;
use depend_ast::ArtifactId;
use std::collections::BTreeMap;

/// Direction in which rank flows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// From dependents to their dependencies (`cr`)
    Forward,
    /// From dependencies to their dependents (`rcr`)
    Reverse,
}

/// Parameters of the power iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relaxation {
    pub damping: f64,
    pub iterations: usize,
    pub convergence: f64,
}

/// Rank every node of the table
///
/// All nodes start at 1.0. Each round computes every new rank from the
/// previous round's ranks:
/// `rank(v) = (1 - d) + d * sum(rank(u) / out(u))` over the edges `u -> v`.
/// Stops after `iterations` rounds, or once no rank moved by more than
/// `convergence`. Nodes without outgoing edges pass no rank on; their mass
/// is not redistributed.
pub fn relax(table: &NodeTable, flow: Flow, params: Relaxation) -> BTreeMap<ArtifactId, f64> {
    let mut ranks: BTreeMap<ArtifactId, f64> = table.iter().map(|(id, _)| (id, 1.0)).collect();
    let d = params.damping;

    for _ in 0..params.iterations.max(1) {
        let mut next = BTreeMap::new();
        let mut delta: f64 = 0.0;

        for (id, node) in table.iter() {
            let sources = match flow {
                Flow::Forward => &node.incoming,
                Flow::Reverse => &node.outgoing,
            };
            let mut inflow = 0.0;
            for source in sources {
                let Some(source_node) = table.get(*source) else {
                    continue;
                };
                let degree = match flow {
                    Flow::Forward => source_node.outgoing.len(),
                    Flow::Reverse => source_node.incoming.len(),
                };
                if degree > 0 {
                    inflow += ranks.get(source).copied().unwrap_or(1.0) / degree as f64;
                }
            }

            let rank = (1.0 - d) + d * inflow;
            delta = delta.max((rank - ranks.get(&id).copied().unwrap_or(1.0)).abs());
            next.insert(id, rank);
        }

        ranks = next;
        if delta < params.convergence {
            break;
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use depend_ast::ArtifactKind;

    const PARAMS: Relaxation = Relaxation {
        damping: 0.85,
        iterations: 25,
        convergence: 1e-9,
    };

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_single_node_converges_to_base() {
        let mut table = NodeTable::new();
        table.init_node(ArtifactId(1), "a", ArtifactKind::Class);

        for iterations in [1, 2, 25] {
            let params = Relaxation { iterations, ..PARAMS };
            let ranks = relax(&table, Flow::Forward, params);
            assert_close(ranks[&ArtifactId(1)], 0.15);
        }
    }

    #[test]
    fn test_dependency_collects_rank() {
        // 1 -> 2
        let mut table = NodeTable::new();
        table.init_node(ArtifactId(1), "dependent", ArtifactKind::Class);
        table.init_node(ArtifactId(2), "dependency", ArtifactKind::Class);
        table.add_edge(ArtifactId(1), ArtifactId(2));

        let cr = relax(&table, Flow::Forward, PARAMS);
        assert_close(cr[&ArtifactId(1)], 0.15);
        assert_close(cr[&ArtifactId(2)], 0.15 + 0.85 * 0.15);

        let rcr = relax(&table, Flow::Reverse, PARAMS);
        assert_close(rcr[&ArtifactId(2)], 0.15);
        assert_close(rcr[&ArtifactId(1)], 0.15 + 0.85 * 0.15);
    }

    #[test]
    fn test_out_degree_splits_rank() {
        // 1 -> 2, 1 -> 3
        let mut table = NodeTable::new();
        for id in 1..=3 {
            table.init_node(ArtifactId(id), id.to_string(), ArtifactKind::Class);
        }
        table.add_edge(ArtifactId(1), ArtifactId(2));
        table.add_edge(ArtifactId(1), ArtifactId(3));

        let cr = relax(&table, Flow::Forward, PARAMS);
        assert_close(cr[&ArtifactId(2)], 0.15 + 0.85 * 0.15 / 2.0);
        assert_close(cr[&ArtifactId(2)], cr[&ArtifactId(3)]);
    }
}
