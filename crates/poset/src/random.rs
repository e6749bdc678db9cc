//! (Almost) uniform random DAGs.
//!
//! Implements the Markov chain of Kozieł and Sulkowska ("Uniform random
//! posets", 2018). The chain walks over labelled DAGs on a fixed node set,
//! adding or removing one edge per step, and accepts a move from `X` to `Y`
//! with probability `min(1, |[X]| / |[Y]|)`, where `|[G]|` is the number of
//! DAGs sharing `G`'s transitive reduction. Its stationary distribution is
//! uniform over transitive reductions, i.e. over labelled posets. About `n²`
//! steps are conjectured to suffice.

use rand::Rng;
use tracing::debug;
use updown_core::{Result, UpDownError};

use crate::dag::{Dag, Node};

/// Base-2 logarithm of the class cardinality of `dag`.
///
/// Any edge of the closure that is not a cover may be present or absent
/// without changing the reduction, so the class has
/// `2^(closure edges - reduction edges)` members.
pub fn class_cardinality_exponent(dag: &Dag) -> i64 {
    let closure_edges = dag.number_of_relations();
    let reduction_edges = dag.transitive_reduction().number_of_edges();
    closure_edges as i64 - reduction_edges as i64
}

/// One step of the chain. `exponent` is the class cardinality exponent of
/// `dag` on entry; the exponent of the returned graph is returned alongside.
pub fn markov_step<R: Rng + ?Sized>(mut dag: Dag, exponent: i64, rng: &mut R) -> (Dag, i64) {
    let n = dag.len();
    if n < 2 {
        return (dag, exponent);
    }
    let nodes: Vec<Node> = dag.nodes().collect();
    let i = nodes[rng.gen_range(0..n)];
    let j = nodes[rng.gen_range(0..n)];
    if i == j {
        return (dag, exponent);
    }

    if dag.has_edge(i, j) {
        dag.remove_edge(i, j);
        let proposed = class_cardinality_exponent(&dag);
        if accept(exponent, proposed, rng) {
            (dag, proposed)
        } else {
            dag.insert_edge(i, j);
            (dag, exponent)
        }
    } else {
        dag.insert_edge(i, j);
        if !dag.is_acyclic() {
            dag.remove_edge(i, j);
            return (dag, exponent);
        }
        let proposed = class_cardinality_exponent(&dag);
        if accept(exponent, proposed, rng) {
            (dag, proposed)
        } else {
            dag.remove_edge(i, j);
            (dag, exponent)
        }
    }
}

fn accept<R: Rng + ?Sized>(current: i64, proposed: i64, rng: &mut R) -> bool {
    // min(1, 2^current / 2^proposed)
    let ratio = 2f64.powi((current - proposed).clamp(-1000, 0) as i32);
    ratio >= 1.0 || rng.gen::<f64>() < ratio
}

/// A random DAG on `num_nodes` nodes labelled `0..num_nodes`.
///
/// Runs `num_nodes^exponent + extra_steps` steps of the chain, starting from
/// `start` (default: the antichain). The result is generally *not*
/// transitively reduced.
///
/// # Errors
/// Returns `UpDownError::InvalidGame` if `start` does not have `num_nodes`
/// nodes or is cyclic.
pub fn uniform_random_dag<R: Rng + ?Sized>(
    num_nodes: usize,
    exponent: u32,
    extra_steps: usize,
    start: Option<Dag>,
    rng: &mut R,
) -> Result<Dag> {
    let dag = match start {
        Some(dag) => {
            if dag.len() != num_nodes {
                return Err(UpDownError::InvalidGame(format!(
                    "starting graph has {} nodes, expected {}",
                    dag.len(),
                    num_nodes
                )));
            }
            if !dag.is_acyclic() {
                return Err(UpDownError::InvalidGame(
                    "starting graph has a cycle".to_string(),
                ));
            }
            dag
        }
        None => Dag::antichain(num_nodes),
    };

    let steps = num_nodes.saturating_pow(exponent).saturating_add(extra_steps);
    let mut exponent_now = class_cardinality_exponent(&dag);
    let mut dag = dag;
    for _ in 0..steps {
        (dag, exponent_now) = markov_step(dag, exponent_now, rng);
    }

    debug!(
        nodes = num_nodes,
        steps,
        edges = dag.number_of_edges(),
        "generated random dag"
    );
    Ok(dag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_class_cardinality_exponent() {
        assert_eq!(class_cardinality_exponent(&Dag::antichain(3)), 0);
        // chain of 3: closure has 3 edges, reduction 2
        assert_eq!(class_cardinality_exponent(&Dag::chain(0, 3)), 1);
    }

    #[test]
    fn test_random_dag_is_acyclic_with_requested_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for n in [0, 1, 2, 5, 8] {
            let dag = uniform_random_dag(n, 2, 0, None, &mut rng).unwrap();
            assert_eq!(dag.len(), n);
            assert!(dag.is_acyclic());
        }
    }

    #[test]
    fn test_random_dag_is_deterministic_for_seed() {
        let a = uniform_random_dag(6, 2, 3, None, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let b = uniform_random_dag(6, 2, 3, None, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_dag_rejects_bad_start() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(uniform_random_dag(3, 2, 0, Some(Dag::antichain(2)), &mut rng).is_err());

        let cyclic = Dag::from_edges(0..2, [(0, 1), (1, 0)]).unwrap();
        assert!(uniform_random_dag(2, 2, 0, Some(cyclic), &mut rng).is_err());
    }

    #[test]
    fn test_random_dags_produce_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let total: usize = (0..10)
            .map(|_| uniform_random_dag(6, 2, 0, None, &mut rng).unwrap().number_of_edges())
            .sum();
        assert!(total > 0);
    }
}
