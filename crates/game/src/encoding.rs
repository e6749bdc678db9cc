//! Fixed-size tensor encoding of a position for the search oracle.
//!
//! Converts a game and the player to move into a `(4, A, A)` array of 0/1
//! planes, where `A` is the size of the action space (one slot per node
//! label). The position is always seen from the mover's viewpoint: when Down
//! is to move, the game is negated first, so the mover always plays Blue or
//! Green nodes.

use std::collections::BTreeMap;

use ndarray::{s, Array3};
use updown_core::{Result, UpDownError};
use updown_poset::{Dag, Node};

use crate::game::UpDown;
use crate::{Color, Player};

/// Number of planes in the encoding.
pub const NUM_PLANES: usize = 4;

/// Plane indices.
mod planes {
    pub const BLUE: usize = 0;
    pub const GREEN: usize = 1;
    pub const RED: usize = 2;
    pub const DOWN_TO_MOVE: usize = 3;
}

fn color_plane(color: Color) -> usize {
    match color {
        Color::Blue => planes::BLUE,
        Color::Green => planes::GREEN,
        Color::Red => planes::RED,
    }
}

/// A position encoded for the oracle.
///
/// For each color plane `k`, entry `(k, i, j)` is 1 iff `j` is `i` or a
/// descendant of `i`, and `j` has color `k` (both from the mover's
/// viewpoint). Plane 3 is all zeros when Up is to move and all ones when
/// Down is.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedEncoding {
    planes: Array3<f32>,
    mover: Player,
}

impl FixedEncoding {
    /// Encode `game` with `mover` to play, in an action space of `max_nodes`.
    ///
    /// # Errors
    /// Returns `UpDownError::GameTooLarge` if a node label is not below
    /// `max_nodes`.
    pub fn encode(game: &UpDown, mover: Player, max_nodes: usize) -> Result<Self> {
        if let Some(node) = game.dag().max_node().filter(|&v| v >= max_nodes) {
            return Err(UpDownError::GameTooLarge { node, max_nodes });
        }

        let (dag, coloring) = viewpoint(game.dag(), game.coloring(), mover);
        let mut planes = Array3::<f32>::zeros((NUM_PLANES, max_nodes, max_nodes));

        for (i, reach) in dag.transitive_closure() {
            for j in std::iter::once(i).chain(reach) {
                if let Some(&color) = coloring.get(&j) {
                    planes[[color_plane(color), i, j]] = 1.0;
                }
            }
        }
        if mover == Player::Down {
            planes.slice_mut(s![planes::DOWN_TO_MOVE, .., ..]).fill(1.0);
        }

        Ok(Self { planes, mover })
    }

    /// The raw `(4, A, A)` planes.
    pub fn planes(&self) -> &Array3<f32> {
        &self.planes
    }

    pub fn into_planes(self) -> Array3<f32> {
        self.planes
    }

    /// Row-major copy of the planes.
    pub fn to_vec(&self) -> Vec<f32> {
        self.planes.iter().copied().collect()
    }

    /// Size of the action space.
    pub fn max_nodes(&self) -> usize {
        self.planes.shape()[1]
    }

    pub fn mover(&self) -> Player {
        self.mover
    }

    /// Nodes the mover may play: Blue or Green on the diagonal.
    pub fn valid_actions(&self) -> Vec<Node> {
        (0..self.max_nodes())
            .filter(|&i| {
                self.planes[[planes::BLUE, i, i]] > 0.5 || self.planes[[planes::GREEN, i, i]] > 0.5
            })
            .collect()
    }

    /// Recover the encoded game (as a generic game) and the player to move.
    ///
    /// # Errors
    /// Returns `UpDownError::InvalidGame` if the planes do not describe an
    /// acyclic reachability relation.
    pub fn decode(&self) -> Result<(UpDown, Player)> {
        let n = self.max_nodes();
        let mut coloring = BTreeMap::new();
        for i in 0..n {
            for color in Color::ALL {
                if self.planes[[color_plane(color), i, i]] > 0.5 {
                    coloring.insert(i, color);
                }
            }
        }

        let mut edges = Vec::new();
        for &i in coloring.keys() {
            for &j in coloring.keys() {
                let reached = Color::ALL
                    .iter()
                    .any(|&c| self.planes[[color_plane(c), i, j]] > 0.5);
                if i != j && reached {
                    edges.push((i, j));
                }
            }
        }

        let closure = Dag::from_edges(coloring.keys().copied(), edges)?;
        let (dag, coloring) = viewpoint(&closure, &coloring, self.mover);
        let game = UpDown::new(dag, Some(coloring))?;
        Ok((game, self.mover))
    }

    /// The same position encoded for the other player to move.
    ///
    /// # Errors
    /// Propagates decoding failures.
    pub fn swap_perspective(&self) -> Result<Self> {
        let (game, mover) = self.decode()?;
        Self::encode(&game, mover.opposite(), self.max_nodes())
    }
}

/// The graph and coloring as seen by `mover`. Down sees the negated game.
/// Applying the same view twice restores the original.
fn viewpoint(
    dag: &Dag,
    coloring: &BTreeMap<Node, Color>,
    mover: Player,
) -> (Dag, BTreeMap<Node, Color>) {
    match mover {
        Player::Up => (dag.clone(), coloring.clone()),
        Player::Down => (
            dag.reverse(),
            coloring.iter().map(|(&v, c)| (v, c.flip())).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UpDown {
        // 0 -> 1 -> 2 with node 3 apart
        let dag = Dag::from_edges(0..4, [(0, 1), (1, 2)]).unwrap();
        let coloring = BTreeMap::from([
            (0, Color::Blue),
            (1, Color::Red),
            (2, Color::Green),
            (3, Color::Red),
        ]);
        UpDown::new(dag, Some(coloring)).unwrap()
    }

    #[test]
    fn test_encoding_shape_and_mover_plane() {
        let up = FixedEncoding::encode(&sample(), Player::Up, 6).unwrap();
        assert_eq!(up.planes().shape(), &[4, 6, 6]);
        assert!(up.planes().slice(s![3, .., ..]).iter().all(|&x| x == 0.0));

        let down = FixedEncoding::encode(&sample(), Player::Down, 6).unwrap();
        assert!(down.planes().slice(s![3, .., ..]).iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_encoding_marks_reachability_by_color() {
        let enc = FixedEncoding::encode(&sample(), Player::Up, 4).unwrap();
        let p = enc.planes();
        assert_eq!(p[[0, 0, 0]], 1.0);
        assert_eq!(p[[2, 0, 1]], 1.0);
        assert_eq!(p[[1, 0, 2]], 1.0);
        assert_eq!(p[[2, 3, 3]], 1.0);
        assert_eq!(p[[1, 2, 0]], 0.0);
        assert_eq!(p.sum(), 7.0);
    }

    #[test]
    fn test_valid_actions_follow_mover() {
        let game = sample();
        let up = FixedEncoding::encode(&game, Player::Up, 5).unwrap();
        assert_eq!(up.valid_actions(), game.up_nodes());
        let down = FixedEncoding::encode(&game, Player::Down, 5).unwrap();
        assert_eq!(down.valid_actions(), game.down_nodes());
    }

    #[test]
    fn test_decode_recovers_game() {
        let game = sample();
        for mover in [Player::Up, Player::Down] {
            let enc = FixedEncoding::encode(&game, mover, 8).unwrap();
            let (decoded, decoded_mover) = enc.decode().unwrap();
            assert_eq!(decoded, game);
            assert_eq!(decoded_mover, mover);
        }
    }

    #[test]
    fn test_swap_perspective() {
        let game = sample();
        let up = FixedEncoding::encode(&game, Player::Up, 4).unwrap();
        let down = FixedEncoding::encode(&game, Player::Down, 4).unwrap();
        assert_eq!(up.swap_perspective().unwrap(), down);
        assert_eq!(down.swap_perspective().unwrap(), up);
    }

    #[test]
    fn test_encode_rejects_large_labels() {
        assert!(matches!(
            FixedEncoding::encode(&sample(), Player::Up, 3),
            Err(UpDownError::GameTooLarge { node: 3, max_nodes: 3 })
        ));
    }
}
