//! The colored-DAG game and its moves.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use updown_core::{Result, UpDownError};
use updown_poset::{Dag, Layout, Node};

use crate::structured::Structure;
use crate::{Color, Player};

/// How a game's DAG was produced.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Payload {
    /// An explicit DAG and coloring.
    Generic,
    /// A family descriptor whose generated DAG, relabelled onto the sorted
    /// node ids, is the stored DAG. Structured games are all Green.
    Structured(Structure),
}

/// An immutable game of upset-downset.
///
/// The stored DAG is always transitively reduced (the Hasse diagram of the
/// position) and every node has a color. Moves and algebraic operations
/// return new games.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpDown {
    dag: Dag,
    coloring: BTreeMap<Node, Color>,
    payload: Payload,
}

impl UpDown {
    /// Build a game from an arbitrary DAG.
    ///
    /// The DAG is validated and transitively reduced. Nodes missing from
    /// `coloring` (or every node, if `coloring` is `None`) are Green.
    ///
    /// # Errors
    /// Returns `UpDownError::InvalidGame` if the graph has a cycle or the
    /// coloring names a node that is not in the graph.
    pub fn new(dag: Dag, coloring: Option<BTreeMap<Node, Color>>) -> Result<Self> {
        if !dag.is_acyclic() {
            return Err(UpDownError::InvalidGame(
                "the graph has a directed cycle".to_string(),
            ));
        }
        if let Some(v) = coloring
            .iter()
            .flat_map(BTreeMap::keys)
            .find(|v| !dag.contains(**v))
        {
            return Err(UpDownError::InvalidGame(format!(
                "coloring names node {} which is not in the graph",
                v
            )));
        }
        Ok(Self::from_reduced(dag.transitive_reduction(), coloring))
    }

    /// Build a game from a DAG the caller asserts is acyclic and
    /// transitively reduced. Nothing is checked; coloring entries for absent
    /// nodes are dropped and missing nodes are Green.
    pub fn from_reduced(dag: Dag, coloring: Option<BTreeMap<Node, Color>>) -> Self {
        let coloring = complete_coloring(&dag, coloring.unwrap_or_default());
        Self {
            dag,
            coloring,
            payload: Payload::Generic,
        }
    }

    /// The game with no nodes.
    pub fn empty() -> Self {
        Self::from_reduced(Dag::new(), None)
    }

    /// An all-Green game on disjoint chains, one per heap. Empty heaps are
    /// ignored.
    pub fn nim(heaps: &[usize]) -> Self {
        Self::structured(Structure::nim(heaps))
    }

    /// An all-Green disjoint union of complete bipartite graphs given as
    /// `(top, bottom)` sizes. Empty graphs are ignored.
    pub fn complete_bipartite(graphs: &[(usize, usize)]) -> Self {
        Self::structured(Structure::complete_bipartite(graphs))
    }

    /// A structured game on the dense labels `0..n`.
    pub(crate) fn structured(structure: Structure) -> Self {
        let dag = structure.dag();
        let coloring = dag.nodes().map(|v| (v, Color::Green)).collect();
        Self {
            dag,
            coloring,
            payload: Payload::Structured(structure),
        }
    }

    pub(crate) fn from_parts(dag: Dag, coloring: BTreeMap<Node, Color>, payload: Payload) -> Self {
        Self {
            dag,
            coloring,
            payload,
        }
    }

    /// The transitively reduced DAG.
    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    pub fn coloring(&self) -> &BTreeMap<Node, Color> {
        &self.coloring
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The family descriptor, for structured games.
    pub fn structure(&self) -> Option<&Structure> {
        match &self.payload {
            Payload::Structured(structure) => Some(structure),
            Payload::Generic => None,
        }
    }

    /// Color of `v`, if `v` is in the game.
    pub fn color(&self, v: Node) -> Option<Color> {
        self.coloring.get(&v).copied()
    }

    /// Nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.dag.nodes()
    }

    pub fn node_count(&self) -> usize {
        self.dag.len()
    }

    /// Number of cover relations.
    pub fn edge_count(&self) -> usize {
        self.dag.number_of_edges()
    }

    pub fn is_empty(&self) -> bool {
        self.dag.is_empty()
    }

    pub fn contains(&self, v: Node) -> bool {
        self.dag.contains(v)
    }

    /// Sum of color values (Blue +1, Green 0, Red -1).
    pub fn color_sum(&self) -> i64 {
        self.coloring.values().map(|c| i64::from(c.value())).sum()
    }

    /// Nodes `player` may choose, ascending.
    pub fn nodes_for(&self, player: Player) -> Vec<Node> {
        self.coloring
            .iter()
            .filter(|(_, c)| c.playable_by(player))
            .map(|(&v, _)| v)
            .collect()
    }

    /// Blue and Green nodes.
    pub fn up_nodes(&self) -> Vec<Node> {
        self.nodes_for(Player::Up)
    }

    /// Red and Green nodes.
    pub fn down_nodes(&self) -> Vec<Node> {
        self.nodes_for(Player::Down)
    }

    /// `x` together with its descendants.
    pub fn upset(&self, x: Node) -> BTreeSet<Node> {
        let mut set = self.dag.descendants(x);
        set.insert(x);
        set
    }

    /// `x` together with its ancestors.
    pub fn downset(&self, x: Node) -> BTreeSet<Node> {
        let mut set = self.dag.ancestors(x);
        set.insert(x);
        set
    }

    /// Plot coordinates of the Hasse diagram, computed on demand.
    pub fn layout(&self) -> Layout {
        self.dag.hasse_layout()
    }

    /// The game left after Up plays `x`.
    ///
    /// # Errors
    /// Returns `UpDownError::IllegalMove` if `x` is absent or Red.
    pub fn up_play(&self, x: Node) -> Result<Self> {
        self.play(Player::Up, x)
    }

    /// The game left after Down plays `x`.
    ///
    /// # Errors
    /// Returns `UpDownError::IllegalMove` if `x` is absent or Blue.
    pub fn down_play(&self, x: Node) -> Result<Self> {
        self.play(Player::Down, x)
    }

    /// The game left after `player` plays `x`.
    ///
    /// # Errors
    /// Returns `UpDownError::IllegalMove` if `x` is absent or has a color
    /// `player` may not choose.
    pub fn play(&self, player: Player, x: Node) -> Result<Self> {
        let color = self.color(x).ok_or_else(|| UpDownError::IllegalMove {
            node: x,
            reason: "node is not in the game".to_string(),
        })?;
        if !color.playable_by(player) {
            return Err(UpDownError::IllegalMove {
                node: x,
                reason: format!("{} cannot play a {} node", player, color),
            });
        }
        Ok(self.option(player, x))
    }

    /// All options of `player`, keyed by the node played.
    pub fn options(&self, player: Player) -> Vec<(Node, Self)> {
        self.nodes_for(player)
            .into_iter()
            .map(|x| (x, self.option(player, x)))
            .collect()
    }

    /// The option reached when `player` plays `x`; assumes the move is legal.
    pub(crate) fn option(&self, player: Player, x: Node) -> Self {
        let removed = match player {
            Player::Up => self.upset(x),
            Player::Down => self.downset(x),
        };
        let remaining: BTreeSet<Node> = self.dag.node_set().difference(&removed).copied().collect();
        let coloring: BTreeMap<Node, Color> = self
            .coloring
            .iter()
            .filter(|(v, _)| remaining.contains(v))
            .map(|(&v, &c)| (v, c))
            .collect();

        match &self.payload {
            Payload::Generic => Self {
                // removing an upset or downset keeps every cover relation
                // between the remaining nodes, so the subgraph stays reduced
                dag: self.dag.subgraph(&remaining),
                coloring,
                payload: Payload::Generic,
            },
            Payload::Structured(structure) => {
                let position = self.nodes().take_while(|&v| v < x).count();
                let structure = structure.after_play(position, player);
                let dense = structure.dag();
                let map: HashMap<Node, Node> =
                    dense.nodes().zip(remaining.iter().copied()).collect();
                match dense.relabel(&map) {
                    Ok(dag) => Self {
                        dag,
                        coloring,
                        payload: Payload::Structured(structure),
                    },
                    // descriptor and node set disagree; fall back to the generic option
                    Err(_) => Self {
                        dag: self.dag.subgraph(&remaining),
                        coloring,
                        payload: Payload::Generic,
                    },
                }
            }
        }
    }

    /// Sorted node list; identifies an option among the options of one
    /// game, since every option is an induced subgraph.
    pub(crate) fn key(&self) -> Vec<Node> {
        self.nodes().collect()
    }
}

fn complete_coloring(dag: &Dag, mut coloring: BTreeMap<Node, Color>) -> BTreeMap<Node, Color> {
    coloring.retain(|v, _| dag.contains(*v));
    for v in dag.nodes() {
        coloring.entry(v).or_insert(Color::Green);
    }
    coloring
}

impl Default for UpDown {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for UpDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpDown(dag: {}, colors: {{", self.dag)?;
        for (i, (v, c)) in self.coloring.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", v, c)?;
        }
        write!(f, "}})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colored_diamond() -> UpDown {
        // 0 -> {1, 2} -> 3 with a redundant 0 -> 3
        let dag = Dag::from_edges(0..4, [(0, 1), (0, 2), (0, 3), (1, 3), (2, 3)]).unwrap();
        let coloring = BTreeMap::from([
            (0, Color::Blue),
            (1, Color::Green),
            (2, Color::Red),
            (3, Color::Green),
        ]);
        UpDown::new(dag, Some(coloring)).unwrap()
    }

    #[test]
    fn test_new_reduces_and_colors() {
        let game = colored_diamond();
        assert_eq!(game.edge_count(), 4);
        assert!(!game.dag().has_edge(0, 3));
        assert_eq!(game.up_nodes(), vec![0, 1, 3]);
        assert_eq!(game.down_nodes(), vec![1, 2, 3]);
        assert_eq!(game.color_sum(), 0);
    }

    #[test]
    fn test_new_rejects_cycle() {
        let cyclic = Dag::from_edges(0..2, [(0, 1), (1, 0)]).unwrap();
        assert!(matches!(
            UpDown::new(cyclic, None),
            Err(UpDownError::InvalidGame(_))
        ));
    }

    #[test]
    fn test_new_rejects_foreign_coloring() {
        let coloring = BTreeMap::from([(5, Color::Blue)]);
        assert!(UpDown::new(Dag::antichain(2), Some(coloring)).is_err());
    }

    #[test]
    fn test_missing_colors_default_to_green() {
        let game = UpDown::new(Dag::antichain(2), Some(BTreeMap::from([(0, Color::Red)]))).unwrap();
        assert_eq!(game.color(0), Some(Color::Red));
        assert_eq!(game.color(1), Some(Color::Green));
    }

    #[test]
    fn test_up_play_removes_upset() {
        let game = colored_diamond();
        let option = game.up_play(1).unwrap();
        assert_eq!(option.nodes().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(option.dag().edge_list(), vec![(0, 2)]);
        assert_eq!(option.color(2), Some(Color::Red));

        assert!(game.up_play(0).unwrap().is_empty());
    }

    #[test]
    fn test_down_play_removes_downset() {
        let game = colored_diamond();
        let option = game.down_play(2).unwrap();
        assert_eq!(option.nodes().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(option.dag().edge_list(), vec![(1, 3)]);
    }

    #[test]
    fn test_illegal_moves() {
        let game = colored_diamond();
        assert!(matches!(
            game.up_play(2),
            Err(UpDownError::IllegalMove { node: 2, .. })
        ));
        assert!(matches!(
            game.down_play(0),
            Err(UpDownError::IllegalMove { node: 0, .. })
        ));
        assert!(matches!(
            game.up_play(9),
            Err(UpDownError::IllegalMove { node: 9, .. })
        ));
    }

    #[test]
    fn test_structured_nim_play_matches_generic() {
        let nim = UpDown::nim(&[3, 2]);
        let generic = UpDown::from_reduced(nim.dag().clone(), None);
        for player in [Player::Up, Player::Down] {
            for x in nim.nodes() {
                let structured = nim.play(player, x).unwrap();
                let plain = generic.play(player, x).unwrap();
                assert_eq!(structured.dag(), plain.dag());
                assert_eq!(structured.coloring(), plain.coloring());
                assert!(structured.structure().is_some());
            }
        }
    }

    #[test]
    fn test_structured_bipartite_play_matches_generic() {
        let graph = UpDown::complete_bipartite(&[(2, 2), (1, 0)]);
        let generic = UpDown::from_reduced(graph.dag().clone(), None);
        for player in [Player::Up, Player::Down] {
            for x in graph.nodes() {
                let structured = graph.play(player, x).unwrap();
                let plain = generic.play(player, x).unwrap();
                assert_eq!(structured.dag(), plain.dag());
                // second-level moves act on non-dense labels
                for y in structured.nodes() {
                    let deeper = structured.play(player.opposite(), y).unwrap();
                    let plain_deeper = plain.play(player.opposite(), y).unwrap();
                    assert_eq!(deeper.dag(), plain_deeper.dag());
                }
            }
        }
    }

    #[test]
    fn test_layout_covers_nodes() {
        let game = colored_diamond();
        assert_eq!(game.layout().len(), game.node_count());
    }
}
