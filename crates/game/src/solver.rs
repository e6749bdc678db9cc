//! Exact outcome classification.
//!
//! The search is a depth-first walk over options with an explicit stack of
//! frames, memoized on the set of remaining nodes. The memo lives for one
//! top-level call only: node sets are only comparable between options of the
//! same game.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, instrument};
use updown_poset::Node;

use crate::game::UpDown;
use crate::Player;

/// Who wins under optimal play.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Outcome {
    /// The player to move wins.
    Next,
    /// The player who just moved wins.
    Previous,
    /// Up wins whoever starts.
    Up,
    /// Down wins whoever starts.
    Down,
}

impl Outcome {
    /// Whether `player`, moving into a position with this outcome, wins it.
    fn wins_for_mover(self, player: Player) -> bool {
        match player {
            Player::Up => matches!(self, Outcome::Previous | Outcome::Up),
            Player::Down => matches!(self, Outcome::Previous | Outcome::Down),
        }
    }

    fn from_winning_moves(up_wins: bool, down_wins: bool) -> Self {
        match (up_wins, down_wins) {
            (true, true) => Outcome::Next,
            (false, false) => Outcome::Previous,
            (true, false) => Outcome::Up,
            (false, true) => Outcome::Down,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Next => write!(f, "Next"),
            Outcome::Previous => write!(f, "Previous"),
            Outcome::Up => write!(f, "Up"),
            Outcome::Down => write!(f, "Down"),
        }
    }
}

impl UpDown {
    /// The outcome of this game under optimal play.
    pub fn outcome(&self) -> Outcome {
        outcome(self)
    }
}

/// Outcome of `game`, decided without looking at options where possible.
fn immediate_outcome(game: &UpDown) -> Option<Outcome> {
    let n = game.node_count() as i64;
    if n == 0 {
        return Some(Outcome::Previous);
    }
    let sum = game.color_sum();
    if sum == n {
        return Some(Outcome::Up);
    }
    if sum == -n {
        return Some(Outcome::Down);
    }
    if game.edge_count() == 0 {
        return Some(match sum {
            0 if n % 2 == 0 => Outcome::Previous,
            0 => Outcome::Next,
            s if s > 0 => Outcome::Up,
            _ => Outcome::Down,
        });
    }
    match game.structure().and_then(|s| s.nim_sum()) {
        Some(0) => Some(Outcome::Previous),
        Some(_) => Some(Outcome::Next),
        None => None,
    }
}

struct Frame {
    game: UpDown,
    key: Vec<Node>,
    moves: Vec<(Player, Node)>,
    cursor: usize,
    up_wins: bool,
    down_wins: bool,
}

impl Frame {
    fn new(game: UpDown, key: Vec<Node>) -> Self {
        let moves = game
            .up_nodes()
            .into_iter()
            .map(|x| (Player::Up, x))
            .chain(game.down_nodes().into_iter().map(|x| (Player::Down, x)))
            .collect();
        Self {
            game,
            key,
            moves,
            cursor: 0,
            up_wins: false,
            down_wins: false,
        }
    }

    /// The next move still worth exploring.
    fn next_move(&mut self) -> Option<(Player, Node)> {
        if self.up_wins && self.down_wins {
            return None;
        }
        while let Some(&(player, x)) = self.moves.get(self.cursor) {
            self.cursor += 1;
            let settled = match player {
                Player::Up => self.up_wins,
                Player::Down => self.down_wins,
            };
            if !settled {
                return Some((player, x));
            }
        }
        None
    }

    /// Record the outcome of the option reached by the last move.
    fn record(&mut self, outcome: Outcome) {
        if let Some(&(player, _)) = self.cursor.checked_sub(1).and_then(|i| self.moves.get(i)) {
            if outcome.wins_for_mover(player) {
                match player {
                    Player::Up => self.up_wins = true,
                    Player::Down => self.down_wins = true,
                }
            }
        }
    }
}

enum Step {
    Descend(UpDown, Vec<Node>),
    Resolved(Outcome),
    Finished,
}

/// Exact outcome of `game`.
///
/// Decision order: no nodes is Previous; all Blue is Up; all Red is Down;
/// an antichain is decided by its color sum (and parity, when balanced);
/// Nim games by their nim-sum; otherwise the outcome follows from which
/// players have a winning option. Exponential in the worst case.
#[instrument(skip(game), fields(nodes = game.node_count()))]
pub fn outcome(game: &UpDown) -> Outcome {
    if let Some(outcome) = immediate_outcome(game) {
        return outcome;
    }

    let mut memo: HashMap<Vec<Node>, Outcome> = HashMap::new();
    let mut stack = vec![Frame::new(game.clone(), game.key())];
    let mut result = Outcome::Previous;

    while let Some(frame) = stack.last_mut() {
        let step = match frame.next_move() {
            Some((player, x)) => {
                let option = frame.game.option(player, x);
                let key = option.key();
                match memo.get(&key) {
                    Some(&known) => Step::Resolved(known),
                    None => match immediate_outcome(&option) {
                        Some(known) => {
                            memo.insert(key, known);
                            Step::Resolved(known)
                        }
                        None => Step::Descend(option, key),
                    },
                }
            }
            None => Step::Finished,
        };

        match step {
            Step::Descend(option, key) => stack.push(Frame::new(option, key)),
            Step::Resolved(known) => frame_record(&mut stack, known),
            Step::Finished => {
                if let Some(done) = stack.pop() {
                    let outcome = Outcome::from_winning_moves(done.up_wins, done.down_wins);
                    memo.insert(done.key, outcome);
                    frame_record(&mut stack, outcome);
                    result = outcome;
                }
            }
        }
    }

    debug!(positions = memo.len(), %result, "solved");
    result
}

fn frame_record(stack: &mut [Frame], outcome: Outcome) {
    if let Some(frame) = stack.last_mut() {
        frame.record(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use std::collections::BTreeMap;
    use updown_poset::Dag;

    fn antichain(colors: &[Color]) -> UpDown {
        let coloring = colors.iter().copied().enumerate().collect::<BTreeMap<_, _>>();
        UpDown::from_reduced(Dag::antichain(colors.len()), Some(coloring))
    }

    fn colored(dag: Dag, colors: &[Color]) -> UpDown {
        let coloring = colors.iter().copied().enumerate().collect::<BTreeMap<_, _>>();
        UpDown::new(dag, Some(coloring)).unwrap()
    }

    #[test]
    fn test_empty_game_is_previous() {
        assert_eq!(UpDown::empty().outcome(), Outcome::Previous);
    }

    #[test]
    fn test_antichain_branches() {
        for n in 1..=4 {
            assert_eq!(antichain(&vec![Color::Blue; n]).outcome(), Outcome::Up);
            assert_eq!(antichain(&vec![Color::Red; n]).outcome(), Outcome::Down);
        }
        assert_eq!(antichain(&[Color::Blue, Color::Red]).outcome(), Outcome::Previous);
        assert_eq!(
            antichain(&[Color::Blue, Color::Red, Color::Green]).outcome(),
            Outcome::Next
        );
        assert_eq!(
            antichain(&[Color::Blue, Color::Blue, Color::Red]).outcome(),
            Outcome::Up
        );
        assert_eq!(
            antichain(&[Color::Blue, Color::Red, Color::Red, Color::Green]).outcome(),
            Outcome::Down
        );
        assert_eq!(antichain(&[Color::Green; 4]).outcome(), Outcome::Previous);
    }

    #[test]
    fn test_green_chain_is_next() {
        // whoever moves first takes the bottom node and empties the game
        let chain = colored(Dag::chain(0, 2), &[Color::Green, Color::Green]);
        assert_eq!(chain.outcome(), Outcome::Next);
    }

    #[test]
    fn test_colored_chains() {
        // Blue below Red: either player empties the game at once
        let chain = colored(Dag::chain(0, 2), &[Color::Blue, Color::Red]);
        assert_eq!(chain.outcome(), Outcome::Next);

        // Red below Blue: each player can only hand the opponent a node
        let chain = colored(Dag::chain(0, 2), &[Color::Red, Color::Blue]);
        assert_eq!(chain.outcome(), Outcome::Previous);
    }

    #[test]
    fn test_self_inverse_green_chain() {
        let chain = colored(Dag::chain(0, 2), &[Color::Green, Color::Green]);
        assert_eq!((&chain - &chain).outcome(), Outcome::Previous);
    }

    #[test]
    fn test_nim_outcomes() {
        assert_eq!(UpDown::nim(&[4, 4]).outcome(), Outcome::Previous);
        assert_eq!(UpDown::nim(&[3, 5]).outcome(), Outcome::Next);
    }

    #[test]
    fn test_nim_shortcut_agrees_with_search() {
        for heaps in [vec![1, 2], vec![2, 2], vec![1, 2, 3], vec![3, 4]] {
            let nim = UpDown::nim(&heaps);
            let generic = UpDown::from_reduced(nim.dag().clone(), None);
            assert_eq!(nim.outcome(), generic.outcome(), "heaps {:?}", heaps);
        }
    }

    #[test]
    fn test_long_alternating_chain() {
        // Red, Blue, ..., Blue from the bottom: Up can only leave a Red-topped
        // chain, which Down empties, and symmetrically for Down
        let n = 40;
        let colors: Vec<Color> = (0..n)
            .map(|i| if i % 2 == 0 { Color::Red } else { Color::Blue })
            .collect();
        let chain = colored(Dag::chain(0, n), &colors);
        assert_eq!(chain.outcome(), Outcome::Previous);

        let shorter = colored(Dag::chain(0, n - 1), &colors[..n - 1]);
        assert_eq!(shorter.outcome(), Outcome::Down);
    }
}
