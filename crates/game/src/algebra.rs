//! Negation, sums and comparison of games.
//!
//! Comparisons all go through the outcome of the difference `G - H`:
//!
//! | outcome of `G - H` | relation |
//! |---|---|
//! | Previous | `G == H` |
//! | Next | `G` and `H` are incomparable (fuzzy) |
//! | Up | `G > H` (better for Up) |
//! | Down | `G < H` (better for Down) |

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use updown_poset::{Dag, Node};

use crate::game::{Payload, UpDown};
use crate::{Color, Outcome};

/// How two games compare.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Comparison {
    Equal,
    Fuzzy,
    Greater,
    Less,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Equal => write!(f, "equal"),
            Comparison::Fuzzy => write!(f, "fuzzy"),
            Comparison::Greater => write!(f, "greater"),
            Comparison::Less => write!(f, "less"),
        }
    }
}

impl From<Outcome> for Comparison {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Previous => Comparison::Equal,
            Outcome::Next => Comparison::Fuzzy,
            Outcome::Up => Comparison::Greater,
            Outcome::Down => Comparison::Less,
        }
    }
}

impl UpDown {
    /// The game with roles swapped: every edge reversed, Blue and Red
    /// exchanged.
    ///
    /// Structured games stay in their family and are placed on the dense
    /// labels `0..n`.
    pub fn negate(&self) -> UpDown {
        if let Payload::Structured(structure) = self.payload() {
            return UpDown::structured(structure.negate());
        }
        let coloring = self.coloring().iter().map(|(&v, c)| (v, c.flip())).collect();
        UpDown::from_parts(self.dag().reverse(), coloring, Payload::Generic)
    }

    /// Disjoint sum: `other` is shifted past this game's largest label.
    pub fn sum(&self, other: &UpDown) -> UpDown {
        let offset = next_label(self.dag());
        let shifted = other.dag().offset(offset);

        let mut coloring = self.coloring().clone();
        coloring.extend(other.coloring().iter().map(|(&v, &c)| (v + offset, c)));

        let dag = union(self.dag(), &shifted);
        let payload = match (self.payload(), other.payload()) {
            (Payload::Structured(a), Payload::Structured(b)) => match a.concat(b) {
                Some(structure) => Payload::Structured(structure),
                None => Payload::Generic,
            },
            _ => Payload::Generic,
        };
        UpDown::from_parts(dag, coloring, payload)
    }

    /// `self - other`, the sum with the negation of `other`.
    pub fn difference(&self, other: &UpDown) -> UpDown {
        self.sum(&other.negate())
    }

    /// Ordinal sum "`self` over `other`": `self` is shifted past `other`'s
    /// largest label and every sink of `other` gets an edge to every source
    /// of `self`.
    pub fn ordinal_sum(&self, other: &UpDown) -> UpDown {
        let offset = next_label(other.dag());
        let shifted = self.dag().offset(offset);

        let mut coloring: BTreeMap<Node, Color> = other.coloring().clone();
        coloring.extend(self.coloring().iter().map(|(&v, &c)| (v + offset, c)));

        let bridges: Vec<(Node, Node)> = other
            .dag()
            .sinks()
            .into_iter()
            .flat_map(|s| shifted.sources().into_iter().map(move |t| (s, t)))
            .collect();
        let dag = union(other.dag(), &shifted)
            .with_edges(bridges)
            .expect("BUG: bridge endpoints are nodes of the union");

        // every bridge is a cover: nothing leaves a sink of `other` and
        // nothing enters a source of `self`
        UpDown::from_parts(dag, coloring, Payload::Generic)
    }

    /// How this game compares to `other`.
    pub fn compare(&self, other: &UpDown) -> Comparison {
        Comparison::from(self.difference(other).outcome())
    }

    pub fn is_equal(&self, other: &UpDown) -> bool {
        self.compare(other) == Comparison::Equal
    }

    pub fn is_fuzzy(&self, other: &UpDown) -> bool {
        self.compare(other) == Comparison::Fuzzy
    }

    pub fn is_greater(&self, other: &UpDown) -> bool {
        self.compare(other) == Comparison::Greater
    }

    pub fn is_less(&self, other: &UpDown) -> bool {
        self.compare(other) == Comparison::Less
    }

    /// Greater or equal.
    pub fn is_greater_or_equal(&self, other: &UpDown) -> bool {
        matches!(self.compare(other), Comparison::Greater | Comparison::Equal)
    }

    /// Less or equal.
    pub fn is_less_or_equal(&self, other: &UpDown) -> bool {
        matches!(self.compare(other), Comparison::Less | Comparison::Equal)
    }
}

fn next_label(dag: &Dag) -> Node {
    dag.max_node().map_or(0, |m| m + 1)
}

fn union(low: &Dag, high: &Dag) -> Dag {
    low.disjoint_union(high)
        .expect("BUG: shifted labels lie above every label of the other game")
}

impl Neg for &UpDown {
    type Output = UpDown;

    fn neg(self) -> UpDown {
        self.negate()
    }
}

impl Neg for UpDown {
    type Output = UpDown;

    fn neg(self) -> UpDown {
        self.negate()
    }
}

impl Add for &UpDown {
    type Output = UpDown;

    fn add(self, other: &UpDown) -> UpDown {
        self.sum(other)
    }
}

impl Add for UpDown {
    type Output = UpDown;

    fn add(self, other: UpDown) -> UpDown {
        self.sum(&other)
    }
}

impl Sub for &UpDown {
    type Output = UpDown;

    fn sub(self, other: &UpDown) -> UpDown {
        self.difference(other)
    }
}

impl Sub for UpDown {
    type Output = UpDown;

    fn sub(self, other: UpDown) -> UpDown {
        self.difference(&other)
    }
}
