use std::fmt;

use serde::{Deserialize, Serialize};
use updown_core::UpDownError;

/// A node color. Blue nodes may only be played by Up, Red nodes only by
/// Down, Green nodes by either player.
///
/// Serialized as its integer value (Blue = 1, Green = 0, Red = -1).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Color {
    Blue,
    Green,
    Red,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Blue, Color::Green, Color::Red];

    /// Blue = +1, Green = 0, Red = -1.
    #[inline]
    pub const fn value(self) -> i8 {
        match self {
            Color::Blue => 1,
            Color::Green => 0,
            Color::Red => -1,
        }
    }

    /// Swaps Blue and Red; Green is unchanged.
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Color::Blue => Color::Red,
            Color::Green => Color::Green,
            Color::Red => Color::Blue,
        }
    }

    /// Whether `player` may choose a node of this color.
    #[inline]
    pub const fn playable_by(self, player: Player) -> bool {
        matches!(
            (self, player),
            (Color::Green, _) | (Color::Blue, Player::Up) | (Color::Red, Player::Down)
        )
    }
}

impl From<Color> for i8 {
    fn from(color: Color) -> i8 {
        color.value()
    }
}

impl TryFrom<i8> for Color {
    type Error = UpDownError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Color::Blue),
            0 => Ok(Color::Green),
            -1 => Ok(Color::Red),
            other => Err(UpDownError::InvalidGame(format!(
                "color value {} is not one of -1, 0, 1",
                other
            ))),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Blue => write!(f, "Blue"),
            Color::Green => write!(f, "Green"),
            Color::Red => write!(f, "Red"),
        }
    }
}

/// One of the two players.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    Up,
    Down,
}

impl Player {
    /// Returns the other player
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Player::Up => Player::Down,
            Player::Down => Player::Up,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Up => write!(f, "Up"),
            Player::Down => write!(f, "Down"),
        }
    }
}
