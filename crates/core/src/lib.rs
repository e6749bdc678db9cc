//! Upset-Downset Core - shared abstractions and common types
//!
//! This crate provides the error type shared by every other crate and the
//! `Game` trait that the tree search is written against.
//!
//! # Types
//!
//! - [`Game`] - Trait for searchable game implementations
//! - [`Policy`] - Probability distribution over actions (sums to 1.0)
//! - [`Value`] - Game value estimate in [-1, 1]
//! - [`UpDownError`] - Every contract violation in the workspace

mod error;
mod game;
mod types;

pub use error::{Result, UpDownError};
pub use game::Game;
pub use types::{Policy, Value};
