//! Simulation core for a two-dimensional dig-and-survive game.
//!
//! Everything that decides what happens lives here; the terminal binary only
//! feeds an [`entities::InputIntent`] into [`compute::step`] and draws the
//! resulting [`entities::GameState`].

pub mod achievements;
pub mod compute;
pub mod config;
pub mod constants;
pub mod enemies;
pub mod entities;
pub mod kinematics;
pub mod level;
pub mod missiles;
pub mod player;
pub mod world;
