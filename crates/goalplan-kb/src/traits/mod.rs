//! Seams between the goal services and their callers

pub mod goal_store;

pub use goal_store::{GoalReader, GoalWriter};
