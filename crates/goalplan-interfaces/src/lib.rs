//! Goal Planner Interfaces
//!
//! This crate provides the boundary types between the goal planner core and the
//! collaborators it does not implement itself: the text completion provider it
//! consumes and the presentation layer it feeds.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Text completion provider contract
pub mod provider;

/// Presentation layer payloads
pub mod presentation;

/// Re-export key types for convenient usage
pub use provider::{ProviderError, ProviderResult, TextCompletionProvider};
pub use presentation::{DependencyView, GoalView, GraphView, PresentationPayload};
