//! Goal graph storage: the in-memory graph, its node-link file format and the
//! [`GraphStore`] that keeps the two in step.

pub mod graph;
pub mod persistence;
pub mod store;

pub use graph::GoalGraph;
pub use persistence::{decode_graph, encode_graph, load_graph, save_graph};
pub use store::GraphStore;
