pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod graph;
pub mod linking;
pub mod metrics;
pub mod pipeline;
pub mod resolution;
pub mod scope;
pub mod types;
