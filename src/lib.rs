pub mod config;
pub mod dataset;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod search;
pub mod selection;
