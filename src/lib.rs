pub mod collectors;
pub mod config;
pub mod domain;
pub mod error;
pub mod heuristics;
pub mod logging;
pub mod pipeline;
pub mod storage;
pub mod types;
