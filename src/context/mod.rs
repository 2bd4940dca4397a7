pub mod cache;
pub mod config;
pub mod tracker;

pub use cache::ContextCache;
pub use config::ContextConfig;
pub use tracker::{compute_context, ContextTracker};
