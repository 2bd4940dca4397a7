pub mod centroid;
pub mod tokenizer;
pub mod tab_url;

pub use centroid::TokenCentroid;
pub use tokenizer::{extract_features, fingerprint, tokenize, tokenize_host, FeatureSource};
pub use tab_url::{normalize_prefix, prefix_depth, registrable_domain, TabUrl};
