// Export modules for library usage
pub mod config;
pub mod errors;
pub mod idioms;
pub mod rewrite;
pub mod taint;
pub mod testkit;
pub mod tree;

pub use config::RewriteConfig;
pub use errors::TempmendError;
pub use idioms::{IdiomKind, IdiomMatch};
pub use rewrite::{harden_unit, harden_units, HardenSummary};
pub use tree::{NodeId, Unit};
