//! Flybox - what can I tie with what I have?
//!
//! Flybox keeps a catalog of fly tying patterns and an inventory of tying
//! materials, decides which patterns can be tied with what is on hand, and
//! recommends the single material purchase that unlocks the most patterns.
//!
//! # Features
//!
//! - **Fuzzy**: bead sizes, color families and thread weights are compared
//!   instead of raw strings
//! - **Forgiving**: free-text inventory entries work next to catalog links
//! - **Practical**: "almost tie-able" lists and a purchase leaderboard
//! - **Portable**: CSV import and export of whole pattern catalogs
//!
//! # Quick Start
//!
//! ```bash
//! # Import a pattern catalog
//! flybox import patterns.csv --global
//!
//! # Tell flybox what you own
//! flybox inventory alias "UTC 70D thread black"
//! flybox inventory import materials.txt
//!
//! # What can I tie, and what should I buy?
//! flybox tie
//! flybox unlock
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod matcher;
pub mod models;
pub mod parsers;

// Re-export commonly used types
pub use analyzer::{DiscoveryReport, MatchResult, TieabilityEvaluator, UnlockCandidate};
pub use error::{FlyboxError, Result};
pub use models::{Fly, InventorySnapshot, MaterialCatalog, MaterialRequirement};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Score how well an on-hand material can stand in for a required one
///
/// # Example
///
/// ```
/// assert_eq!(flybox::score("Hook", "hook"), 1.0);
/// assert!(flybox::score("Thread Black", "UTC Thread Black 70D") >= 0.8);
/// ```
pub fn score(required: &str, on_hand: &str) -> f32 {
    matcher::score(required, on_hand)
}

/// Evaluate one fly against an inventory with the default threshold
///
/// # Example
///
/// ```
/// use flybox::{Fly, InventorySnapshot, MaterialRequirement};
///
/// let fly = Fly::new("Zebra Midge", "trout")
///     .with_requirement(MaterialRequirement::new("Thread", Some("Black".into())));
/// let inventory = InventorySnapshot::new().with_text("UTC Thread Black 70D");
///
/// assert!(flybox::evaluate(&fly, &inventory).tieable);
/// ```
pub fn evaluate(fly: &Fly, inventory: &InventorySnapshot) -> MatchResult {
    TieabilityEvaluator::new().evaluate(fly, inventory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "flybox");
    }

    #[test]
    fn test_evaluate_empty_fly() {
        let fly = Fly::new("Bare Hook", "trout");
        let result = evaluate(&fly, &InventorySnapshot::new());
        assert!(result.tieable);
        assert_eq!(result.missing_count, 0);
    }
}
