//! Core types for the leaderboard engine.
//!
//! These are the engine's canonical, millisecond-based values. Wire formats
//! live in [`crate::schema`]; everything here is what the pipeline produces
//! and what callers render.
//!
//! - [`ProcessedEntry`] is one driver/car row with converted lap and split times
//! - [`ProcessedLeaderboard`] is a full snapshot with session metadata
//! - [`CarClassRule`] is an ordered, first-match-wins class definition
//! - [`NormalizedParticipant`] is a roster row reduced to matching keys
//! - [`SortOrder`] selects one of the mutually exclusive row orderings
//!
//! ## Usage Example
//!
//! ```rust
//! use pitboard::types::{CarClassRule, FALLBACK_CAR_CLASS};
//! use pitboard::transform::classify_car;
//!
//! let rules = vec![CarClassRule::new("GT3", ["GT3"])];
//! assert_eq!(classify_car("Ferrari 296 GT3", "ks_ferrari_296_gt3", &rules), "GT3");
//! assert_eq!(classify_car("Mazda MX-5", "ks_mazda_mx5_cup", &rules), FALLBACK_CAR_CLASS);
//! ```

mod class_rule;
mod entry;
mod participant;
mod sort;

pub use class_rule::{CarClassRule, FALLBACK_CAR_CLASS};
pub use entry::{ProcessedEntry, ProcessedLeaderboard};
pub use participant::NormalizedParticipant;
pub use sort::{SortDirection, SortField, SortOrder};
