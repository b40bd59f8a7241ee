//! Registration matching
//!
//! Decides whether a leaderboard entry belongs to a participant of the
//! championship roster. Matching is two-tier:
//!
//! 1. **Name**: the driver name key (case, spacing and word order ignored) must
//!    equal a roster row's key
//! 2. **Class and car** (strict mode only): the class must match, and when the
//!    roster declares a car, the car names must share at least
//!    [`MIN_CAR_TOKEN_OVERLAP`] tokens
//!
//! The roster itself is loaded by [`ParticipantRegistry`], which discards
//! results of loads that were superseded while in flight.

pub mod matcher;
pub mod registry;
pub mod tokens;

pub use matcher::{MatchMode, RosterIndex, matches_candidate};
pub use registry::{ParticipantRegistry, RosterState};
pub use tokens::{
    MIN_CAR_TOKEN_OVERLAP, has_car_token_overlap, has_declared_car, normalize_text, to_car_tokens, to_name_key,
};
