//! Wire formats consumed by the engine
//!
//! Two external documents feed the leaderboard:
//! - The simulator's live timings JSON ([`telemetry`]), decoded with serde
//! - The championship roster CSV ([`roster`]), split by hand since it is
//!   a fixed-column export without quoting
//!
//! Both decoders are structural only. Business meaning (sentinel times,
//! class names, name keys) is resolved later in `transform` and `matching`.

pub mod roster;
pub mod telemetry;

pub use roster::{ROSTER_MIN_COLUMNS, RawParticipant, parse_roster};
pub use telemetry::{CarData, CarInfo, Driver, LeaderboardData, OrderedMap, SplitTime};
