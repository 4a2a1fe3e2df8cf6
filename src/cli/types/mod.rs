//! Type-safe wrappers for seasons, players, and teams.

pub mod ids;
pub mod time;

pub use ids::{FangraphsId, PlayerId, TeamAbbr};
pub use time::Season;
