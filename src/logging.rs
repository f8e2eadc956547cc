//! Targets for the [log] macros used throughout the crate, one per
//! subsystem. The library installs no log implementation.

pub const ANALYSIS: &str = "analysis";
pub const BACKJUMP: &str = "backjump";
pub const DECISION: &str = "decision";
pub const PROPAGATION: &str = "propagation";
pub const SEARCH: &str = "search";
