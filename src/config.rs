//! Settings for the library scan, playback polling, controls, UI and logging.
//!
//! Read once at startup from TOML plus `TAPDECK__*` environment overrides.

mod load;
mod schema;

pub use load::default_log_path;
pub use schema::*;
