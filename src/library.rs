//! Track catalog: scanning the music root into a title-ordered list.

mod access;
mod display;
mod model;
mod scan;

pub use access::{AccessError, check_access};
pub use model::Track;
pub use scan::scan;
