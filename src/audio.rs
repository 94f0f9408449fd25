//! Audio output: the resource abstraction the playback controller drives,
//! and its `rodio` implementation.
//!
//! A resource plays exactly one file. It is created empty, pointed at a
//! file with `set_source`, decoded by `prepare`, and then driven through
//! `start`/`pause`/`resume`/`seek_to` until `release` consumes it.

mod output;
mod sink;

pub use output::{AudioBackend, AudioResource, OutputError};
pub use sink::RodioBackend;
