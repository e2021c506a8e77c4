pub mod config;
pub mod document;
pub mod summary;
pub mod task;

pub use config::*;
pub use document::*;
pub use summary::*;
pub use task::{Task, format_timestamp, parse_timestamp};
