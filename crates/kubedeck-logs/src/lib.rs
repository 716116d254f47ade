//! Log retrieval and processing for kubedeck
//!
//! This crate provides one-shot log fetching plus parsing, filtering, and
//! follow-mode streaming for the live log channel.

mod fetch;
mod filter;
mod parser;
mod stream;

pub use fetch::{LogOptions, fetch_logs};
pub use filter::LogFilter;
pub use parser::LogParser;
pub use stream::LogStream;

// Re-export types used in our public API
pub use kubedeck_types::{LogEntry, LogLevel};
