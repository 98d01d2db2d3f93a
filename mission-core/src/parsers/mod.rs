//! Parsers for the loosely structured workspace documents.
//!
//! All parsers are total: any input, including empty or binary-looking
//! text, yields a value. Unrecognised lines are skipped rather than
//! reported.

/// Declare a lazily compiled regex from a literal pattern.
macro_rules! static_regex {
    ($name:ident, $pattern:literal) => {
        static $name: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
            regex::Regex::new($pattern).expect("Invalid static regex")
        });
    };
}

mod chat;
mod client;
mod content;
mod observations;
mod priorities;

pub use chat::{parse_chat_line, parse_chat_log};
pub use client::{client_id_from_filename, parse_client};
pub use content::parse_content_queue;
pub use observations::{parse_observations, parse_timestamp};
pub use priorities::parse_priorities;
