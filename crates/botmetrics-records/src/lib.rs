//! Canonical chat-bot interaction records and their JSONL store

mod io;
mod paths;
mod types;

pub use io::{append_jsonl_batch, atomic_write, read_jsonl, write_jsonl};
pub use paths::Paths;
pub use types::{ErrorCategory, LogRecord};
