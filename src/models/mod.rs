pub mod file_context;
pub mod path_entry;
pub mod search_match;

pub use file_context::FileContext;
pub use path_entry::PathEntry;
pub use search_match::{Match, Submatch};
