pub mod paths;
pub mod preview;
pub mod search;
pub mod syntax;
pub mod types;
