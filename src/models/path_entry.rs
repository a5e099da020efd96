/// A walked filesystem entry, relative to the index root.
///
/// `score` is only meaningful on values returned from a completion query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub path: String,
    pub is_dir: bool,
    pub score: u32,
}
