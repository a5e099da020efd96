use crate::core::errors::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// File-type names the search tool knows about, used for filter completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCatalog {
    names: Vec<String>,
}

impl TypeCatalog {
    pub fn new(mut names: Vec<String>) -> Self {
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Asks `<program> --type-list` for the known types.
    pub async fn load(program: &Path) -> Result<Self> {
        let output = Command::new(program)
            .arg("--type-list")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: program.display().to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(Error::Other(format!(
                "'{} --type-list' exited with {}",
                program.display(),
                output.status
            )));
        }
        Ok(Self::new(parse_type_list(&String::from_utf8_lossy(&output.stdout))))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Catalog names starting with the last comma-separated segment of `input`.
    pub fn suggest(&self, input: &str) -> Vec<String> {
        let last = input.rsplit(',').next().unwrap_or("").trim();
        if last.is_empty() {
            return Vec::new();
        }
        self.names
            .iter()
            .filter(|name| name.starts_with(last))
            .cloned()
            .collect()
    }
}

/// Parses `name: glob, glob` lines into type names.
pub fn parse_type_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, _)| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a comma separated filter input, trimming and dropping blanks.
pub fn parse_types(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Replaces the segment being typed with `chosen`.
pub fn complete_last_segment(input: &str, chosen: &str) -> String {
    match input.rfind(',') {
        Some(idx) => format!("{},{}", &input[..idx], chosen),
        None => chosen.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_list_output_is_parsed() {
        let output = "go: *.go\nrust: *.rs\nts: *.cts, *.mts, *.ts\n\nbroken line\n";
        assert_eq!(parse_type_list(output), vec!["go", "rust", "ts"]);
    }

    #[test]
    fn filter_input_is_split() {
        assert_eq!(parse_types("go, rust,,  "), vec!["go", "rust"]);
        assert!(parse_types("").is_empty());
    }

    #[test]
    fn suggestions_follow_last_segment() {
        let catalog = TypeCatalog::new(vec!["rust".into(), "ruby".into(), "go".into()]);
        assert_eq!(catalog.suggest("go, ru"), vec!["ruby", "rust"]);
        assert!(catalog.suggest("go,").is_empty());
        assert!(catalog.suggest("").is_empty());
    }

    #[test]
    fn completion_replaces_last_segment() {
        assert_eq!(complete_last_segment("go,ru", "rust"), "go,rust");
        assert_eq!(complete_last_segment("ru", "rust"), "rust");
    }
}
