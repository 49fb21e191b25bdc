//! Dotenv-style file parsing
//!
//! The env file is shared with other tooling (compose files, shell scripts),
//! so the parser accepts the common dialect: `KEY=value` lines, `#` comments,
//! blank lines, an optional `export ` prefix, and single or double quotes
//! around the value. Unknown keys are kept; the schema picks what it needs.

use super::validation::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Read and parse an env file from disk.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_env_file(&content))
}

/// Parse env file content into a key/value map.
///
/// Lines without `=` are ignored. Later assignments win over earlier ones.
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        map.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    map
}

/// Strip one matching pair of surrounding quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_assignments() {
        let map = parse_env_file("GITHUB_URL=https://github.com/acme\nMEMORY_LIMIT=4G\n");
        assert_eq!(
            map.get("GITHUB_URL").map(String::as_str),
            Some("https://github.com/acme")
        );
        assert_eq!(map.get("MEMORY_LIMIT").map(String::as_str), Some("4G"));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let map = parse_env_file("# a comment\n\n  # indented comment\nKEY=value\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("KEY").map(String::as_str), Some("value"));
    }

    #[test]
    fn strips_export_prefix() {
        let map = parse_env_file("export GITHUB_URL=https://github.com/acme\n");
        assert_eq!(
            map.get("GITHUB_URL").map(String::as_str),
            Some("https://github.com/acme")
        );
    }

    #[test]
    fn strips_matching_quotes() {
        let map = parse_env_file("A=\"quoted\"\nB='single'\nC=\"unbalanced'\n");
        assert_eq!(map.get("A").map(String::as_str), Some("quoted"));
        assert_eq!(map.get("B").map(String::as_str), Some("single"));
        assert_eq!(map.get("C").map(String::as_str), Some("\"unbalanced'"));
    }

    #[test]
    fn value_may_contain_equals() {
        let map = parse_env_file("RUNNER_LABELS=a=1,b=2\n");
        assert_eq!(map.get("RUNNER_LABELS").map(String::as_str), Some("a=1,b=2"));
    }

    #[test]
    fn ignores_lines_without_assignment() {
        let map = parse_env_file("not an assignment\nKEY=value\n");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn later_assignment_wins() {
        let map = parse_env_file("KEY=first\nKEY=second\n");
        assert_eq!(map.get("KEY").map(String::as_str), Some("second"));
    }

    #[test]
    fn read_env_file_missing_is_an_error() {
        let err = read_env_file(Path::new("/nonexistent/.env")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
