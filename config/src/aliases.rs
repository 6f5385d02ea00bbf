//! User alias files.
//!
//! Users can keep their own aliases outside the program definition, one per
//! line:
//!
//! ```text
//! # comments start with '#'
//! st = status
//! ra = remote add $1
//! lg = log --format "%h %s" ${1:-HEAD}
//! ```
//!
//! Tokens are separated by whitespace. Double or single quotes group a token
//! containing whitespace; inside double quotes a backslash escapes the next
//! character.
//!
//! A [`UserAliasSource`] searches an ordered list of files. Aliases from
//! earlier files win over later ones with the same name, and missing files
//! are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::definition::AliasDefinition;
use crate::error::{ConfigError, Result};

/// Ordered list of user alias files.
///
/// # Examples
///
/// ```no_run
/// use cmdtree_config::UserAliasSource;
///
/// let aliases = UserAliasSource::new()
///     .with_location("/home/me/.config/tool/aliases")
///     .with_location("/etc/tool/aliases")
///     .with_prefix("tool.")
///     .load()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAliasSource {
    locations: Vec<PathBuf>,
    prefix: Option<String>,
}

impl UserAliasSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a file to search. Earlier locations take precedence.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.locations.push(path.into());
        self
    }

    /// Only keys starting with `prefix` are read, with the prefix removed.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Reads every existing location and merges the aliases found.
    pub fn load(&self) -> Result<Vec<AliasDefinition>> {
        let mut aliases: Vec<AliasDefinition> = Vec::new();
        for path in &self.locations {
            if !path.is_file() {
                debug!(path = %path.display(), "Alias file not found, skipping");
                continue;
            }
            let found = load_alias_file(path, self.prefix.as_deref())?;
            debug!(path = %path.display(), count = found.len(), "Loaded alias file");
            for alias in found {
                if !aliases.iter().any(|a| a.name == alias.name) {
                    aliases.push(alias);
                }
            }
        }
        Ok(aliases)
    }
}

/// Reads a single alias file.
pub fn load_alias_file(path: &Path, prefix: Option<&str>) -> Result<Vec<AliasDefinition>> {
    let content = fs::read_to_string(path)?;
    parse_aliases(&content, prefix).map_err(|(line, message)| ConfigError::AliasSyntax {
        path: path.to_path_buf(),
        line,
        message,
    })
}

/// Parses alias file content.
///
/// A name defined twice in the same file keeps its first definition. Errors
/// carry the 1-based line number.
pub fn parse_aliases(
    content: &str,
    prefix: Option<&str>,
) -> std::result::Result<Vec<AliasDefinition>, (usize, String)> {
    let mut aliases: Vec<AliasDefinition> = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let number = index + 1;
        let Some((key, value)) = line.split_once('=') else {
            return Err((number, format!("expected 'name = tokens', found '{line}'")));
        };

        let key = key.trim();
        let name = match prefix {
            Some(prefix) => match key.strip_prefix(prefix) {
                Some(name) => name,
                None => continue,
            },
            None => key,
        };
        if name.is_empty() {
            return Err((number, "alias name is empty".to_string()));
        }
        if name.chars().any(char::is_whitespace) {
            return Err((number, format!("alias name '{name}' contains whitespace")));
        }

        let arguments = split_tokens(value).map_err(|message| (number, message))?;
        if !aliases.iter().any(|a| a.name == name) {
            aliases.push(AliasDefinition::new(name, arguments));
        }
    }
    Ok(aliases)
}

fn split_tokens(input: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => return Err("unterminated double quote".to_string()),
                        },
                        Some(other) => current.push(other),
                        None => return Err("unterminated double quote".to_string()),
                    }
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(other) => current.push(other),
                        None => return Err("unterminated single quote".to_string()),
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        let content = r#"
# personal aliases
st = status
ra = remote add $1
lg = log --format "%h %s" ${1:-HEAD}
empty =
"#;
        let aliases = parse_aliases(content, None).unwrap();
        assert_eq!(aliases.len(), 4);
        assert_eq!(aliases[0], AliasDefinition::new("st", vec!["status".into()]));
        assert_eq!(aliases[1].arguments, vec!["remote", "add", "$1"]);
        assert_eq!(aliases[2].arguments, vec!["log", "--format", "%h %s", "${1:-HEAD}"]);
        assert!(aliases[3].arguments.is_empty());
    }

    #[test]
    fn test_quoting() {
        assert_eq!(
            split_tokens(r#"a "b c" 'd "e"' "f\"g" h""i"#).unwrap(),
            vec!["a", "b c", "d \"e\"", "f\"g", "hi"]
        );
        assert_eq!(split_tokens(r#""""#).unwrap(), vec![""]);
        assert!(split_tokens("\"open").is_err());
        assert!(split_tokens("'open").is_err());
    }

    #[test]
    fn test_prefix_filter() {
        let content = "tool.st = status\nother.st = stash\ntool.co = checkout\n";
        let aliases = parse_aliases(content, Some("tool.")).unwrap();
        let names: Vec<&str> = aliases.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["st", "co"]);
        assert_eq!(aliases[0].arguments, vec!["status"]);
    }

    #[test]
    fn test_syntax_errors_carry_line_numbers() {
        assert_eq!(parse_aliases("a = b\nbroken\n", None).unwrap_err().0, 2);
        assert_eq!(parse_aliases("\n = b\n", None).unwrap_err().0, 2);
        assert_eq!(parse_aliases("a b = c\n", None).unwrap_err().0, 1);
    }

    #[test]
    fn test_first_definition_in_file_wins() {
        let aliases = parse_aliases("st = status\nst = stash\n", None).unwrap();
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].arguments, vec!["status"]);
    }

    #[test]
    fn test_earlier_locations_win() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user");
        let system = dir.path().join("system");
        fs::write(&user, "st = status --short\n").unwrap();
        fs::write(&system, "st = status\nco = checkout\n").unwrap();

        let aliases = UserAliasSource::new()
            .with_location(&user)
            .with_location(dir.path().join("missing"))
            .with_location(&system)
            .load()
            .unwrap();

        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases[0].arguments, vec!["status", "--short"]);
        assert_eq!(aliases[1].name, "co");
    }

    #[test]
    fn test_load_reports_path_on_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases");
        fs::write(&path, "ok = fine\nbad \"quote = x\n").unwrap();

        let err = UserAliasSource::new().with_location(&path).load().unwrap_err();
        match err {
            ConfigError::AliasSyntax { path: p, line, .. } => {
                assert_eq!(p, path);
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
