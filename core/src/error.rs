//! Parse error taxonomy.
//!
//! [`ParseError`] covers structural failures found while resolving aliases and
//! validating a parse; [`RestrictionViolation`] carries the detail of a failed
//! restriction and is wrapped by [`ParseError::Restriction`].

use thiserror::Error;

use crate::restriction::PathKind;

/// Errors produced by a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An alias expansion chain reached an alias it had already expanded.
    #[error("alias '{alias}' is circular (expansion chain: {})", .seen.join(" -> "))]
    AliasCircularReference {
        /// The alias that was reached again.
        alias: String,
        /// Aliases expanded so far, in expansion order.
        seen: Vec<String>,
    },
    /// No command was given and no default command applies.
    #[error("no command specified")]
    CommandMissing,
    /// The input did not name a known command.
    #[error("command not recognized: {}", .0.join(" "))]
    CommandUnrecognized(Vec<String>),
    /// Required arguments were not supplied (carries the arguments title).
    #[error("required arguments are missing: {0}")]
    ArgumentsMissing(String),
    /// Input left over after parsing.
    #[error("found unexpected parameters: {}", .0.join(" "))]
    ArgumentsUnexpected(Vec<String>),
    /// Input ended while an option still expected a value (carries its title).
    #[error("option '{0}' is missing its value")]
    OptionMissingValue(String),
    /// A required option was not supplied (carries its canonical name).
    #[error("required option '{0}' is missing")]
    OptionMissing(String),
    /// A restriction rejected the parse.
    #[error(transparent)]
    Restriction(#[from] RestrictionViolation),
    /// The command assembler could not build the command.
    #[error("failed to assemble command: {0}")]
    Assembly(String),
}

/// Detail of a failed restriction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestrictionViolation {
    #[error("{title}: path '{path}' does not exist")]
    PathMissing { title: String, path: String },
    #[error("{title}: path '{path}' is not readable")]
    PathNotReadable { title: String, path: String },
    #[error("{title}: path '{path}' is not writable")]
    PathNotWritable { title: String, path: String },
    #[error("{title}: path '{path}' is not executable")]
    PathNotExecutable { title: String, path: String },
    #[error("{title}: path '{path}' is not a {expected}")]
    PathKindMismatch {
        title: String,
        path: String,
        expected: PathKind,
    },
    #[error("{title}: value '{value}' does not match pattern '{pattern}'")]
    PatternMismatch {
        title: String,
        value: String,
        pattern: String,
    },
    #[error("{title}: value '{value}' is not one of [{}]", .allowed.join(", "))]
    ValueNotAllowed {
        title: String,
        value: String,
        allowed: Vec<String>,
    },
    #[error("{title}: value must not be blank")]
    Blank { title: String },
    #[error("{title}: value must not be empty")]
    Empty { title: String },
    #[error("{title}: length of '{value}' is outside {}", bounds(.min, .max))]
    LengthOutOfRange {
        title: String,
        value: String,
        min: Option<usize>,
        max: Option<usize>,
    },
    #[error("{title}: '{value}' is not an integer")]
    NotANumber { title: String, value: String },
    #[error("{title}: {value} is outside {}", bounds(.min, .max))]
    ValueOutOfRange {
        title: String,
        value: i64,
        min: Option<i64>,
        max: Option<i64>,
    },
    #[error("{title}: given {count} time(s), expected {}", bounds(.min, .max))]
    OccurrencesOutOfRange {
        title: String,
        count: usize,
        min: Option<usize>,
        max: Option<usize>,
    },
    #[error("only one of [{}] may be given (tag '{tag}')", .options.join(", "))]
    MutuallyExclusive { tag: String, options: Vec<String> },
    #[error("exactly one of [{}] must be given (tag '{tag}')", .options.join(", "))]
    RequireOnlyOne { tag: String, options: Vec<String> },
    #[error("at least one of [{}] must be given (tag '{tag}')", .options.join(", "))]
    RequireSome { tag: String, options: Vec<String> },
    #[error("a command must be given explicitly")]
    ExplicitCommandRequired,
    #[error("option '{title}' may only be given once, got {count}")]
    RepeatedOption { title: String, count: usize },
    #[error("{0}")]
    Custom(String),
}

fn bounds<T: std::fmt::Display>(min: &Option<T>, max: &Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("[{min}, {max}]"),
        (Some(min), None) => format!("[{min}, ..)"),
        (None, Some(max)) => format!("(.., {max}]"),
        (None, None) => "(.., ..)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ParseError::AliasCircularReference {
            alias: "a".into(),
            seen: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "alias 'a' is circular (expansion chain: a -> b)"
        );
        assert_eq!(
            ParseError::CommandUnrecognized(vec!["foo".into(), "bar".into()]).to_string(),
            "command not recognized: foo bar"
        );
    }

    #[test]
    fn test_restriction_is_transparent() {
        let err: ParseError = RestrictionViolation::ValueOutOfRange {
            title: "port".into(),
            value: 70000,
            min: Some(1),
            max: Some(65535),
        }
        .into();
        assert_eq!(err.to_string(), "port: 70000 is outside [1, 65535]");
    }
}
