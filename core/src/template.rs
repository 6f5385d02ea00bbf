//! Alias argument templates.
//!
//! An alias expands to a sequence of templates. Each template is either
//! literal text or a positional reference to a token that followed the alias
//! invocation:
//!
//! | Form             | Meaning                                         |
//! |------------------|-------------------------------------------------|
//! | `text`           | emitted verbatim                                |
//! | `$N`             | the Nth following token (1-based)               |
//! | `${N}`           | same as `$N`                                    |
//! | `${N:-default}`  | the Nth following token, or `default` if absent |
//!
//! A reference whose number does not parse (or is zero) is kept as a literal.

use std::fmt;

/// One parsed alias argument.
///
/// # Examples
///
/// ```
/// use cmdtree_core::AliasTemplate;
///
/// assert_eq!(
///     AliasTemplate::parse("${2:-table}"),
///     AliasTemplate::Positional {
///         raw: "${2:-table}".into(),
///         index: 1,
///         default: Some("table".into()),
///     }
/// );
/// assert_eq!(AliasTemplate::parse("$x"), AliasTemplate::Literal("$x".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTemplate {
    /// Text emitted as-is.
    Literal(String),
    /// Reference to a following token.
    Positional {
        /// The template as written, emitted when nothing can be substituted.
        raw: String,
        /// Zero-based index into the tokens following the alias.
        index: usize,
        /// Value used when the referenced token is absent.
        default: Option<String>,
    },
}

impl AliasTemplate {
    /// Parses a single template string. Never fails; anything that is not a
    /// well-formed reference is a literal.
    pub fn parse(raw: &str) -> Self {
        match parse_reference(raw) {
            Some((index, default)) => Self::Positional {
                raw: raw.to_string(),
                index,
                default,
            },
            None => Self::Literal(raw.to_string()),
        }
    }

    /// Returns the template text as originally written.
    pub fn raw(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Positional { raw, .. } => raw,
        }
    }
}

impl From<&str> for AliasTemplate {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for AliasTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

fn parse_reference(raw: &str) -> Option<(usize, Option<String>)> {
    let rest = raw.strip_prefix('$')?;

    let (number, default) = match rest.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        Some(inner) => match inner.find(":-") {
            Some(split) if split > 0 => (&inner[..split], Some(inner[split + 2..].to_string())),
            Some(_) => return None,
            None => (inner, None),
        },
        None => (rest, None),
    };

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let position: usize = number.parse().ok()?;
    Some((position.checked_sub(1)?, default))
}
