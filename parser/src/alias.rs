//! Alias macro expansion.
//!
//! Runs before any structural parsing. When the first token names an alias,
//! the alias is replaced by its templates with positional references
//! substituted from the tokens that followed it. With chaining enabled the
//! result is examined again, until the first token is no longer an alias.

use cmdtree_core::{
    AliasMetadata, AliasTemplate, Disposition, ErrorHandler, GlobalMetadata, ParseError,
    ParserConfig,
};
use tracing::{debug, warn};

use crate::tokens::TokenStream;

/// Expands aliases at the front of `tokens`.
///
/// `global` is used to recognise builtins when aliases may not override them;
/// single-command parses pass `None`. A circular reference is reported to
/// `handler`: on [`Disposition::Abort`] the error is returned, on
/// [`Disposition::Continue`] the stream is returned as it stood before the
/// repeated alias was reached.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{AliasMetadata, FailFast, ParserConfig};
/// use cmdtree_parser::{TokenStream, resolve_aliases};
///
/// let config = ParserConfig::builder()
///     .alias(AliasMetadata::new("ls", &["list", "--format", "${1:-table}"]))
///     .build();
///
/// let tokens: TokenStream = ["ls"].into_iter().collect();
/// let expanded = resolve_aliases(&config, None, tokens, &FailFast).unwrap();
/// assert_eq!(expanded.remaining(), ["list", "--format", "table"]);
///
/// let tokens: TokenStream = ["ls", "json"].into_iter().collect();
/// let expanded = resolve_aliases(&config, None, tokens, &FailFast).unwrap();
/// assert_eq!(expanded.remaining(), ["list", "--format", "json"]);
/// ```
pub fn resolve_aliases(
    config: &ParserConfig,
    global: Option<&GlobalMetadata>,
    mut tokens: TokenStream,
    handler: &dyn ErrorHandler,
) -> Result<TokenStream, ParseError> {
    if tokens.is_empty() || config.aliases().is_empty() {
        return Ok(tokens);
    }

    let prefix = config.force_builtin_prefix();
    let mut seen: Vec<String> = Vec::new();

    loop {
        let Some(first) = tokens.peek() else {
            return Ok(tokens);
        };

        if let Some(builtin) = first.strip_prefix(prefix) {
            let builtin = builtin.to_string();
            debug!(token = %builtin, "Forced builtin, skipping alias resolution");
            tokens.replace_front(builtin);
            return Ok(tokens);
        }

        let Some(alias) = config.find_alias(first) else {
            return Ok(tokens);
        };

        if seen.contains(&alias.name) {
            let error = ParseError::AliasCircularReference {
                alias: alias.name.clone(),
                seen,
            };
            warn!(alias = %alias.name, "Circular alias reference");
            return match handler.handle(&error) {
                Disposition::Continue => Ok(tokens),
                Disposition::Abort => Err(error),
            };
        }
        seen.push(alias.name.clone());

        if !config.aliases_override_builtins() && global.is_some_and(|g| g.is_builtin(&alias.name))
        {
            debug!(alias = %alias.name, "Alias shadows a builtin, not expanding");
            return Ok(tokens);
        }

        tokens.next();
        let expanded = expand(alias, tokens.remaining());
        debug!(alias = %alias.name, tokens = ?expanded, "Expanded alias");
        tokens.replace_remaining(expanded);

        if !config.aliases_may_chain() {
            return Ok(tokens);
        }
    }
}

/// Substitutes `arguments` (the tokens after the alias) into the alias
/// templates, then appends every argument no reference consumed.
pub(crate) fn expand(alias: &AliasMetadata, arguments: &[String]) -> Vec<String> {
    let mut consumed = vec![false; arguments.len()];
    let mut expanded = Vec::with_capacity(alias.arguments.len() + arguments.len());

    for template in &alias.arguments {
        match template {
            AliasTemplate::Literal(text) => expanded.push(text.clone()),
            AliasTemplate::Positional { raw, index, default } => {
                if let Some(value) = arguments.get(*index) {
                    expanded.push(value.clone());
                    consumed[*index] = true;
                } else if let Some(default) = default {
                    expanded.push(default.clone());
                } else {
                    expanded.push(raw.clone());
                }
            }
        }
    }

    expanded.extend(
        arguments
            .iter()
            .zip(&consumed)
            .filter(|&(_, &used)| !used)
            .map(|(token, _)| token.clone()),
    );
    expanded
}
