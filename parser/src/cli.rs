//! Parse entry points.
//!
//! Both entry points run the same pipeline: alias resolution, token
//! classification, default-command fallback and validation. The
//! multi-command form starts at global scope; the single-command form starts
//! with its command already resolved.

use cmdtree_core::{
    CommandMetadata, GlobalMetadata, ParseError, ParseState, ParserConfig, ValidationError,
    validate_command, validate_global,
};
use tracing::debug;

use crate::alias::resolve_aliases;
use crate::invocation::{CommandAssembler, Invocation};
use crate::machine::StateMachine;
use crate::tokens::TokenStream;
use crate::validator::validate;

/// Parses `tokens` against a multi-command tree.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CommandMetadata, GlobalMetadata, ParseError};
/// use cmdtree_parser::parse;
///
/// let global = GlobalMetadata::new("tool").with_command(CommandMetadata::new("status"));
/// assert_eq!(parse(&global, ["status"]).unwrap().command().name, "status");
/// assert_eq!(
///     parse(&global, ["stats"]).unwrap_err(),
///     ParseError::CommandUnrecognized(vec!["stats".to_string()])
/// );
/// ```
pub fn parse<I, S>(global: &GlobalMetadata, tokens: I) -> Result<Invocation<'_>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let config = &global.parser;
    let tokens = resolve_aliases(
        config,
        Some(global),
        tokens.into_iter().collect(),
        config.error_handler(),
    )?;
    debug!(program = %global.name, tokens = ?tokens.remaining(), "Parsing");

    let state = StateMachine::new(ParseState::for_global(global)).run(tokens);
    validate(&state)?;
    Invocation::from_state(state)
}

/// Parses `tokens` against a single command.
pub fn parse_single<'m, I, S>(
    config: &'m ParserConfig,
    command: &'m CommandMetadata,
    tokens: I,
) -> Result<Invocation<'m>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tokens = resolve_aliases(
        config,
        None,
        tokens.into_iter().collect(),
        config.error_handler(),
    )?;
    debug!(command = %command.name, tokens = ?tokens.remaining(), "Parsing");

    let state = StateMachine::new(ParseState::for_command(config, command)).run(tokens);
    validate(&state)?;
    Invocation::from_state(state)
}

/// Parses against a multi-command tree and hands the result to `assembler`.
pub fn parse_with<A, I, S>(
    global: &GlobalMetadata,
    tokens: I,
    assembler: A,
) -> Result<A::Output, ParseError>
where
    A: CommandAssembler,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    assembler.assemble(parse(global, tokens)?)
}

/// Parses against a single command and hands the result to `assembler`.
pub fn parse_single_with<A, I, S>(
    config: &ParserConfig,
    command: &CommandMetadata,
    tokens: I,
    assembler: A,
) -> Result<A::Output, ParseError>
where
    A: CommandAssembler,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    assembler.assemble(parse_single(config, command, tokens)?)
}

/// A validated multi-command tree.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{AliasMetadata, CommandMetadata, GlobalMetadata, ParserConfig};
/// use cmdtree_parser::Cli;
///
/// let cli = Cli::new(
///     GlobalMetadata::new("tool")
///         .with_command(CommandMetadata::new("status"))
///         .with_parser(
///             ParserConfig::builder()
///                 .alias(AliasMetadata::new("st", &["status"]))
///                 .build(),
///         ),
/// )
/// .unwrap();
///
/// assert_eq!(cli.expand(["st"]).unwrap(), vec!["status"]);
/// assert_eq!(cli.parse(["st"]).unwrap().command().name, "status");
/// ```
#[derive(Debug, Clone)]
pub struct Cli {
    global: GlobalMetadata,
}

impl Cli {
    /// Validates `global` and wraps it.
    pub fn new(global: GlobalMetadata) -> Result<Self, Vec<ValidationError>> {
        let errors = validate_global(&global);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self { global })
    }

    pub fn metadata(&self) -> &GlobalMetadata {
        &self.global
    }

    pub fn parse<I, S>(&self, tokens: I) -> Result<Invocation<'_>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        parse(&self.global, tokens)
    }

    pub fn parse_with<A, I, S>(&self, tokens: I, assembler: A) -> Result<A::Output, ParseError>
    where
        A: CommandAssembler,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        parse_with(&self.global, tokens, assembler)
    }

    /// Runs alias resolution only.
    pub fn expand<I, S>(&self, tokens: I) -> Result<Vec<String>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = &self.global.parser;
        let tokens: TokenStream = tokens.into_iter().collect();
        resolve_aliases(config, Some(&self.global), tokens, config.error_handler())
            .map(TokenStream::into_remaining)
    }
}

/// A validated standalone command and its parser configuration.
#[derive(Debug, Clone)]
pub struct SingleCommand {
    config: ParserConfig,
    command: CommandMetadata,
}

impl SingleCommand {
    /// Validates `command` with `config` and wraps them.
    pub fn new(
        config: ParserConfig,
        command: CommandMetadata,
    ) -> Result<Self, Vec<ValidationError>> {
        let errors = validate_command(&config, &command);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self { config, command })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn command(&self) -> &CommandMetadata {
        &self.command
    }

    pub fn parse<I, S>(&self, tokens: I) -> Result<Invocation<'_>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        parse_single(&self.config, &self.command, tokens)
    }

    pub fn parse_with<A, I, S>(&self, tokens: I, assembler: A) -> Result<A::Output, ParseError>
    where
        A: CommandAssembler,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        parse_single_with(&self.config, &self.command, tokens, assembler)
    }
}
