//! Bound invocation and the command assembler seam.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use cmdtree_core::{
    ArgumentsMetadata, CommandMetadata, GlobalMetadata, GroupMetadata, OptionMetadata,
    ParseError, ParseState, ParsedOption, ParserConfig,
};
use serde::{Deserialize, Serialize};

/// Immutable result of a successful parse.
///
/// Holds the resolved context (global metadata, group path, command and
/// parser configuration) together with the option and argument bindings.
/// Options are looked up by any of their names.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{ArgumentsMetadata, CommandMetadata, GlobalMetadata, OptionMetadata};
/// use cmdtree_parser::parse;
///
/// let global = GlobalMetadata::new("tool").with_command(
///     CommandMetadata::new("serve")
///         .with_option(OptionMetadata::with_value(&["-p", "--port"]))
///         .with_option(OptionMetadata::flag(&["-q", "--quiet"]))
///         .with_arguments(ArgumentsMetadata::new("roots")),
/// );
///
/// let invocation = parse(&global, ["serve", "--port", "8080", "www"]).unwrap();
/// assert_eq!(invocation.command().name, "serve");
/// assert_eq!(invocation.get::<u16>("-p").unwrap(), Some(8080));
/// assert!(!invocation.is_present("--quiet"));
/// assert_eq!(invocation.arguments(), ["www"]);
/// ```
#[derive(Debug, Clone)]
pub struct Invocation<'m> {
    global: Option<&'m GlobalMetadata>,
    groups: Vec<&'m GroupMetadata>,
    command: &'m CommandMetadata,
    parser: &'m ParserConfig,
    all_options: Vec<&'m OptionMetadata>,
    options: Vec<ParsedOption<'m>>,
    arguments: Vec<String>,
    default_command_used: bool,
}

impl<'m> Invocation<'m> {
    /// Binds a validated parse state.
    pub fn from_state(state: ParseState<'m>) -> Result<Self, ParseError> {
        let command = state.command().ok_or(ParseError::CommandMissing)?;
        let global = state.global();
        let groups = state.groups().to_vec();
        let parser = state.config();
        let all_options = state.reachable_options();
        let default_command_used = state.default_command_used();
        let (options, arguments) = state.into_bindings();
        Ok(Self {
            global,
            groups,
            command,
            parser,
            all_options,
            options,
            arguments,
            default_command_used,
        })
    }

    /// Global metadata; `None` for single-command parses.
    pub fn global(&self) -> Option<&'m GlobalMetadata> {
        self.global
    }

    /// Resolved group path, outermost first.
    pub fn groups(&self) -> &[&'m GroupMetadata] {
        &self.groups
    }

    /// Innermost resolved group.
    pub fn group(&self) -> Option<&'m GroupMetadata> {
        self.groups.last().copied()
    }

    pub fn command(&self) -> &'m CommandMetadata {
        self.command
    }

    pub fn parser(&self) -> &'m ParserConfig {
        self.parser
    }

    /// Every option reachable from the command, given or not.
    pub fn all_options(&self) -> &[&'m OptionMetadata] {
        &self.all_options
    }

    /// Options that were given, in first-occurrence order.
    pub fn parsed_options(&self) -> &[ParsedOption<'m>] {
        &self.options
    }

    pub fn arguments_metadata(&self) -> Option<&'m ArgumentsMetadata> {
        self.command.arguments.as_ref()
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Whether the command was selected as a default.
    pub fn default_command_used(&self) -> bool {
        self.default_command_used
    }

    /// Bindings for the option answering to `name`, if it was given.
    pub fn option(&self, name: &str) -> Option<&ParsedOption<'m>> {
        self.options.iter().find(|p| p.option.matches(name))
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.option(name).is_some()
    }

    /// Times the option was given.
    pub fn occurrences(&self, name: &str) -> usize {
        self.option(name).map_or(0, |p| p.occurrences)
    }

    /// Last value given for the option.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(ParsedOption::last_value)
    }

    /// Every value given for the option, in input order.
    pub fn values(&self, name: &str) -> &[String] {
        self.option(name)
            .map(|p| p.values.as_slice())
            .unwrap_or_default()
    }

    /// Converts the option's last value.
    ///
    /// Returns `Ok(None)` when the option was not given and
    /// [`ParseError::Assembly`] when the value does not convert.
    pub fn get<T>(&self, name: &str) -> Result<Option<T>, ParseError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(value) = self.value(name) else {
            return Ok(None);
        };
        value.parse().map(Some).map_err(|err| {
            ParseError::Assembly(format!("option '{name}': invalid value '{value}': {err}"))
        })
    }

    /// Serialisable view of the bindings.
    pub fn summary(&self) -> InvocationSummary {
        InvocationSummary {
            program: self.global.map(|g| g.name.clone()),
            groups: self.groups.iter().map(|g| g.name.clone()).collect(),
            command: self.command.name.clone(),
            default_command_used: self.default_command_used,
            options: self
                .options
                .iter()
                .map(|p| {
                    (
                        p.option.canonical_name().to_string(),
                        OptionSummary {
                            title: p.option.title.clone(),
                            occurrences: p.occurrences,
                            values: p.values.clone(),
                        },
                    )
                })
                .collect(),
            arguments: self.arguments.clone(),
        }
    }
}

/// Owned, serialisable summary of an [`Invocation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    pub command: String,
    #[serde(default)]
    pub default_command_used: bool,
    /// Given options keyed by canonical name.
    #[serde(default)]
    pub options: BTreeMap<String, OptionSummary>,
    #[serde(default)]
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSummary {
    pub title: String,
    pub occurrences: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Builds the final command value from a bound invocation.
///
/// This is the command factory. It is passed to each `parse_with` call
/// instead of living in [`ParserConfig`](cmdtree_core::ParserConfig), so one
/// configuration can feed several output types.
///
/// Implemented for closures:
///
/// ```
/// use cmdtree_core::{CommandMetadata, GlobalMetadata, ParseError};
/// use cmdtree_parser::{Invocation, parse_with};
///
/// let global = GlobalMetadata::new("tool").with_command(CommandMetadata::new("status"));
/// let name = parse_with(&global, ["status"], |invocation: Invocation<'_>| {
///     Ok::<_, ParseError>(invocation.command().name.clone())
/// })
/// .unwrap();
/// assert_eq!(name, "status");
/// ```
pub trait CommandAssembler {
    type Output;

    fn assemble(&self, invocation: Invocation<'_>) -> Result<Self::Output, ParseError>;
}

impl<F, T> CommandAssembler for F
where
    F: Fn(Invocation<'_>) -> Result<T, ParseError>,
{
    type Output = T;

    fn assemble(&self, invocation: Invocation<'_>) -> Result<T, ParseError> {
        self(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdtree_core::{ArgumentsMetadata, GroupMetadata};

    use crate::parse;

    fn tree() -> GlobalMetadata {
        GlobalMetadata::new("tool")
            .with_option(OptionMetadata::flag(&["-v", "--verbose"]))
            .with_group(
                GroupMetadata::new("remote").with_command(
                    CommandMetadata::new("add")
                        .with_option(OptionMetadata::with_value(&["-t", "--track"]))
                        .with_option(OptionMetadata::with_value(&["--depth"]))
                        .with_arguments(ArgumentsMetadata::new("name")),
                ),
            )
    }

    #[test]
    fn test_accessors() {
        let global = tree();
        let invocation = parse(
            &global,
            ["-vv", "remote", "add", "-t", "main", "--track=dev", "origin"],
        )
        .unwrap();

        assert_eq!(invocation.group().unwrap().name, "remote");
        assert_eq!(invocation.occurrences("--verbose"), 2);
        assert_eq!(invocation.values("-t"), ["main", "dev"]);
        assert_eq!(invocation.value("--track"), Some("dev"));
        assert!(invocation.values("--depth").is_empty());
        assert_eq!(invocation.all_options().len(), 3);
        assert_eq!(invocation.arguments(), ["origin"]);
        assert_eq!(invocation.arguments_metadata().unwrap().title, "name");
        assert!(!invocation.default_command_used());
    }

    #[test]
    fn test_get_converts_values() {
        let global = tree();
        let invocation = parse(&global, ["remote", "add", "--depth", "ten"]).unwrap();
        assert!(matches!(
            invocation.get::<u32>("--depth"),
            Err(ParseError::Assembly(_))
        ));
        assert_eq!(invocation.get::<u32>("--track").unwrap(), None);

        let invocation = parse(&global, ["remote", "add", "--depth", "10"]).unwrap();
        assert_eq!(invocation.get::<u32>("--depth").unwrap(), Some(10));
    }

    #[test]
    fn test_summary() {
        let global = tree();
        let invocation = parse(&global, ["-v", "remote", "add", "-t", "main", "origin"]).unwrap();
        let summary = invocation.summary();

        assert_eq!(summary.program.as_deref(), Some("tool"));
        assert_eq!(summary.groups, vec!["remote"]);
        assert_eq!(summary.command, "add");
        assert_eq!(summary.options["-t"].values, vec!["main"]);
        assert_eq!(summary.options["-v"].occurrences, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["options"]["-v"]["title"], "verbose");
        assert!(json["options"]["-v"].get("values").is_none());
    }
}
