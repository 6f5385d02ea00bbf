//! Mutable parse accumulator.
//!
//! A [`ParseState`] is owned by a single parse. It borrows the metadata tree it
//! classifies against and records the resolved scope, option bindings,
//! argument values and any input that could not be classified.

use crate::config::ParserConfig;
use crate::types::{CommandMetadata, GlobalMetadata, GroupMetadata, OptionMetadata};

/// Where the state machine is in the token grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    /// Initial: the next token may select a group, a command or an option.
    #[default]
    AwaitingToken,
    /// The previous token was an option still owed values.
    ExpectingOptionValue,
    /// A command is resolved; tokens are its options and arguments.
    Args,
}

/// Values bound to one option.
#[derive(Debug, Clone)]
pub struct ParsedOption<'m> {
    /// The declaration the values belong to.
    pub option: &'m OptionMetadata,
    /// Number of times the option was given.
    pub occurrences: usize,
    /// Values across all occurrences, in input order.
    pub values: Vec<String>,
}

impl ParsedOption<'_> {
    /// Last value given, if the option takes values.
    pub fn last_value(&self) -> Option<&str> {
        self.values.last().map(String::as_str)
    }
}

/// Accumulated result of classifying a token stream.
#[derive(Debug, Clone)]
pub struct ParseState<'m> {
    config: &'m ParserConfig,
    global: Option<&'m GlobalMetadata>,
    groups: Vec<&'m GroupMetadata>,
    command: Option<&'m CommandMetadata>,
    location: Location,
    parsed_options: Vec<ParsedOption<'m>>,
    parsed_arguments: Vec<String>,
    unparsed_input: Vec<String>,
    current_option: Option<&'m OptionMetadata>,
    pending_values: usize,
    separator_seen: bool,
    default_command_used: bool,
}

impl<'m> ParseState<'m> {
    /// Starts a parse at global scope.
    pub fn for_global(global: &'m GlobalMetadata) -> Self {
        Self::new(&global.parser, Some(global), None)
    }

    /// Starts a parse with a single command already resolved.
    pub fn for_command(config: &'m ParserConfig, command: &'m CommandMetadata) -> Self {
        Self::new(config, None, Some(command))
    }

    fn new(
        config: &'m ParserConfig,
        global: Option<&'m GlobalMetadata>,
        command: Option<&'m CommandMetadata>,
    ) -> Self {
        Self {
            config,
            global,
            groups: Vec::new(),
            command,
            location: if command.is_some() {
                Location::Args
            } else {
                Location::AwaitingToken
            },
            parsed_options: Vec::new(),
            parsed_arguments: Vec::new(),
            unparsed_input: Vec::new(),
            current_option: None,
            pending_values: 0,
            separator_seen: false,
            default_command_used: false,
        }
    }

    pub fn config(&self) -> &'m ParserConfig {
        self.config
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

    pub fn command(&self) -> Option<&'m CommandMetadata> {
        self.command
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn parsed_options(&self) -> &[ParsedOption<'m>] {
        &self.parsed_options
    }

    pub fn parsed_arguments(&self) -> &[String] {
        &self.parsed_arguments
    }

    pub fn unparsed_input(&self) -> &[String] {
        &self.unparsed_input
    }

    /// Option still owed values when in [`Location::ExpectingOptionValue`].
    pub fn current_option(&self) -> Option<&'m OptionMetadata> {
        self.current_option
    }

    /// Whether the arguments separator has been consumed.
    pub fn separator_seen(&self) -> bool {
        self.separator_seen
    }

    /// Whether the command was chosen as a default rather than named.
    pub fn default_command_used(&self) -> bool {
        self.default_command_used
    }

    /// Bindings for `option`, if it was given.
    pub fn option(&self, option: &OptionMetadata) -> Option<&ParsedOption<'m>> {
        self.parsed_options
            .iter()
            .find(|p| std::ptr::eq(p.option, option))
    }

    /// Options reachable from the resolved scope: global, then each resolved
    /// group, then the command, each in declaration order.
    pub fn reachable_options(&self) -> Vec<&'m OptionMetadata> {
        let mut options: Vec<&'m OptionMetadata> = Vec::new();
        if let Some(global) = self.global {
            options.extend(global.options.iter());
        }
        for group in &self.groups {
            options.extend(group.options.iter());
        }
        if let Some(command) = self.command {
            options.extend(command.options.iter());
        }
        options
    }

    /// Enters a (possibly nested) group.
    pub fn push_group(&mut self, group: &'m GroupMetadata) {
        self.groups.push(group);
    }

    /// Resolves the command named in the input.
    pub fn resolve_command(&mut self, command: &'m CommandMetadata) {
        self.command = Some(command);
        if self.location == Location::AwaitingToken {
            self.location = Location::Args;
        }
    }

    /// Resolves a default command in place of a named one.
    pub fn use_default_command(&mut self, command: &'m CommandMetadata) {
        self.resolve_command(command);
        self.default_command_used = true;
    }

    /// Records an occurrence of `option`. Options taking values move the state
    /// to [`Location::ExpectingOptionValue`] until `arity` values arrive.
    pub fn begin_option(&mut self, option: &'m OptionMetadata) {
        match self
            .parsed_options
            .iter()
            .position(|p| std::ptr::eq(p.option, option))
        {
            Some(index) => self.parsed_options[index].occurrences += 1,
            None => self.parsed_options.push(ParsedOption {
                option,
                occurrences: 1,
                values: Vec::new(),
            }),
        }

        if option.takes_value() {
            self.current_option = Some(option);
            self.pending_values = option.arity;
            self.location = Location::ExpectingOptionValue;
        }
    }

    /// Binds a value to the option currently owed values. Ignored when no
    /// option is pending.
    pub fn push_option_value(&mut self, value: String) {
        let Some(option) = self.current_option else {
            return;
        };
        if let Some(parsed) = self
            .parsed_options
            .iter_mut()
            .find(|p| std::ptr::eq(p.option, option))
        {
            parsed.values.push(value);
        }

        self.pending_values = self.pending_values.saturating_sub(1);
        if self.pending_values == 0 {
            self.current_option = None;
            self.location = if self.command.is_some() {
                Location::Args
            } else {
                Location::AwaitingToken
            };
        }
    }

    /// Records a positional argument for the resolved command.
    pub fn push_argument(&mut self, value: String) {
        self.parsed_arguments.push(value);
    }

    /// Records a token that could not be classified.
    pub fn push_unparsed(&mut self, token: String) {
        self.unparsed_input.push(token);
    }

    /// Marks the arguments separator as consumed.
    pub fn enter_separator_mode(&mut self) {
        self.separator_seen = true;
    }

    /// Consumes the state, returning option bindings and arguments.
    pub fn into_bindings(self) -> (Vec<ParsedOption<'m>>, Vec<String>) {
        (self.parsed_options, self.parsed_arguments)
    }
}
