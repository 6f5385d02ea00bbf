//! Post-parse validation.
//!
//! Checks run in a fixed order and the first failure is the only error
//! reported:
//!
//! 1. a command was resolved ([`ParseError::CommandMissing`] or
//!    [`ParseError::CommandUnrecognized`]);
//! 2. required arguments were given;
//! 3. no input was left unclassified;
//! 4. no option is still waiting for a value;
//! 5. every required option was given;
//! 6. global restrictions;
//! 7. arguments restrictions;
//! 8. option restrictions, for every option reachable from the command.

use cmdtree_core::{Location, ParseError, ParseState};
use tracing::debug;

/// Validates a completed parse state.
///
/// The failing error is reported to the configured error handler and then
/// returned; validation never continues past a failure.
pub fn validate(state: &ParseState<'_>) -> Result<(), ParseError> {
    check(state).inspect_err(|error| {
        debug!(error = %error, "Validation failed");
        state.config().error_handler().handle(error);
    })
}

fn check(state: &ParseState<'_>) -> Result<(), ParseError> {
    let Some(command) = state.command() else {
        let unparsed = state.unparsed_input();
        if unparsed.is_empty() {
            return Err(ParseError::CommandMissing);
        }
        return Err(ParseError::CommandUnrecognized(unparsed.to_vec()));
    };

    if let Some(arguments) = &command.arguments {
        if arguments.required && state.parsed_arguments().is_empty() {
            return Err(ParseError::ArgumentsMissing(arguments.title.clone()));
        }
    }

    if !state.unparsed_input().is_empty() {
        return Err(ParseError::ArgumentsUnexpected(
            state.unparsed_input().to_vec(),
        ));
    }

    if state.location() == Location::ExpectingOptionValue {
        let title = state
            .current_option()
            .map(|o| o.title.clone())
            .unwrap_or_default();
        return Err(ParseError::OptionMissingValue(title));
    }

    let options = state.reachable_options();
    if let Some(missing) = options
        .iter()
        .find(|o| o.required && state.option(o).is_none())
    {
        return Err(ParseError::OptionMissing(
            missing.canonical_name().to_string(),
        ));
    }

    if let Some(global) = state.global() {
        for restriction in &global.restrictions {
            restriction.validate(state)?;
        }
    }

    if let Some(arguments) = &command.arguments {
        for restriction in &arguments.restrictions {
            restriction.post_validate(state, arguments)?;
        }
    }

    for option in options {
        for restriction in &option.restrictions {
            restriction.post_validate(state, option)?;
        }
    }

    Ok(())
}
