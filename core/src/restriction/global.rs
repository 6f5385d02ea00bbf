use super::GlobalRestriction;
use crate::error::RestrictionViolation;
use crate::state::ParseState;

/// Rejects parses where the command was chosen as a default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireExplicitCommandRestriction;

impl GlobalRestriction for RequireExplicitCommandRestriction {
    fn validate(&self, state: &ParseState<'_>) -> Result<(), RestrictionViolation> {
        if state.default_command_used() {
            return Err(RestrictionViolation::ExplicitCommandRequired);
        }
        Ok(())
    }
}

/// Rejects options given more than once.
///
/// Options answering to any name in `allowed` may repeat.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{GlobalMetadata, NoRepeatedOptionsRestriction};
///
/// let global = GlobalMetadata::new("tool")
///     .with_restriction(NoRepeatedOptionsRestriction::allowing(&["-v"]));
/// assert_eq!(global.restrictions.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoRepeatedOptionsRestriction {
    pub allowed: Vec<String>,
}

impl NoRepeatedOptionsRestriction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowing(names: &[&str]) -> Self {
        Self {
            allowed: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl GlobalRestriction for NoRepeatedOptionsRestriction {
    fn validate(&self, state: &ParseState<'_>) -> Result<(), RestrictionViolation> {
        let repeated = state.parsed_options().iter().find(|parsed| {
            parsed.occurrences > 1 && !self.allowed.iter().any(|name| parsed.option.matches(name))
        });
        match repeated {
            Some(parsed) => Err(RestrictionViolation::RepeatedOption {
                title: parsed.option.title.clone(),
                count: parsed.occurrences,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommandMetadata, GlobalMetadata, OptionMetadata};

    fn global() -> GlobalMetadata {
        GlobalMetadata::new("tool")
            .with_option(OptionMetadata::flag(&["-v", "--verbose"]))
            .with_option(OptionMetadata::with_value(&["--name"]))
            .with_command(CommandMetadata::new("run"))
            .with_default_command("run")
    }

    #[test]
    fn test_explicit_command() {
        let global = global();
        let command = global.default_command().unwrap();

        let mut state = ParseState::for_global(&global);
        state.resolve_command(command);
        assert!(RequireExplicitCommandRestriction.validate(&state).is_ok());

        let mut state = ParseState::for_global(&global);
        state.use_default_command(command);
        assert_eq!(
            RequireExplicitCommandRestriction.validate(&state),
            Err(RestrictionViolation::ExplicitCommandRequired)
        );
    }

    #[test]
    fn test_repeated_options() {
        let global = global();
        let mut state = ParseState::for_global(&global);
        state.begin_option(&global.options[0]);
        state.begin_option(&global.options[0]);

        assert!(matches!(
            NoRepeatedOptionsRestriction::new().validate(&state),
            Err(RestrictionViolation::RepeatedOption { count: 2, .. })
        ));
        assert!(
            NoRepeatedOptionsRestriction::allowing(&["--verbose"])
                .validate(&state)
                .is_ok()
        );
    }
}
