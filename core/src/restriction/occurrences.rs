use super::value::within;
use super::{ArgumentsRestriction, OptionRestriction};
use crate::error::RestrictionViolation;
use crate::state::ParseState;
use crate::types::{ArgumentsMetadata, OptionMetadata};

/// Bounds how many times an option may be given, or how many positional
/// arguments a command accepts.
///
/// An absent option counts as zero occurrences, so a minimum of one makes the
/// option effectively required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccurrencesRestriction {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl OccurrencesRestriction {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }

    pub fn at_most(max: usize) -> Self {
        Self::new(None, Some(max))
    }

    pub fn at_least(min: usize) -> Self {
        Self::new(Some(min), None)
    }

    fn check(&self, title: &str, count: usize) -> Result<(), RestrictionViolation> {
        if within(count, self.min, self.max) {
            return Ok(());
        }
        Err(RestrictionViolation::OccurrencesOutOfRange {
            title: title.to_string(),
            count,
            min: self.min,
            max: self.max,
        })
    }
}

impl OptionRestriction for OccurrencesRestriction {
    fn post_validate(
        &self,
        state: &ParseState<'_>,
        option: &OptionMetadata,
    ) -> Result<(), RestrictionViolation> {
        let count = state.option(option).map_or(0, |p| p.occurrences);
        self.check(&option.title, count)
    }
}

impl ArgumentsRestriction for OccurrencesRestriction {
    fn post_validate(
        &self,
        state: &ParseState<'_>,
        arguments: &ArgumentsMetadata,
    ) -> Result<(), RestrictionViolation> {
        self.check(&arguments.title, state.parsed_arguments().len())
    }
}
