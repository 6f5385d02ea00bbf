//! Post-parse restriction framework.
//!
//! Restrictions attach to three places in the metadata tree and run after a
//! parse has been structurally validated:
//!
//! - [`GlobalRestriction`]: on [`GlobalMetadata`](crate::GlobalMetadata), sees
//!   the whole [`ParseState`].
//! - [`ArgumentsRestriction`]: on an [`ArgumentsMetadata`] declaration.
//! - [`OptionRestriction`]: on an [`OptionMetadata`]; runs for every option
//!   reachable from the resolved command, supplied or not.
//!
//! Restrictions that only look at individual values implement
//! [`ValueRestriction`] and get the option and arguments forms for free.
//! Ad-hoc checks can be written as closures with [`FnRestriction`].

mod global;
mod occurrences;
mod path;
mod tagged;
mod value;

use std::fmt;

use crate::error::RestrictionViolation;
use crate::state::ParseState;
use crate::types::{ArgumentsMetadata, OptionMetadata};

pub use global::{NoRepeatedOptionsRestriction, RequireExplicitCommandRestriction};
pub use occurrences::OccurrencesRestriction;
pub use path::{PathKind, PathRestriction};
pub use tagged::{TagRule, TaggedRestriction};
pub use value::{
    AllowedValuesRestriction, LengthRestriction, NotBlankRestriction, NotEmptyRestriction,
    PatternRestriction, RangeRestriction,
};

/// Restriction over the complete parse state.
pub trait GlobalRestriction: Send + Sync + fmt::Debug {
    fn validate(&self, state: &ParseState<'_>) -> Result<(), RestrictionViolation>;
}

/// Restriction over a command's positional arguments.
pub trait ArgumentsRestriction: Send + Sync + fmt::Debug {
    fn post_validate(
        &self,
        state: &ParseState<'_>,
        arguments: &ArgumentsMetadata,
    ) -> Result<(), RestrictionViolation>;
}

/// Restriction over one option. Called whether or not the option was given.
pub trait OptionRestriction: Send + Sync + fmt::Debug {
    fn post_validate(
        &self,
        state: &ParseState<'_>,
        option: &OptionMetadata,
    ) -> Result<(), RestrictionViolation>;

    /// The tag rule this restriction takes part in, if any.
    fn tag(&self) -> Option<(TagRule, &str)> {
        None
    }
}

/// Restriction checking each supplied value on its own.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{ValueRestriction, RestrictionViolation};
///
/// #[derive(Debug)]
/// struct Lowercase;
///
/// impl ValueRestriction for Lowercase {
///     fn check_value(&self, title: &str, value: &str) -> Result<(), RestrictionViolation> {
///         if value.chars().any(char::is_uppercase) {
///             let message = format!("{title}: '{value}' must be lowercase");
///             return Err(RestrictionViolation::Custom(message));
///         }
///         Ok(())
///     }
/// }
///
/// assert!(Lowercase.check_value("name", "abc").is_ok());
/// assert!(Lowercase.check_value("name", "aBc").is_err());
/// ```
pub trait ValueRestriction: Send + Sync + fmt::Debug {
    fn check_value(&self, title: &str, value: &str) -> Result<(), RestrictionViolation>;
}

impl<T: ValueRestriction> OptionRestriction for T {
    fn post_validate(
        &self,
        state: &ParseState<'_>,
        option: &OptionMetadata,
    ) -> Result<(), RestrictionViolation> {
        let Some(parsed) = state.option(option) else {
            return Ok(());
        };
        parsed
            .values
            .iter()
            .try_for_each(|value| self.check_value(&option.title, value))
    }
}

impl<T: ValueRestriction> ArgumentsRestriction for T {
    fn post_validate(
        &self,
        state: &ParseState<'_>,
        arguments: &ArgumentsMetadata,
    ) -> Result<(), RestrictionViolation> {
        state
            .parsed_arguments()
            .iter()
            .try_for_each(|value| self.check_value(&arguments.title, value))
    }
}

/// Adapts a closure into a restriction.
///
/// The closure's signature decides which restriction trait it implements.
///
/// ```
/// use cmdtree_core::{FnRestriction, GlobalMetadata, ParseState, RestrictionViolation};
///
/// let no_arguments = FnRestriction::new(|state: &ParseState<'_>| {
///     if state.parsed_arguments().is_empty() {
///         Ok(())
///     } else {
///         Err(RestrictionViolation::Custom("arguments are not accepted".into()))
///     }
/// });
/// let global = GlobalMetadata::new("tool").with_restriction(no_arguments);
/// assert_eq!(global.restrictions.len(), 1);
/// ```
pub struct FnRestriction<F> {
    check: F,
}

impl<F> FnRestriction<F> {
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F> fmt::Debug for FnRestriction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRestriction").finish_non_exhaustive()
    }
}

impl<F> GlobalRestriction for FnRestriction<F>
where
    F: Fn(&ParseState<'_>) -> Result<(), RestrictionViolation> + Send + Sync,
{
    fn validate(&self, state: &ParseState<'_>) -> Result<(), RestrictionViolation> {
        (self.check)(state)
    }
}

impl<F> OptionRestriction for FnRestriction<F>
where
    F: Fn(&ParseState<'_>, &OptionMetadata) -> Result<(), RestrictionViolation> + Send + Sync,
{
    fn post_validate(
        &self,
        state: &ParseState<'_>,
        option: &OptionMetadata,
    ) -> Result<(), RestrictionViolation> {
        (self.check)(state, option)
    }
}

impl<F> ArgumentsRestriction for FnRestriction<F>
where
    F: Fn(&ParseState<'_>, &ArgumentsMetadata) -> Result<(), RestrictionViolation> + Send + Sync,
{
    fn post_validate(
        &self,
        state: &ParseState<'_>,
        arguments: &ArgumentsMetadata,
    ) -> Result<(), RestrictionViolation> {
        (self.check)(state, arguments)
    }
}
