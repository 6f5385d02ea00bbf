//! Tag-based cross-option rules.
//!
//! Options sharing a rule and a tag form a set. The rule is evaluated once,
//! by the first member of the set in reachable-option order, against the
//! number of members that were supplied.

use super::OptionRestriction;
use crate::error::RestrictionViolation;
use crate::state::ParseState;
use crate::types::OptionMetadata;

/// How many options of a tagged set may be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRule {
    /// At most one.
    MutuallyExclusive,
    /// Exactly one.
    RequireOnlyOne,
    /// At least one.
    RequireSome,
}

impl TagRule {
    fn allows(self, present: usize) -> bool {
        match self {
            Self::MutuallyExclusive => present <= 1,
            Self::RequireOnlyOne => present == 1,
            Self::RequireSome => present >= 1,
        }
    }
}

/// Membership of an option in a tagged set.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CommandMetadata, OptionMetadata, TaggedRestriction};
///
/// let export = CommandMetadata::new("export")
///     .with_option(
///         OptionMetadata::flag(&["--json"])
///             .with_restriction(TaggedRestriction::mutually_exclusive("format")),
///     )
///     .with_option(
///         OptionMetadata::flag(&["--yaml"])
///             .with_restriction(TaggedRestriction::mutually_exclusive("format")),
///     );
/// assert_eq!(export.options.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRestriction {
    pub rule: TagRule,
    pub tag: String,
}

impl TaggedRestriction {
    pub fn new(rule: TagRule, tag: &str) -> Self {
        Self {
            rule,
            tag: tag.to_string(),
        }
    }

    pub fn mutually_exclusive(tag: &str) -> Self {
        Self::new(TagRule::MutuallyExclusive, tag)
    }

    pub fn require_only_one(tag: &str) -> Self {
        Self::new(TagRule::RequireOnlyOne, tag)
    }

    pub fn require_some(tag: &str) -> Self {
        Self::new(TagRule::RequireSome, tag)
    }

    fn is_member(&self, option: &OptionMetadata) -> bool {
        option
            .restrictions
            .iter()
            .filter_map(|r| r.tag())
            .any(|(rule, tag)| rule == self.rule && tag == self.tag)
    }
}

impl OptionRestriction for TaggedRestriction {
    fn post_validate(
        &self,
        state: &ParseState<'_>,
        option: &OptionMetadata,
    ) -> Result<(), RestrictionViolation> {
        let members: Vec<&OptionMetadata> = state
            .reachable_options()
            .into_iter()
            .filter(|o| self.is_member(o))
            .collect();

        // Evaluated by the first member only.
        if members
            .first()
            .is_some_and(|first| !std::ptr::eq(*first, option))
        {
            return Ok(());
        }

        let present = members
            .iter()
            .filter(|o| state.option(o).is_some())
            .count();
        if self.rule.allows(present) {
            return Ok(());
        }

        let tag = self.tag.clone();
        let options = members
            .iter()
            .map(|o| o.canonical_name().to_string())
            .collect();
        Err(match self.rule {
            TagRule::MutuallyExclusive => RestrictionViolation::MutuallyExclusive { tag, options },
            TagRule::RequireOnlyOne => RestrictionViolation::RequireOnlyOne { tag, options },
            TagRule::RequireSome => RestrictionViolation::RequireSome { tag, options },
        })
    }

    fn tag(&self) -> Option<(TagRule, &str)> {
        Some((self.rule, &self.tag))
    }
}
