//! Restrictions on individual string values.

use regex::Regex;

use super::ValueRestriction;
use crate::error::RestrictionViolation;

/// Value must match a regular expression in full.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{PatternRestriction, ValueRestriction};
///
/// let semver = PatternRestriction::new(r"\d+\.\d+\.\d+").unwrap();
/// assert!(semver.check_value("version", "1.2.3").is_ok());
/// assert!(semver.check_value("version", "v1.2.3").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PatternRestriction {
    pattern: String,
    regex: Regex,
}

impl PatternRestriction {
    /// Compiles `pattern`, anchored at both ends.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl ValueRestriction for PatternRestriction {
    fn check_value(&self, title: &str, value: &str) -> Result<(), RestrictionViolation> {
        if self.regex.is_match(value) {
            return Ok(());
        }
        Err(RestrictionViolation::PatternMismatch {
            title: title.to_string(),
            value: value.to_string(),
            pattern: self.pattern.clone(),
        })
    }
}

/// Value must be one of a fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedValuesRestriction {
    pub values: Vec<String>,
    pub ignore_case: bool,
}

impl AllowedValuesRestriction {
    pub fn new(values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
            ignore_case: false,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

impl ValueRestriction for AllowedValuesRestriction {
    fn check_value(&self, title: &str, value: &str) -> Result<(), RestrictionViolation> {
        let allowed = self.values.iter().any(|v| {
            if self.ignore_case {
                v.eq_ignore_ascii_case(value)
            } else {
                v == value
            }
        });
        if allowed {
            return Ok(());
        }
        Err(RestrictionViolation::ValueNotAllowed {
            title: title.to_string(),
            value: value.to_string(),
            allowed: self.values.clone(),
        })
    }
}

/// Value must contain a non-whitespace character.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotBlankRestriction;

impl ValueRestriction for NotBlankRestriction {
    fn check_value(&self, title: &str, value: &str) -> Result<(), RestrictionViolation> {
        if value.trim().is_empty() {
            return Err(RestrictionViolation::Blank {
                title: title.to_string(),
            });
        }
        Ok(())
    }
}

/// Value must not be the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmptyRestriction;

impl ValueRestriction for NotEmptyRestriction {
    fn check_value(&self, title: &str, value: &str) -> Result<(), RestrictionViolation> {
        if value.is_empty() {
            return Err(RestrictionViolation::Empty {
                title: title.to_string(),
            });
        }
        Ok(())
    }
}

/// Value length in characters must fall within inclusive bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthRestriction {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl LengthRestriction {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }
}

impl ValueRestriction for LengthRestriction {
    fn check_value(&self, title: &str, value: &str) -> Result<(), RestrictionViolation> {
        let length = value.chars().count();
        if within(length, self.min, self.max) {
            return Ok(());
        }
        Err(RestrictionViolation::LengthOutOfRange {
            title: title.to_string(),
            value: value.to_string(),
            min: self.min,
            max: self.max,
        })
    }
}

/// Value must be an integer within inclusive bounds.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{RangeRestriction, ValueRestriction};
///
/// let port = RangeRestriction::new(Some(1), Some(65535));
/// assert!(port.check_value("port", "8080").is_ok());
/// assert!(port.check_value("port", "0").is_err());
/// assert!(port.check_value("port", "http").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeRestriction {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl RangeRestriction {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }
}

impl ValueRestriction for RangeRestriction {
    fn check_value(&self, title: &str, value: &str) -> Result<(), RestrictionViolation> {
        let Ok(number) = value.trim().parse::<i64>() else {
            return Err(RestrictionViolation::NotANumber {
                title: title.to_string(),
                value: value.to_string(),
            });
        };
        if within(number, self.min, self.max) {
            return Ok(());
        }
        Err(RestrictionViolation::ValueOutOfRange {
            title: title.to_string(),
            value: number,
            min: self.min,
            max: self.max,
        })
    }
}

pub(super) fn within<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}
