//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`FilterError`] returned when a filter option cannot be interpreted.
//! - [`ValidationError`] returned when a form payload has invalid fields.
use std::{collections::BTreeMap, fmt};

use thiserror::Error;

/// Errors raised while building a [`FilterSpec`](crate::FilterSpec).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid selection \"{0}\": expected an id, \"all\" or nothing")]
    InvalidSelection(String),
    #[error("unknown sort key \"{0}\"")]
    UnknownSortKey(String),
    #[error("unknown sort order \"{0}\"")]
    UnknownSortOrder(String),
}

/// Field-level validation failures, one message per offending field.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationError {
    pub(crate) fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub(crate) fn into_result(self) -> Result<(), ValidationError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Message for `field`, if it failed.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}
