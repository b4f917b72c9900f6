//! Client-side list processing for the tally records.
//!
//! The engine owns no I/O: it takes records fetched by the `client` crate and
//! answers two questions for the page layer.
//!
//! - Which records should a list show, and in what order? See
//!   [`apply_filters`] and [`FilterSpec`].
//! - Is a form payload fit to be sent? See [`Validate`].

pub use error::{FilterError, ValidationError};
pub use filter::{FilterSpec, Selection, SortKey, SortOrder, apply_filters};
pub use record::Filterable;
pub use validation::Validate;

mod error;
mod filter;
mod record;
mod validation;
