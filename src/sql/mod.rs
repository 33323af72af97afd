//! SQL text for the catalog probes.
//!
//! The builder issues exactly two query shapes:
//!
//! - [`schema_probe`] - one row of the table expression, for column names and types
//! - [`distinct_probe`] - one `array_agg(DISTINCT ..)` per string column, one row back
//!
//! Nothing else is planned or generated here.

mod probe;

pub use probe::{
    distinct_probe, quote_identifier, quote_literal, quote_literal_escaped, schema_probe,
};
