//! Query construction: typed algebra and the text filter language
//!
//! Both paths end in the same [`Query`] tree, which compiles to the wire
//! [`SubQuery`](crate::wire::SubQuery).

mod algebra;
mod parser;
mod value;

pub use algebra::{compile, Query};
pub use parser::{parse_filter, Clause, ComparisonExpr, Conjunction, FilterExpr, Literal};
pub use value::QueryValue;
