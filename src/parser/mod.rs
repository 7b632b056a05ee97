//! Query parsing and construction

pub mod ast;
pub mod builder;
pub mod grammar;

pub use ast::*;
pub use builder::{build_query, parse_filter, FilterValue};
pub use grammar::{parse_batch, parse_query};
