pub mod evaluator;
pub mod parser;

pub use evaluator::{filter_by_environment, EnvironmentFilter, EnvironmentScoped};
pub use parser::{parse_filter, parse_filter_names};
