pub mod date;

pub use date::{parse_date_expr, parse_month_spec};
