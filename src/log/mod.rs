//! Log parsing for YCSB result files and `ps` monitoring logs.

pub mod parse;
pub mod ps;
pub mod row;

pub use parse::parse_result_text;
pub use row::RawRecord;
