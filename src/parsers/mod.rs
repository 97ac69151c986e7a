//! Parsers for external fly catalog formats

pub mod csv;

pub use self::csv::{parse_flies_csv, write_flies_csv, FlyRow};
