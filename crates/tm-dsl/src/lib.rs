//! Definition parsing for Tablemancer tables.
//!
//! A table definition is a block of line-oriented text: unindented
//! lines name sections, lines indented two or more columns are entries,
//! and `// comments` run to end of line. Definitions usually live in
//! fenced markdown code blocks tagged `perchance`; [`markdown`] pulls
//! those out of a document and [`parser`] turns each into a
//! [`tm_core::Table`] plus a list of [`Diagnostic`]s.

pub mod diagnostics;
pub mod markdown;
pub mod parser;
pub mod validate;

pub use diagnostics::{Diagnostic, Severity, render_diagnostics};
pub use markdown::{CodeBlock, extract_code_blocks, is_table_block};
pub use parser::{DocumentParse, ParseResult, parse_document, parse_table};
pub use validate::validate;
