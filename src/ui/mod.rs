//! Terminal front end for the CLI.

pub mod terminal;

pub use terminal::{StdoutResults, print_answer};
