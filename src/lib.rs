pub mod app;
pub mod cli;
pub mod output;
pub mod regex;
pub mod search;

pub use regex::{compile, matches, matches_str, CompileError, Compiled, Token};
