pub mod ast;
pub mod error;
pub mod matcher;
pub mod parser;

pub use ast::{Compiled, Token};
pub use error::CompileError;
pub use matcher::matches;
pub use parser::compile;

pub fn matches_str(pattern: &str, line: &str) -> Result<bool, CompileError> {
    let compiled = compile(pattern)?;
    Ok(matches(&compiled, line))
}
