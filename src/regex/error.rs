use thiserror::Error;

// match-time "no match" is never an error, just `false`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unclosed character class: missing ']'")]
    UnclosedClass,
    #[error("unclosed group: missing ')'")]
    UnclosedGroup,
}
