use thiserror::Error;

/// Fatal pipeline errors. The lexer and parser abort on the first one;
/// there is no recovery within a run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid token '{0}'")]
    InvalidToken(String),

    #[error("unknown character '{0}'")]
    UnknownCharacter(char),

    #[error("no relation specified for pair ({0}, {1})")]
    NoRelationSpecified(String, String),

    #[error("no rule for sequence [{0}]")]
    NoRuleForSequence(String),

    #[error("constant '{0}' is out of range")]
    ConstantOutOfRange(String),

    #[error("parsing finished without producing a program")]
    MissingProgram,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Accumulated declaration diagnostics. These never abort the pipeline;
/// the semantic analyzer collects them and code generation proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("variable '{0}' is already declared")]
    VariableRedeclared(String),

    #[error("variable '{0}' is used before declaration")]
    VariableUsedBeforeDeclaration(String),
}
