use std::fmt;

/// Reserved words of the source language. Lookup happens before the
/// identifier check, so these never land in the id table.
pub const KEYWORDS: &[&str] = &[
    "program", "var", "begin", "end", "int", "integer", "input", "output",
    "for", "while", "if", "then", "else", "let",
];

/// Single-character delimiters recognized by the lexer.
pub const DELIMITERS: &[char] = &['.', ',', ';', '+', '-', '/', '*', '(', ')', '='];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Word,
    Delimiter,
    Id,
    Const,
    Nonterminal,
    Error,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenCategory::Word => "Word",
            TokenCategory::Delimiter => "Delimiter",
            TokenCategory::Id => "Id",
            TokenCategory::Const => "Const",
            TokenCategory::Nonterminal => "Nonterminal",
            TokenCategory::Error => "Error",
        };
        f.write_str(name)
    }
}

/// A classified fragment of source text. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexema {
    value: String,
    category: TokenCategory,
}

impl Lexema {
    /// Classifies `value`: keyword table first, then delimiter, then
    /// identifier shape, then integer constant, otherwise `Error`.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let category = if KEYWORDS.contains(&value.as_str()) {
            TokenCategory::Word
        } else if value.len() == 1 && value.chars().all(|ch| DELIMITERS.contains(&ch)) {
            TokenCategory::Delimiter
        } else if is_identifier(&value) {
            TokenCategory::Id
        } else if is_constant(&value) {
            TokenCategory::Const
        } else {
            TokenCategory::Error
        };
        Lexema { value, category }
    }

    pub fn with_category(value: impl Into<String>, category: TokenCategory) -> Self {
        Lexema {
            value: value.into(),
            category,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn category(&self) -> TokenCategory {
        self.category
    }

    pub fn is_arithmetic(&self) -> bool {
        self.category == TokenCategory::Delimiter
            && matches!(self.value.as_str(), "+" | "-" | "*" | "/")
    }
}

impl fmt::Display for Lexema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(\"{}\", {})", self.value, self.category)
    }
}

fn is_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}

fn is_constant(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|ch| ch.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn from_symbol(symbol: &str) -> Option<BinOp> {
        match symbol {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(String),
    Constant(i32),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment {
        name: String,
        expr: Expr,
    },
    Input {
        name: String,
    },
    Output {
        expr: Expr,
    },
    While {
        condition: Expr,
        body: Block,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Expr,
        increment: Option<Box<Statement>>,
        body: Block,
    },
    If {
        condition: Expr,
        then_block: Block,
    },
    IfElse {
        condition: Expr,
        then_block: Block,
        else_block: Block,
    },
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub variables: Vec<String>,
    pub body: Block,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_classification() {
        assert_eq!(Lexema::new("program").category(), TokenCategory::Word);
        assert_eq!(Lexema::new("else").category(), TokenCategory::Word);
        assert_eq!(Lexema::new("let").category(), TokenCategory::Word);
    }

    #[test]
    fn test_delimiter_classification() {
        for d in DELIMITERS {
            assert_eq!(
                Lexema::new(d.to_string()).category(),
                TokenCategory::Delimiter,
                "'{}' should classify as a delimiter",
                d
            );
        }
    }

    #[test]
    fn test_identifier_classification() {
        assert_eq!(Lexema::new("x").category(), TokenCategory::Id);
        assert_eq!(Lexema::new("P").category(), TokenCategory::Id);
        assert_eq!(Lexema::new("counter2").category(), TokenCategory::Id);
        assert_eq!(Lexema::new("_tmp").category(), TokenCategory::Id);
    }

    #[test]
    fn test_constant_classification() {
        assert_eq!(Lexema::new("0").category(), TokenCategory::Const);
        assert_eq!(Lexema::new("12345").category(), TokenCategory::Const);
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(Lexema::new("1abc").category(), TokenCategory::Error);
        assert_eq!(Lexema::new("").category(), TokenCategory::Error);
    }

    #[test]
    fn test_equality_requires_value_and_category() {
        assert_eq!(Lexema::new("x"), Lexema::new("x"));
        assert_ne!(
            Lexema::new("x"),
            Lexema::with_category("x", TokenCategory::Const)
        );
    }
}
