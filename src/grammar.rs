use std::collections::HashMap;

use crate::models::{Lexema, TokenCategory};

/// Precedence relation between the incoming symbol and the topmost stack
/// terminal. Both shift variants push; only `Reduce` triggers a rule search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    ShiftLower,
    ShiftEqual,
    Reduce,
}

impl Relation {
    pub fn is_shift(self) -> bool {
        matches!(self, Relation::ShiftLower | Relation::ShiftEqual)
    }
}

/// A reduction rule. A pattern slot of category `Id`/`Const` (the `a`
/// template) matches any identifier or constant; every other slot matches
/// by exact value and category.
pub struct Rule {
    name: &'static str,
    pattern: Vec<Lexema>,
    result: Lexema,
}

impl Rule {
    fn new(name: &'static str, pattern: Vec<Lexema>) -> Self {
        Rule {
            name,
            pattern,
            result: nonterminal(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn result(&self) -> &Lexema {
        &self.result
    }

    /// Checks the pattern against a stack suffix of the same length.
    pub fn matches(&self, suffix: &[Lexema]) -> bool {
        if suffix.len() != self.pattern.len() {
            return false;
        }
        self.pattern.iter().zip(suffix).all(|(slot, lex)| {
            if is_atom(slot) && is_atom(lex) {
                true
            } else {
                slot == lex
            }
        })
    }
}

fn is_atom(lex: &Lexema) -> bool {
    matches!(lex.category(), TokenCategory::Id | TokenCategory::Const)
}

fn word(value: &str) -> Lexema {
    Lexema::with_category(value, TokenCategory::Word)
}

fn delim(value: &str) -> Lexema {
    Lexema::with_category(value, TokenCategory::Delimiter)
}

fn atom() -> Lexema {
    Lexema::with_category("a", TokenCategory::Id)
}

fn nonterminal() -> Lexema {
    Lexema::with_category("E", TokenCategory::Nonterminal)
}

/// Immutable grammar tables: the precedence-relation matrix and the
/// reduction rules. Built once and passed to the parser by reference.
pub struct Grammar {
    relations: HashMap<&'static str, HashMap<&'static str, Relation>>,
    rules: Vec<Rule>,
}

impl Grammar {
    /// Looks up the relation for (incoming symbol, topmost stack terminal).
    /// Symbols are literal token text with identifiers and constants
    /// normalized to "a"; "^" and "$" are the stack and input sentinels.
    pub fn relation(&self, incoming: &str, stack: &str) -> Option<Relation> {
        self.relations.get(incoming)?.get(stack).copied()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The language grammar. Outer key of the matrix is the incoming
    /// symbol, inner key the stack terminal.
    pub fn standard() -> Self {
        use Relation::{Reduce, ShiftEqual, ShiftLower};

        let matrix: &[(&'static str, &[(&'static str, Relation)])] = &[
            ("program", &[("^", ShiftLower)]),
            ("var", &[("a", ShiftLower)]),
            (
                "int",
                &[("var", ShiftLower), (",", Reduce), ("a", Reduce)],
            ),
            (
                "integer",
                &[("var", ShiftLower), (",", Reduce), ("a", Reduce)],
            ),
            (
                "begin",
                &[
                    ("a", ShiftLower),
                    ("int", Reduce),
                    ("integer", Reduce),
                    ("begin", ShiftLower),
                    (";", ShiftLower),
                    ("else", ShiftLower),
                    ("then", ShiftLower),
                    (")", ShiftLower),
                ],
            ),
            (
                "end",
                &[
                    (";", Reduce),
                    ("end", Reduce),
                    ("begin", ShiftLower),
                    ("a", Reduce),
                    ("*", Reduce),
                    ("/", Reduce),
                    ("-", Reduce),
                    ("+", Reduce),
                    ("=", Reduce),
                    (")", Reduce),
                    ("then", Reduce),
                    ("else", Reduce),
                ],
            ),
            (
                "input",
                &[
                    ("begin", ShiftLower),
                    (";", ShiftLower),
                    ("else", ShiftLower),
                    ("then", ShiftLower),
                    (")", ShiftLower),
                ],
            ),
            (
                "output",
                &[
                    ("begin", ShiftLower),
                    (";", ShiftLower),
                    ("else", ShiftLower),
                    ("then", ShiftLower),
                    (")", ShiftLower),
                ],
            ),
            (
                "for",
                &[
                    ("begin", ShiftLower),
                    (";", ShiftLower),
                    ("else", ShiftLower),
                    ("then", ShiftLower),
                    (")", ShiftLower),
                ],
            ),
            (
                "while",
                &[
                    ("begin", ShiftLower),
                    (";", ShiftLower),
                    ("else", ShiftLower),
                    ("then", ShiftLower),
                    (")", ShiftLower),
                ],
            ),
            (
                "if",
                &[
                    ("begin", ShiftLower),
                    (";", ShiftLower),
                    ("else", ShiftLower),
                    ("then", ShiftLower),
                    (")", ShiftLower),
                ],
            ),
            (
                "let",
                &[
                    ("begin", ShiftLower),
                    (";", ShiftLower),
                    ("else", ShiftLower),
                    ("then", ShiftLower),
                    (")", ShiftLower),
                    ("(", ShiftLower),
                ],
            ),
            (
                ";",
                &[
                    ("a", Reduce),
                    ("begin", ShiftLower),
                    ("end", Reduce),
                    (";", ShiftLower),
                    (",", Reduce),
                    ("*", Reduce),
                    ("/", Reduce),
                    ("-", Reduce),
                    ("+", Reduce),
                    ("=", Reduce),
                    ("else", Reduce),
                    ("then", Reduce),
                    ("(", ShiftLower),
                    (")", Reduce),
                ],
            ),
            (
                ",",
                &[
                    ("var", ShiftLower),
                    (",", ShiftLower),
                    ("*", Reduce),
                    ("/", Reduce),
                    ("-", Reduce),
                    ("+", Reduce),
                    ("a", Reduce),
                    ("(", ShiftLower),
                    (")", Reduce),
                ],
            ),
            (".", &[("end", ShiftEqual)]),
            (
                "*",
                &[
                    ("a", Reduce),
                    ("end", Reduce),
                    (";", ShiftLower),
                    (",", ShiftLower),
                    ("*", Reduce),
                    ("/", Reduce),
                    ("+", ShiftLower),
                    ("-", ShiftLower),
                    ("=", ShiftLower),
                    ("(", ShiftLower),
                    (")", Reduce),
                ],
            ),
            (
                "/",
                &[
                    ("a", Reduce),
                    ("end", Reduce),
                    (";", ShiftLower),
                    (",", ShiftLower),
                    ("*", Reduce),
                    ("/", Reduce),
                    ("+", ShiftLower),
                    ("-", ShiftLower),
                    ("=", ShiftLower),
                    ("(", ShiftLower),
                    (")", Reduce),
                ],
            ),
            (
                "+",
                &[
                    ("a", Reduce),
                    ("end", Reduce),
                    (";", ShiftLower),
                    (",", ShiftLower),
                    ("*", Reduce),
                    ("/", Reduce),
                    ("+", Reduce),
                    ("-", Reduce),
                    ("=", ShiftLower),
                    ("(", ShiftLower),
                    (")", Reduce),
                ],
            ),
            (
                "-",
                &[
                    ("a", Reduce),
                    ("end", Reduce),
                    (";", ShiftLower),
                    (",", ShiftLower),
                    ("*", Reduce),
                    ("/", Reduce),
                    ("+", Reduce),
                    ("-", Reduce),
                    ("=", ShiftLower),
                    ("(", ShiftLower),
                    (")", Reduce),
                ],
            ),
            ("=", &[("end", Reduce), ("a", ShiftEqual)]),
            (
                "else",
                &[
                    ("end", Reduce),
                    ("*", Reduce),
                    ("/", Reduce),
                    ("+", Reduce),
                    ("-", Reduce),
                    ("=", Reduce),
                    (")", Reduce),
                    ("else", Reduce),
                    ("then", ShiftLower),
                    ("a", Reduce),
                ],
            ),
            ("then", &[(")", ShiftLower)]),
            (
                "a",
                &[
                    ("program", ShiftEqual),
                    ("var", ShiftLower),
                    ("let", ShiftEqual),
                    (";", ShiftLower),
                    (",", ShiftLower),
                    ("*", ShiftLower),
                    ("/", ShiftLower),
                    ("+", ShiftLower),
                    ("-", ShiftLower),
                    ("=", ShiftLower),
                    ("(", ShiftLower),
                ],
            ),
            (
                "(",
                &[
                    ("input", ShiftEqual),
                    ("output", ShiftEqual),
                    ("for", ShiftEqual),
                    ("while", ShiftEqual),
                    ("if", ShiftEqual),
                    (";", ShiftLower),
                    (",", ShiftLower),
                    ("*", ShiftLower),
                    ("/", ShiftLower),
                    ("+", ShiftLower),
                    ("-", ShiftLower),
                    ("=", ShiftLower),
                    ("(", ShiftLower),
                ],
            ),
            (
                ")",
                &[
                    ("a", Reduce),
                    ("end", Reduce),
                    ("(", ShiftEqual),
                    (")", Reduce),
                    (";", ShiftLower),
                    ("+", Reduce),
                    ("-", Reduce),
                    ("*", Reduce),
                    ("/", Reduce),
                    ("=", Reduce),
                ],
            ),
            ("$", &[(".", Reduce), ("^", ShiftLower)]),
        ];

        let relations = matrix
            .iter()
            .map(|(incoming, row)| (*incoming, row.iter().copied().collect()))
            .collect();

        let rules = vec![
            Rule::new(
                "program",
                vec![
                    word("program"),
                    atom(),
                    nonterminal(),
                    word("begin"),
                    nonterminal(),
                    word("end"),
                    delim("."),
                ],
            ),
            // A program is allowed to have no declaration section.
            Rule::new(
                "program",
                vec![
                    word("program"),
                    atom(),
                    word("begin"),
                    nonterminal(),
                    word("end"),
                    delim("."),
                ],
            ),
            Rule::new(
                "description",
                vec![word("var"), nonterminal(), word("int")],
            ),
            Rule::new(
                "description",
                vec![word("var"), nonterminal(), word("integer")],
            ),
            Rule::new("ids", vec![nonterminal(), delim(","), nonterminal()]),
            Rule::new(
                "block_op",
                vec![word("begin"), nonterminal(), word("end")],
            ),
            Rule::new(
                "input_op",
                vec![word("input"), delim("("), nonterminal(), delim(")")],
            ),
            Rule::new(
                "output_op",
                vec![word("output"), delim("("), nonterminal(), delim(")")],
            ),
            Rule::new(
                "for_op",
                vec![
                    word("for"),
                    delim("("),
                    nonterminal(),
                    delim(";"),
                    nonterminal(),
                    delim(";"),
                    nonterminal(),
                    delim(")"),
                    nonterminal(),
                ],
            ),
            Rule::new(
                "while_op",
                vec![
                    word("while"),
                    delim("("),
                    nonterminal(),
                    delim(")"),
                    nonterminal(),
                ],
            ),
            Rule::new(
                "if_op",
                vec![
                    word("if"),
                    delim("("),
                    nonterminal(),
                    delim(")"),
                    word("then"),
                    nonterminal(),
                ],
            ),
            Rule::new(
                "if-else_op",
                vec![
                    word("if"),
                    delim("("),
                    nonterminal(),
                    delim(")"),
                    word("then"),
                    nonterminal(),
                    word("else"),
                    nonterminal(),
                ],
            ),
            Rule::new(
                "definition_op",
                vec![word("let"), atom(), delim("="), nonterminal()],
            ),
            Rule::new("ops", vec![nonterminal(), delim(";"), nonterminal()]),
            Rule::new(
                "term_sum",
                vec![nonterminal(), delim("+"), nonterminal()],
            ),
            Rule::new(
                "term_dif",
                vec![nonterminal(), delim("-"), nonterminal()],
            ),
            Rule::new(
                "factor_mul",
                vec![nonterminal(), delim("*"), nonterminal()],
            ),
            Rule::new(
                "factor_div",
                vec![nonterminal(), delim("/"), nonterminal()],
            ),
            Rule::new(
                "atom_pars",
                vec![delim("("), nonterminal(), delim(")")],
            ),
            Rule::new("neg_num", vec![delim("-"), nonterminal()]),
            Rule::new("id", vec![atom()]),
        ];

        Grammar { relations, rules }
    }
}
