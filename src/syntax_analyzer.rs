use std::collections::VecDeque;

use crate::error::CompileError;
use crate::grammar::Grammar;
use crate::models::{BinOp, Block, Expr, Lexema, Program, Statement, TokenCategory};

/// One entry of the reduction log: the rule that fired and the original
/// source tokens the reduced stack suffix covers. Nonterminals on the
/// stack remember their covered positions, so the log always shows real
/// identifiers and constants, never grammar symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    rule: &'static str,
    tokens: Vec<Lexema>,
}

impl Reduction {
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    pub fn tokens(&self) -> &[Lexema] {
        &self.tokens
    }
}

struct StackEntry {
    lex: Lexema,
    positions: Vec<usize>,
}

/// A control node whose body has not reduced yet. The next finished
/// block completes it; an if-else consumes two, then-branch first.
enum PendingControl {
    While {
        condition: Expr,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Expr,
        increment: Option<Box<Statement>>,
    },
    If {
        condition: Expr,
    },
    IfElse {
        condition: Expr,
        then_block: Option<Block>,
    },
}

/// Operator-precedence shift/reduce parser. Relations are looked up
/// between the incoming symbol and the topmost stack terminal; reductions
/// pick the longest matching rule and stitch the tree as they go.
pub struct SyntaxAnalyzer<'g> {
    grammar: &'g Grammar,
    originals: Vec<Lexema>,
    log: Vec<Reduction>,
    block_stack: Vec<Block>,
    // Source start position of each statement in the matching block,
    // so a control rule never claims a sibling from before its own span.
    span_stack: Vec<Vec<usize>>,
    pending: Vec<PendingControl>,
    pending_vars: Vec<String>,
    program: Option<Program>,
}

impl<'g> SyntaxAnalyzer<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        SyntaxAnalyzer {
            grammar,
            originals: Vec::new(),
            log: Vec::new(),
            block_stack: Vec::new(),
            span_stack: Vec::new(),
            pending: Vec::new(),
            pending_vars: Vec::new(),
            program: None,
        }
    }

    /// Parses the token sequence into a program. All state is reset on
    /// entry, so repeated calls over the same input give the same result.
    pub fn analyze(&mut self, tokens: &[Lexema]) -> Result<Program, CompileError> {
        self.originals = tokens.to_vec();
        self.log.clear();
        self.block_stack = vec![Block::default()];
        self.span_stack = vec![Vec::new()];
        self.pending.clear();
        self.pending_vars.clear();
        self.program = None;

        // None marks the "$" end sentinel.
        let mut queue: VecDeque<Option<usize>> =
            (0..tokens.len()).map(Some).chain([None]).collect();
        let mut stack: Vec<StackEntry> = vec![StackEntry {
            lex: Lexema::with_category("^", TokenCategory::Delimiter),
            positions: Vec::new(),
        }];

        while let Some(front) = queue.front().copied() {
            let incoming = match front {
                Some(i) => normalize(&self.originals[i]),
                None => "$".to_string(),
            };
            let top = topmost_terminal(&stack);
            let relation = self.grammar.relation(&incoming, &top).ok_or_else(|| {
                CompileError::NoRelationSpecified(incoming.clone(), top.clone())
            })?;

            if relation.is_shift() {
                queue.pop_front();
                match front {
                    Some(i) => {
                        let lex = self.originals[i].clone();
                        // A body always reduces before its owner in this
                        // grammar, so the block that will hold it opens
                        // as soon as "begin" lands on the stack.
                        if lex.value() == "begin" {
                            self.block_stack.push(Block::default());
                            self.span_stack.push(Vec::new());
                        }
                        stack.push(StackEntry {
                            lex,
                            positions: vec![i],
                        });
                    }
                    None => stack.push(StackEntry {
                        lex: Lexema::with_category("$", TokenCategory::Delimiter),
                        positions: Vec::new(),
                    }),
                }
            } else {
                self.reduce(&mut stack)?;
            }
        }

        self.program.take().ok_or(CompileError::MissingProgram)
    }

    pub fn reductions(&self) -> &[Reduction] {
        &self.log
    }

    fn reduce(&mut self, stack: &mut Vec<StackEntry>) -> Result<(), CompileError> {
        let lexemas: Vec<Lexema> = stack.iter().map(|e| e.lex.clone()).collect();
        let grammar = self.grammar;
        let mut best: Option<&crate::grammar::Rule> = None;
        for rule in grammar.rules() {
            // The start sentinel never takes part in a reduction.
            if rule.len() >= lexemas.len() {
                continue;
            }
            if rule.matches(&lexemas[lexemas.len() - rule.len()..])
                && best.map_or(true, |b| rule.len() > b.len())
            {
                best = Some(rule);
            }
        }
        let rule = best.ok_or_else(|| {
            let tail: Vec<&str> = lexemas[1..].iter().map(|l| l.value()).collect();
            CompileError::NoRuleForSequence(tail.join(" "))
        })?;

        let entries: Vec<StackEntry> = stack.split_off(stack.len() - rule.len());
        let positions: Vec<usize> = entries.iter().flat_map(|e| e.positions.clone()).collect();
        let covered: Vec<Lexema> = positions
            .iter()
            .map(|&i| self.originals[i].clone())
            .collect();
        self.log.push(Reduction {
            rule: rule.name(),
            tokens: covered,
        });
        self.stitch(rule.name(), &entries)?;
        stack.push(StackEntry {
            lex: rule.result().clone(),
            positions,
        });
        Ok(())
    }

    /// Builds AST pieces as reductions fire. Expression-level rules add
    /// nothing; expressions are rebuilt from covered token sequences when
    /// the owning statement reduces.
    fn stitch(&mut self, rule: &str, entries: &[StackEntry]) -> Result<(), CompileError> {
        let start = entries
            .first()
            .and_then(|e| e.positions.first())
            .copied()
            .unwrap_or(0);
        match rule {
            "description" => {
                for entry in entries {
                    for &pos in &entry.positions {
                        let lex = &self.originals[pos];
                        if lex.category() == TokenCategory::Id
                            && !self.pending_vars.iter().any(|v| v == lex.value())
                        {
                            self.pending_vars.push(lex.value().to_string());
                        }
                    }
                }
            }
            "definition_op" => {
                let name = self.token_at(&entries[1]);
                let expr = self.expr_from(&entries[3..])?;
                self.append(Statement::Assignment { name, expr }, start);
            }
            "input_op" => {
                let name = self.token_at(&entries[2]);
                self.append(Statement::Input { name }, start);
            }
            "output_op" => {
                let expr = self.expr_from(&entries[2..3])?;
                self.append(Statement::Output { expr }, start);
            }
            "while_op" => {
                let condition = self.expr_from(&entries[2..3])?;
                match self.claim_block(start) {
                    Some(body) => self.append(Statement::While { condition, body }, start),
                    None => self.pending.push(PendingControl::While { condition }),
                }
            }
            "if_op" => {
                let condition = self.expr_from(&entries[2..3])?;
                match self.claim_block(start) {
                    Some(then_block) => self.append(
                        Statement::If {
                            condition,
                            then_block,
                        },
                        start,
                    ),
                    None => self.pending.push(PendingControl::If { condition }),
                }
            }
            "if-else_op" => {
                let condition = self.expr_from(&entries[2..3])?;
                // The else branch reduced last, so it is popped first.
                let else_block = self.claim_block(start);
                let then_block = self.claim_block(start);
                match (then_block, else_block) {
                    (Some(then_block), Some(else_block)) => self.append(
                        Statement::IfElse {
                            condition,
                            then_block,
                            else_block,
                        },
                        start,
                    ),
                    _ => self.pending.push(PendingControl::IfElse {
                        condition,
                        then_block: None,
                    }),
                }
            }
            "for_op" => {
                let condition = self.expr_from(&entries[4..5])?;
                match self.claim_block(start) {
                    Some(body) => {
                        let increment = self.claim_statement(start).map(Box::new);
                        let init = self.claim_statement(start).map(Box::new);
                        self.append(
                            Statement::For {
                                init,
                                condition,
                                increment,
                                body,
                            },
                            start,
                        );
                    }
                    None => self.pending.push(PendingControl::For {
                        init: None,
                        condition,
                        increment: None,
                    }),
                }
            }
            "block_op" => {
                if self.block_stack.len() > 1 {
                    let finished = self.block_stack.pop().unwrap_or_default();
                    self.span_stack.pop();
                    self.finish_block(finished, start);
                }
            }
            "program" => {
                let name = self.token_at(&entries[1]);
                let variables = std::mem::take(&mut self.pending_vars);
                let body = if self.block_stack.len() > 1 {
                    self.span_stack.pop();
                    self.block_stack.pop().unwrap_or_default()
                } else {
                    std::mem::take(&mut self.block_stack[0])
                };
                self.program = Some(Program {
                    name,
                    variables,
                    body,
                });
            }
            // id, ids, ops, term_*, factor_*, atom_pars, neg_num
            _ => {}
        }
        Ok(())
    }

    fn finish_block(&mut self, finished: Block, start: usize) {
        match self.pending.pop() {
            Some(PendingControl::While { condition }) => self.append(
                Statement::While {
                    condition,
                    body: finished,
                },
                start,
            ),
            Some(PendingControl::If { condition }) => self.append(
                Statement::If {
                    condition,
                    then_block: finished,
                },
                start,
            ),
            Some(PendingControl::IfElse {
                condition,
                then_block: None,
            }) => self.pending.push(PendingControl::IfElse {
                condition,
                then_block: Some(finished),
            }),
            Some(PendingControl::IfElse {
                condition,
                then_block: Some(then_block),
            }) => self.append(
                Statement::IfElse {
                    condition,
                    then_block,
                    else_block: finished,
                },
                start,
            ),
            Some(PendingControl::For {
                init,
                condition,
                increment,
            }) => self.append(
                Statement::For {
                    init,
                    condition,
                    increment,
                    body: finished,
                },
                start,
            ),
            None => self.append(Statement::Block(finished), start),
        }
    }

    fn append(&mut self, statement: Statement, start: usize) {
        if let Some(block) = self.block_stack.last_mut() {
            block.statements.push(statement);
            if let Some(spans) = self.span_stack.last_mut() {
                spans.push(start);
            }
        }
    }

    /// Takes the most recent statement of the active block as a body.
    /// A reduced begin/end block unwraps; a bare statement is boxed into
    /// a one-statement block.
    fn claim_block(&mut self, min_start: usize) -> Option<Block> {
        Some(match self.claim_statement(min_start)? {
            Statement::Block(block) => block,
            statement => Block {
                statements: vec![statement],
            },
        })
    }

    /// Pops the active block's last statement, but only if it begins at
    /// or after `min_start`. Anything earlier is a sibling of the caller,
    /// not part of its construct.
    fn claim_statement(&mut self, min_start: usize) -> Option<Statement> {
        if self.span_stack.last()?.last().copied()? < min_start {
            return None;
        }
        self.span_stack.last_mut()?.pop();
        self.block_stack.last_mut()?.statements.pop()
    }

    fn token_at(&self, entry: &StackEntry) -> String {
        entry
            .positions
            .first()
            .map(|&i| self.originals[i].value().to_string())
            .unwrap_or_default()
    }

    fn expr_from(&self, entries: &[StackEntry]) -> Result<Expr, CompileError> {
        let tokens: Vec<Lexema> = entries
            .iter()
            .flat_map(|e| e.positions.iter().map(|&i| self.originals[i].clone()))
            .collect();
        build_expr(&tokens).ok_or_else(|| {
            // A lexically valid constant can still exceed the value range;
            // that deserves a better message than a shapeless-sequence one.
            if let Some(lex) = tokens.iter().find(|l| {
                l.category() == TokenCategory::Const && l.value().parse::<i32>().is_err()
            }) {
                return CompileError::ConstantOutOfRange(lex.value().to_string());
            }
            let joined: Vec<&str> = tokens.iter().map(|l| l.value()).collect();
            CompileError::NoRuleForSequence(joined.join(" "))
        })
    }
}

fn normalize(lex: &Lexema) -> String {
    match lex.category() {
        TokenCategory::Id | TokenCategory::Const => "a".to_string(),
        _ => lex.value().to_string(),
    }
}

/// The topmost stack symbol that carries precedence. Nonterminals are
/// skipped; the "^" sentinel terminates the search.
fn topmost_terminal(stack: &[StackEntry]) -> String {
    for entry in stack.iter().rev() {
        if entry.lex.category() != TokenCategory::Nonterminal {
            return normalize(&entry.lex);
        }
    }
    "^".to_string()
}

/// Rebuilds an expression tree from a covered token sequence: leaves by
/// original category, a split at the first parenthesis-depth-0 operator
/// strictly inside the sequence, balanced outer parentheses unwrapped.
fn build_expr(tokens: &[Lexema]) -> Option<Expr> {
    match tokens {
        [] => None,
        [single] => leaf(single),
        _ => {
            let mut depth = 0i32;
            for (i, lex) in tokens.iter().enumerate() {
                match lex.value() {
                    "(" => depth += 1,
                    ")" => depth -= 1,
                    _ => {
                        if depth == 0 && i > 0 && i < tokens.len() - 1 && lex.is_arithmetic() {
                            let op = BinOp::from_symbol(lex.value())?;
                            let left = build_expr(&tokens[..i])?;
                            let right = build_expr(&tokens[i + 1..])?;
                            return Some(Expr::Binary {
                                op,
                                left: Box::new(left),
                                right: Box::new(right),
                            });
                        }
                    }
                }
            }
            if tokens[0].value() == "-" {
                return match build_expr(&tokens[1..])? {
                    Expr::Constant(value) => Some(Expr::Constant(-value)),
                    expr => Some(Expr::Binary {
                        op: BinOp::Sub,
                        left: Box::new(Expr::Constant(0)),
                        right: Box::new(expr),
                    }),
                };
            }
            if tokens[0].value() == "(" && tokens[tokens.len() - 1].value() == ")" {
                return build_expr(&tokens[1..tokens.len() - 1]);
            }
            None
        }
    }
}

fn leaf(lex: &Lexema) -> Option<Expr> {
    match lex.category() {
        TokenCategory::Id => Some(Expr::Identifier(lex.value().to_string())),
        TokenCategory::Const => lex.value().parse().ok().map(Expr::Constant),
        _ => None,
    }
}
