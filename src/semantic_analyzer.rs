use std::collections::HashSet;

use crate::error::SemanticError;
use crate::models::TokenCategory;
use crate::syntax_analyzer::Reduction;

const DECLARATION_RULES: &[&str] = &["description"];

const USAGE_RULES: &[&str] = &[
    "definition_op",
    "input_op",
    "output_op",
    "while_op",
    "for_op",
    "if_op",
    "if-else_op",
    "term_sum",
    "term_dif",
    "factor_mul",
    "factor_div",
];

/// Declaration-before-use checking over the reduction log. Errors are
/// accumulated, never thrown; the pipeline continues with whatever was
/// parsed.
pub struct SemanticAnalyzer {
    declared: HashSet<String>,
    reported: HashSet<String>,
    errors: Vec<SemanticError>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        SemanticAnalyzer {
            declared: HashSet::new(),
            reported: HashSet::new(),
            errors: Vec::new(),
        }
    }

    /// Walks the log in order. Returns true when no error was recorded.
    /// An undeclared name is reported once even though the flattened log
    /// repeats it at every use site.
    pub fn analyze(&mut self, log: &[Reduction]) -> bool {
        self.declared.clear();
        self.reported.clear();
        self.errors.clear();

        for reduction in log {
            if DECLARATION_RULES.contains(&reduction.rule()) {
                for lex in reduction.tokens() {
                    if lex.category() != TokenCategory::Id {
                        continue;
                    }
                    if !self.declared.insert(lex.value().to_string()) {
                        self.errors
                            .push(SemanticError::VariableRedeclared(lex.value().to_string()));
                    }
                }
            } else if USAGE_RULES.contains(&reduction.rule()) {
                for lex in reduction.tokens() {
                    if lex.category() != TokenCategory::Id {
                        continue;
                    }
                    if !self.declared.contains(lex.value())
                        && self.reported.insert(lex.value().to_string())
                    {
                        self.errors.push(SemanticError::VariableUsedBeforeDeclaration(
                            lex.value().to_string(),
                        ));
                    }
                }
            }
        }

        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        SemanticAnalyzer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::models::Lexema;
    use crate::syntax_analyzer::SyntaxAnalyzer;

    fn log_of(text: &str) -> Vec<Reduction> {
        let tokens: Vec<Lexema> = text.split_whitespace().map(Lexema::new).collect();
        let grammar = Grammar::standard();
        let mut parser = SyntaxAnalyzer::new(&grammar);
        parser.analyze(&tokens).expect("parsing should succeed");
        parser.reductions().to_vec()
    }

    #[test]
    fn test_clean_program_has_no_errors() {
        let log = log_of("program P var x int begin let x = 2 + 3 ; output ( x ) end .");
        let mut sema = SemanticAnalyzer::new();
        assert!(sema.analyze(&log), "Declared-then-used should be clean");
        assert!(sema.errors().is_empty());
    }

    #[test]
    fn test_undeclared_variable_reported_once() {
        let log = log_of("program P begin let x = 2 + 3 ; output ( x ) end .");
        let mut sema = SemanticAnalyzer::new();
        assert!(!sema.analyze(&log));
        assert_eq!(
            sema.errors(),
            &[SemanticError::VariableUsedBeforeDeclaration("x".to_string())],
            "One undeclared name should yield exactly one error"
        );
    }

    #[test]
    fn test_redeclaration_reported() {
        let log = log_of("program P var x , x int begin let x = 1 end .");
        let mut sema = SemanticAnalyzer::new();
        assert!(!sema.analyze(&log));
        assert_eq!(
            sema.errors(),
            &[SemanticError::VariableRedeclared("x".to_string())],
        );
    }

    #[test]
    fn test_errors_accumulate_across_names() {
        let log = log_of("program P begin let x = y end .");
        let mut sema = SemanticAnalyzer::new();
        assert!(!sema.analyze(&log));
        assert_eq!(sema.errors().len(), 2, "Both x and y are undeclared");
    }

    #[test]
    fn test_analyze_resets_state() {
        let clean = log_of("program P var x int begin let x = 1 end .");
        let dirty = log_of("program P begin let x = 1 end .");
        let mut sema = SemanticAnalyzer::new();
        assert!(!sema.analyze(&dirty));
        assert!(sema.analyze(&clean), "A clean run should not inherit old errors");
        assert!(sema.errors().is_empty());
    }

    #[test]
    fn test_program_name_is_not_a_variable_use() {
        let log = log_of("program P var x int begin let x = 1 end .");
        let mut sema = SemanticAnalyzer::new();
        assert!(
            sema.analyze(&log),
            "The program name should not count as an undeclared use"
        );
    }
}
