use std::path::Path;

use crate::code_generator::CodeGenerator;
use crate::error::{CompileError, SemanticError};
use crate::grammar::Grammar;
use crate::lexical_analyzer::LexicalAnalyzer;
use crate::models::Program;
use crate::semantic_analyzer::SemanticAnalyzer;
use crate::syntax_analyzer::{Reduction, SyntaxAnalyzer};

/// Everything a finished run produces. Semantic errors do not stop code
/// generation; callers decide what to do with them.
#[derive(Debug)]
pub struct Compilation {
    pub program: Program,
    pub listing: Vec<String>,
    pub semantic_errors: Vec<SemanticError>,
}

/// Runs the four stages in order over one source. Owns the grammar and
/// the lexer; the per-run analyzers reset themselves on every call.
pub struct Compiler {
    grammar: Grammar,
    lexer: LexicalAnalyzer,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler {
            grammar: Grammar::standard(),
            lexer: LexicalAnalyzer::new(),
        }
    }

    pub fn compile_file(&mut self, path: impl AsRef<Path>) -> Result<Compilation, CompileError> {
        let path = path.as_ref();
        if !self.lexer.load_file(path) {
            return Err(CompileError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("source file not found: {}", path.display()),
            )));
        }
        self.run()
    }

    pub fn compile_text(&mut self, text: &str) -> Result<Compilation, CompileError> {
        self.lexer.load_text(text);
        self.run()
    }

    fn run(&mut self) -> Result<Compilation, CompileError> {
        println!("[Compiler] Starting compilation");

        println!("[Compiler] Lexical analysis");
        self.lexer.analyze()?;
        println!(
            "[Compiler] Lexical analysis complete, {} tokens",
            self.lexer.tokenized_code().len()
        );

        println!("[Compiler] Syntax analysis");
        let mut parser = SyntaxAnalyzer::new(&self.grammar);
        let program = parser.analyze(self.lexer.tokenized_code())?;
        println!(
            "[Compiler] Syntax analysis complete, {} reductions",
            parser.reductions().len()
        );

        println!("[Compiler] Semantic analysis");
        let mut sema = SemanticAnalyzer::new();
        if !sema.analyze(parser.reductions()) {
            println!(
                "[Compiler] Semantic analysis found {} errors",
                sema.errors().len()
            );
        }
        let semantic_errors = sema.errors().to_vec();

        println!("[Compiler] Generating assembly code");
        let listing = CodeGenerator::new().generate(&program);
        println!(
            "[Compiler] Compilation complete, {} listing lines",
            listing.len()
        );

        Ok(Compilation {
            program,
            listing,
            semantic_errors,
        })
    }

    /// Lexes only; for token and table dumps.
    pub fn tokenize(&mut self, text: &str) -> Result<&LexicalAnalyzer, CompileError> {
        self.lexer.load_text(text);
        self.lexer.analyze()?;
        Ok(&self.lexer)
    }

    /// Lexes and parses only; returns the reduction log.
    pub fn parse(&mut self, text: &str) -> Result<(Program, Vec<Reduction>), CompileError> {
        self.lexer.load_text(text);
        self.lexer.analyze()?;
        let mut parser = SyntaxAnalyzer::new(&self.grammar);
        let program = parser.analyze(self.lexer.tokenized_code())?;
        Ok((program, parser.reductions().to_vec()))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Expr, Statement};

    const SCENARIO: &str =
        "program P var x int begin let x = 2 + 3 ; output ( x ) end .";

    #[test]
    fn test_full_pipeline_on_clean_program() {
        let mut compiler = Compiler::new();
        let result = compiler.compile_text(SCENARIO).unwrap();
        assert!(result.semantic_errors.is_empty());
        assert_eq!(result.program.name, "P");
        assert!(result.listing.iter().any(|l| l == "  mov [_x], eax"));
        assert_eq!(result.listing.last().map(String::as_str), Some("end main"));
    }

    #[test]
    fn test_semantic_errors_do_not_stop_codegen() {
        let mut compiler = Compiler::new();
        let result = compiler
            .compile_text("program P begin let x = 2 + 3 ; output ( x ) end .")
            .unwrap();
        assert_eq!(
            result.semantic_errors,
            vec![SemanticError::VariableUsedBeforeDeclaration("x".to_string())],
        );
        assert!(
            result.listing.iter().any(|l| l == "  _x dd 0"),
            "The listing should still be produced for the undeclared variable"
        );
    }

    #[test]
    fn test_lexical_error_aborts() {
        let mut compiler = Compiler::new();
        let err = compiler.compile_text("program P @ begin end .").unwrap_err();
        assert!(matches!(err, CompileError::UnknownCharacter('@')));
    }

    #[test]
    fn test_syntax_error_aborts() {
        let mut compiler = Compiler::new();
        let err = compiler
            .compile_text("program P begin let x = 2 end")
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::NoRelationSpecified(_, _) | CompileError::NoRuleForSequence(_)
        ));
    }

    #[test]
    fn test_compilation_is_debuggable() {
        let mut compiler = Compiler::new();
        let result = compiler.compile_text(SCENARIO).unwrap();
        let dump = format!("{:?}", result);
        assert!(
            dump.contains("Compilation") && dump.contains("\"P\""),
            "The compilation result should carry a usable debug view"
        );
    }

    #[test]
    fn test_parse_returns_log() {
        let mut compiler = Compiler::new();
        let (program, log) = compiler.parse(SCENARIO).unwrap();
        assert_eq!(program.variables, vec!["x".to_string()]);
        assert_eq!(log.last().map(|r| r.rule()), Some("program"));
    }

    #[test]
    fn test_compile_missing_file() {
        let mut compiler = Compiler::new();
        let err = compiler.compile_file("/definitely/not/here.dsl").unwrap_err();
        assert!(matches!(err, CompileError::Io(_)));
    }

    #[test]
    fn test_pipeline_statements_shape() {
        let mut compiler = Compiler::new();
        let result = compiler.compile_text(SCENARIO).unwrap();
        assert_eq!(result.program.body.statements.len(), 2);
        assert!(matches!(
            result.program.body.statements[0],
            Statement::Assignment { .. }
        ));
        assert!(matches!(
            result.program.body.statements[1],
            Statement::Output {
                expr: Expr::Identifier(_)
            }
        ));
    }
}
