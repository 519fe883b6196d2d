use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CompileError;
use crate::models::{Lexema, TokenCategory, DELIMITERS};
use crate::token_table::TokenTables;

enum SourceInput {
    File(PathBuf),
    Text(String),
}

/// Splits source text into classified tokens. Results live in
/// `tokenized_code` (scan order, duplicates kept) and the per-category
/// tables (deduplicated).
pub struct LexicalAnalyzer {
    source: Option<SourceInput>,
    tables: TokenTables,
    tokenized_code: Vec<Lexema>,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        LexicalAnalyzer {
            source: None,
            tables: TokenTables::new(),
            tokenized_code: Vec::new(),
        }
    }

    /// Remembers a file source. Returns true iff the file exists.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if path.exists() {
            self.source = Some(SourceInput::File(path.to_path_buf()));
            true
        } else {
            false
        }
    }

    pub fn load_text(&mut self, text: impl Into<String>) {
        self.source = Some(SourceInput::Text(text.into()));
    }

    /// Scans the loaded source. The first invalid token or unknown
    /// character aborts the run; partial results are cleared on entry,
    /// not on failure.
    pub fn analyze(&mut self) -> Result<(), CompileError> {
        self.tables.clear();
        self.tokenized_code.clear();

        let text = match &self.source {
            Some(SourceInput::File(path)) => fs::read_to_string(path)?,
            Some(SourceInput::Text(text)) => text.clone(),
            None => String::new(),
        };

        let mut chars = text.chars().peekable();
        let mut word = String::new();

        while let Some(ch) = chars.next() {
            if ch.is_whitespace() || ch == '\0' {
                if !word.is_empty() {
                    self.register_word(&mut word)?;
                }
            } else if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
            } else if DELIMITERS.contains(&ch) {
                if ch == '/' && chars.peek() == Some(&'*') {
                    if !word.is_empty() {
                        self.register_word(&mut word)?;
                    }
                    skip_comment(&mut chars);
                    continue;
                }
                if !word.is_empty() {
                    self.register_word(&mut word)?;
                }
                self.register(Lexema::new(ch.to_string()))?;
            } else {
                return Err(CompileError::UnknownCharacter(ch));
            }
        }

        // A token still pending at end of input is flushed, not dropped.
        if !word.is_empty() {
            self.register_word(&mut word)?;
        }

        Ok(())
    }

    pub fn tokenized_code(&self) -> &[Lexema] {
        &self.tokenized_code
    }

    pub fn tables(&self) -> &TokenTables {
        &self.tables
    }

    fn register_word(&mut self, word: &mut String) -> Result<(), CompileError> {
        let lex = Lexema::new(std::mem::take(word));
        self.register(lex)
    }

    fn register(&mut self, lex: Lexema) -> Result<(), CompileError> {
        if lex.category() == TokenCategory::Error {
            return Err(CompileError::InvalidToken(lex.value().to_string()));
        }
        self.tables.register(&lex);
        self.tokenized_code.push(lex);
        Ok(())
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        LexicalAnalyzer::new()
    }
}

/// Consumes everything up to and including the closing `*/`. A comment
/// left open swallows the rest of the input.
fn skip_comment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    chars.next(); // the '*' of the opener
    while let Some(ch) = chars.next() {
        if ch == '*' && chars.peek() == Some(&'/') {
            chars.next();
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> LexicalAnalyzer {
        let mut lexer = LexicalAnalyzer::new();
        lexer.load_text(text);
        lexer.analyze().expect("lexing should succeed");
        lexer
    }

    fn values(lexer: &LexicalAnalyzer) -> Vec<&str> {
        lexer.tokenized_code().iter().map(|l| l.value()).collect()
    }

    #[test]
    fn test_scenario_program_token_count() {
        let lexer = lex("program P var x int begin let x = 2 + 3 ; output ( x ) end .");
        assert_eq!(
            lexer.tokenized_code().len(),
            19,
            "Scenario program should produce 19 tokens"
        );
    }

    #[test]
    fn test_tables_partition_and_dedup() {
        let lexer = lex("program P var x int begin let x = 2 + 3 ; output ( x ) end .");
        let tables = lexer.tables();
        // Every scanned token lands in exactly one table.
        for lex in lexer.tokenized_code() {
            let hits = [
                tables.words().contains(lex),
                tables.ids().contains(lex),
                tables.consts().contains(lex),
                tables.delimiters().contains(lex),
            ]
            .iter()
            .filter(|h| **h)
            .count();
            assert_eq!(hits, 1, "Token {} should appear in exactly one table", lex);
        }
        assert_eq!(tables.ids().len(), 2, "Ids should be P and x, deduplicated");
        assert_eq!(tables.consts().len(), 2, "Consts should be 2 and 3");
    }

    #[test]
    fn test_relex_round_trip() {
        let lexer = lex("program P var x int begin let x = 2 + 3 ; output ( x ) end .");
        let joined = values(&lexer).join(" ");
        let again = lex(&joined);
        assert_eq!(
            lexer.tokenized_code(),
            again.tokenized_code(),
            "Re-lexing the joined token values should reproduce the sequence"
        );
    }

    #[test]
    fn test_delimiters_split_words_without_spaces() {
        let lexer = lex("let x=2+3;");
        assert_eq!(values(&lexer), vec!["let", "x", "=", "2", "+", "3", ";"]);
    }

    #[test]
    fn test_block_comment_is_discarded() {
        let lexer = lex("let /* anything 123 @ */ x = 1");
        assert_eq!(values(&lexer), vec!["let", "x", "=", "1"]);
    }

    #[test]
    fn test_unterminated_comment_swallows_rest() {
        let lexer = lex("let x /* no closer");
        assert_eq!(values(&lexer), vec!["let", "x"]);
    }

    #[test]
    fn test_division_still_tokenizes() {
        let lexer = lex("x / y");
        assert_eq!(values(&lexer), vec!["x", "/", "y"]);
    }

    #[test]
    fn test_trailing_identifier_is_flushed() {
        let lexer = lex("begin x");
        assert_eq!(values(&lexer), vec!["begin", "x"]);
    }

    #[test]
    fn test_trailing_delimiter_is_flushed() {
        let lexer = lex("end .");
        assert_eq!(values(&lexer), vec!["end", "."]);
    }

    #[test]
    fn test_unknown_character_fails_before_tables_fill() {
        let mut lexer = LexicalAnalyzer::new();
        lexer.load_text("@ program");
        let err = lexer.analyze().unwrap_err();
        assert!(
            matches!(err, CompileError::UnknownCharacter('@')),
            "Expected UnknownCharacter, got {err:?}"
        );
        assert!(
            lexer.tables().is_empty(),
            "No table should be populated when the first character is invalid"
        );
    }

    #[test]
    fn test_invalid_token_fails() {
        let mut lexer = LexicalAnalyzer::new();
        lexer.load_text("let 1abc = 2");
        let err = lexer.analyze().unwrap_err();
        assert!(matches!(err, CompileError::InvalidToken(ref v) if v == "1abc"));
    }

    #[test]
    fn test_analyze_resets_previous_results() {
        let mut lexer = LexicalAnalyzer::new();
        lexer.load_text("begin end");
        lexer.analyze().unwrap();
        lexer.load_text("x");
        lexer.analyze().unwrap();
        assert_eq!(values(&lexer), vec!["x"], "Second run should not keep old tokens");
        assert_eq!(lexer.tables().words().len(), 0);
    }

    #[test]
    fn test_missing_file_is_reported_by_load() {
        let mut lexer = LexicalAnalyzer::new();
        assert!(!lexer.load_file("/definitely/not/here.dsl"));
    }
}
