use crate::models::{Lexema, TokenCategory};

/// The four per-category token registries populated during lexical
/// analysis. Each table is ordered by first occurrence and duplicate-free
/// by (value, category).
#[derive(Debug, Default)]
pub struct TokenTables {
    words: Vec<Lexema>,
    ids: Vec<Lexema>,
    consts: Vec<Lexema>,
    delimiters: Vec<Lexema>,
}

impl TokenTables {
    pub fn new() -> Self {
        TokenTables::default()
    }

    /// Files `lex` into its category table unless an equal token is
    /// already present. Returns false for categories that have no table
    /// (`Nonterminal`, `Error`).
    pub fn register(&mut self, lex: &Lexema) -> bool {
        let table = match lex.category() {
            TokenCategory::Word => &mut self.words,
            TokenCategory::Id => &mut self.ids,
            TokenCategory::Const => &mut self.consts,
            TokenCategory::Delimiter => &mut self.delimiters,
            TokenCategory::Nonterminal | TokenCategory::Error => return false,
        };
        if !table.contains(lex) {
            table.push(lex.clone());
        }
        true
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.ids.clear();
        self.consts.clear();
        self.delimiters.clear();
    }

    pub fn words(&self) -> &[Lexema] {
        &self.words
    }

    pub fn ids(&self) -> &[Lexema] {
        &self.ids
    }

    pub fn consts(&self) -> &[Lexema] {
        &self.consts
    }

    pub fn delimiters(&self) -> &[Lexema] {
        &self.delimiters
    }

    pub fn len(&self) -> usize {
        self.words.len() + self.ids.len() + self.consts.len() + self.delimiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tables_are_empty() {
        let tables = TokenTables::new();
        assert!(tables.is_empty(), "New tables should have no entries");
    }

    #[test]
    fn test_register_routes_by_category() {
        let mut tables = TokenTables::new();
        tables.register(&Lexema::new("begin"));
        tables.register(&Lexema::new("x"));
        tables.register(&Lexema::new("42"));
        tables.register(&Lexema::new(";"));
        assert_eq!(tables.words().len(), 1, "Keyword should land in words");
        assert_eq!(tables.ids().len(), 1, "Identifier should land in ids");
        assert_eq!(tables.consts().len(), 1, "Constant should land in consts");
        assert_eq!(tables.delimiters().len(), 1, "Delimiter should land in delimiters");
    }

    #[test]
    fn test_register_deduplicates() {
        let mut tables = TokenTables::new();
        tables.register(&Lexema::new("x"));
        tables.register(&Lexema::new("x"));
        assert_eq!(tables.ids().len(), 1, "Duplicate id should be filed once");
    }

    #[test]
    fn test_register_rejects_untabled_categories() {
        let mut tables = TokenTables::new();
        let nt = Lexema::with_category("E", TokenCategory::Nonterminal);
        assert!(!tables.register(&nt), "Nonterminals have no table");
        assert!(tables.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut tables = TokenTables::new();
        tables.register(&Lexema::new("x"));
        tables.clear();
        assert!(tables.is_empty(), "Clear should empty every table");
    }
}
