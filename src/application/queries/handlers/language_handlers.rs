//! Language Query Handlers

use crate::application::queries::language_queries::ListLanguages;
use crate::domain::Language;

/// ListLanguages Handler - 列出启用的语言
pub struct ListLanguagesHandler {
    languages: Vec<Language>,
}

impl ListLanguagesHandler {
    pub fn new(languages: Vec<Language>) -> Self {
        Self { languages }
    }

    pub fn handle(&self, _query: ListLanguages) -> Vec<Language> {
        self.languages.clone()
    }
}
