//! Corpus read use cases.
//!
//! # Invariants
//! - Each use case forwards arguments and return value of exactly one
//!   repository call, unchanged.
//! - Use cases hold no state besides the shared repository handle.

use crate::model::corpus::{Book, BookId, Translation, Verse};
use crate::repo::bible_repo::{BibleRepository, RepoResult};
use std::sync::Arc;

/// Lists every available translation.
pub struct GetTranslations<R: BibleRepository> {
    repo: Arc<R>,
}

impl<R: BibleRepository> GetTranslations<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn execute(&self) -> RepoResult<Vec<Translation>> {
        self.repo.list_translations()
    }
}

/// Lists the books of one translation.
pub struct GetBooks<R: BibleRepository> {
    repo: Arc<R>,
}

impl<R: BibleRepository> GetBooks<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn execute(&self, translation_code: &str) -> RepoResult<Vec<Book>> {
        self.repo.list_books(translation_code)
    }
}

/// Lists the verses of one chapter.
pub struct GetVerses<R: BibleRepository> {
    repo: Arc<R>,
}

impl<R: BibleRepository> GetVerses<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn execute(&self, book_id: BookId, chapter: u32) -> RepoResult<Vec<Verse>> {
        self.repo.list_verses(book_id, chapter)
    }
}

/// Substring search across verse text.
pub struct SearchVerses<R: BibleRepository> {
    repo: Arc<R>,
}

impl<R: BibleRepository> SearchVerses<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn execute(&self, query_text: &str) -> RepoResult<Vec<Verse>> {
        self.repo.search_verses(query_text)
    }
}

/// The four corpus use cases built over one shared repository.
pub struct CorpusUseCases<R: BibleRepository> {
    pub get_translations: GetTranslations<R>,
    pub get_books: GetBooks<R>,
    pub get_verses: GetVerses<R>,
    pub search_verses: SearchVerses<R>,
}

impl<R: BibleRepository> CorpusUseCases<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            get_translations: GetTranslations::new(Arc::clone(&repo)),
            get_books: GetBooks::new(Arc::clone(&repo)),
            get_verses: GetVerses::new(Arc::clone(&repo)),
            search_verses: SearchVerses::new(repo),
        }
    }
}
