use scripture_core::db::open_db_in_memory;
use scripture_core::{
    BibleRepository, CorpusDocument, ImportError, ImportSummary, RepoError, SqliteBibleRepository,
};

const KJV_DOCUMENT: &str = r#"{
    "translation": {"short_name": "kjv", "name": "King James Version", "language": "en", "size": 1000},
    "books": [
        {"id": 1, "name": "Genesis", "short_name": "Gen"},
        {"id": 2, "name": "Exodus", "short_name": "Exo"}
    ],
    "verses": [
        {"book_id": 1, "chapter": 1, "verse": 1, "text": "In the beginning God created the heaven and the earth."},
        {"book_id": 1, "chapter": 1, "verse": 2, "text": "And the earth was without form, and void."},
        {"book_id": 2, "chapter": 1, "verse": 1, "text": "Now these are the names of the children of Israel."}
    ]
}"#;

fn repo() -> SqliteBibleRepository {
    SqliteBibleRepository::new(open_db_in_memory().unwrap())
}

#[test]
fn import_writes_translation_books_and_verses() {
    let repo = repo();
    let document = CorpusDocument::from_json(KJV_DOCUMENT).unwrap();

    let summary = repo.import_corpus(&document).unwrap();
    assert_eq!(summary, ImportSummary { books: 2, verses: 3 });

    let translations = repo.list_translations().unwrap();
    assert_eq!(translations, vec![document.translation.clone()]);
    assert_eq!(repo.list_books("kjv").unwrap(), document.books);
    assert_eq!(repo.list_verses(1, 1).unwrap().len(), 2);
    assert_eq!(repo.search_verses("Israel").unwrap().len(), 1);
}

#[test]
fn reimporting_same_document_leaves_results_unchanged() {
    let repo = repo();
    let document = CorpusDocument::from_json(KJV_DOCUMENT).unwrap();

    repo.import_corpus(&document).unwrap();
    repo.import_corpus(&document).unwrap();

    assert_eq!(repo.list_translations().unwrap().len(), 1);
    assert_eq!(repo.list_books("kjv").unwrap().len(), 2);
    assert_eq!(repo.list_verses(1, 1).unwrap().len(), 2);
    assert_eq!(repo.search_verses("").unwrap().len(), 3);
}

#[test]
fn book_id_owned_by_another_translation_is_rejected_atomically() {
    let repo = repo();
    repo.import_corpus(&CorpusDocument::from_json(KJV_DOCUMENT).unwrap())
        .unwrap();

    let mut web = CorpusDocument::from_json(KJV_DOCUMENT).unwrap();
    web.translation.short_name = "web".to_string();
    web.translation.name = "World English Bible".to_string();

    let err = repo.import_corpus(&web).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Import(ImportError::BookIdConflict { book_id: 1, ref owner }) if owner == "kjv"
    ));

    assert_eq!(repo.list_translations().unwrap().len(), 1);
    assert!(repo.list_books("web").unwrap().is_empty());
    assert_eq!(repo.list_books("kjv").unwrap().len(), 2);
}

#[test]
fn verse_referencing_undeclared_book_is_rejected() {
    let repo = repo();
    let mut document = CorpusDocument::from_json(KJV_DOCUMENT).unwrap();
    document.verses[0].book_id = 99;

    let err = repo.import_corpus(&document).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Import(ImportError::UnknownBook { book_id: 99 })
    ));
    assert!(repo.list_translations().unwrap().is_empty());
}

#[test]
fn blank_translation_code_is_rejected() {
    let repo = repo();
    let mut document = CorpusDocument::from_json(KJV_DOCUMENT).unwrap();
    document.translation.short_name = "  ".to_string();

    let err = repo.import_corpus(&document).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Import(ImportError::MissingTranslation)
    ));
}

#[test]
fn padded_translation_code_is_rejected_with_its_own_error() {
    let repo = repo();
    let mut document = CorpusDocument::from_json(KJV_DOCUMENT).unwrap();
    document.translation.short_name = " kjv ".to_string();

    let err = repo.import_corpus(&document).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Import(ImportError::PaddedTranslationCode { ref short_name }) if short_name == " kjv "
    ));
    assert!(err.to_string().contains("surrounding whitespace"));
    assert!(repo.list_translations().unwrap().is_empty());
}

#[test]
fn malformed_json_reports_parse_error() {
    let err = CorpusDocument::from_json("{\"translation\": 42}").unwrap_err();
    assert!(matches!(err, ImportError::Parse(_)));
    assert!(err.to_string().starts_with("invalid corpus document"));
}

#[test]
fn document_without_books_or_verses_imports_translation_only() {
    let repo = repo();
    let document = CorpusDocument::from_json(
        r#"{"translation": {"short_name": "bbe", "name": "Basic English", "language": "en", "size": 10}}"#,
    )
    .unwrap();

    let summary = repo.import_corpus(&document).unwrap();
    assert_eq!(summary, ImportSummary { books: 0, verses: 0 });
    assert_eq!(repo.list_translations().unwrap()[0].short_name, "bbe");
}
