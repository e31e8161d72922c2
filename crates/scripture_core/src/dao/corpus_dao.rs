//! Parameterized corpus reads and upsert writes.
//!
//! # Invariants
//! - `list_books` matches `translation_short_name` by case-sensitive equality.
//! - `list_verses` does not filter by translation; book ids are globally
//!   unique (enforced at import).
//! - `search_verses` is a case-sensitive substring match capped at
//!   [`SEARCH_RESULT_LIMIT`] rows in storage order.

use super::entities::{BookEntity, TranslationEntity, VerseEntity};
use crate::db::DbResult;
use crate::model::corpus::BookId;
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

/// Maximum number of verses returned by [`search_verses`].
pub const SEARCH_RESULT_LIMIT: u32 = 100;

const TRANSLATION_SELECT_SQL: &str = "SELECT short_name, name, language, size FROM translations";

const BOOK_SELECT_SQL: &str =
    "SELECT id, name, short_name, translation_short_name FROM books";

const VERSE_SELECT_SQL: &str =
    "SELECT id, book_id, chapter, verse, text, translation_short_name FROM verses";

/// Lists every stored translation.
pub fn list_translations(conn: &Connection) -> DbResult<Vec<TranslationEntity>> {
    query_rows(
        conn,
        TRANSLATION_SELECT_SQL,
        params![],
        TranslationEntity::from_row,
    )
}

/// Lists books owned by `translation_code`. Unknown codes yield an empty list.
pub fn list_books(conn: &Connection, translation_code: &str) -> DbResult<Vec<BookEntity>> {
    query_rows(
        conn,
        &format!("{BOOK_SELECT_SQL} WHERE translation_short_name = ?1"),
        [translation_code],
        BookEntity::from_row,
    )
}

/// Lists verses of one chapter of one book.
pub fn list_verses(conn: &Connection, book_id: BookId, chapter: u32) -> DbResult<Vec<VerseEntity>> {
    query_rows(
        conn,
        &format!("{VERSE_SELECT_SQL} WHERE book_id = ?1 AND chapter = ?2"),
        params![book_id, chapter],
        VerseEntity::from_row,
    )
}

/// Finds verses whose text contains `query_text`.
///
/// An empty query matches every verse, so the cap still applies.
pub fn search_verses(conn: &Connection, query_text: &str) -> DbResult<Vec<VerseEntity>> {
    // `LIKE` folds ASCII case; `instr` keeps the match case-sensitive.
    query_rows(
        conn,
        &format!("{VERSE_SELECT_SQL} WHERE instr(text, ?1) > 0 LIMIT ?2"),
        params![query_text, SEARCH_RESULT_LIMIT],
        VerseEntity::from_row,
    )
}

/// Returns the translation owning `book_id`, if the book exists.
pub fn book_owner(conn: &Connection, book_id: BookId) -> DbResult<Option<String>> {
    let owner = conn
        .query_row(
            "SELECT translation_short_name FROM books WHERE id = ?1",
            [book_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(owner)
}

/// Inserts a translation or fully replaces the row with the same short name.
pub fn upsert_translation(conn: &Connection, row: &TranslationEntity) -> DbResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO translations (short_name, name, language, size)
         VALUES (?1, ?2, ?3, ?4);",
        params![row.short_name, row.name, row.language, row.size],
    )?;
    Ok(())
}

/// Inserts books or fully replaces rows with the same id.
///
/// Not atomic on its own; wrap in a transaction for all-or-nothing imports.
pub fn upsert_books(conn: &Connection, rows: &[BookEntity]) -> DbResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR REPLACE INTO books (id, name, short_name, translation_short_name)
         VALUES (?1, ?2, ?3, ?4);",
    )?;
    for row in rows {
        stmt.execute(params![
            row.id,
            row.name,
            row.short_name,
            row.translation_short_name
        ])?;
    }
    Ok(())
}

/// Inserts verses or overwrites the text of rows at the same location.
///
/// An existing row keeps its id, so re-upserting never moves a verse within
/// storage order. Not atomic on its own; wrap in a transaction for
/// all-or-nothing imports.
pub fn upsert_verses(conn: &Connection, rows: &[VerseEntity]) -> DbResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO verses (id, book_id, chapter, verse, text, translation_short_name)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (book_id, chapter, verse, translation_short_name)
         DO UPDATE SET text = excluded.text;",
    )?;
    for row in rows {
        stmt.execute(params![
            row.id,
            row.book_id,
            row.chapter,
            row.verse,
            row.text,
            row.translation_short_name
        ])?;
    }
    Ok(())
}

fn query_rows<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    parse: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> DbResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();

    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }

    Ok(items)
}
