use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use sea_query::{Expr, Iden, Order, Query, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;

use crate::db::{self, DB};

use super::{NewNote, Note, NoteId};

/// Persistence backend for notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn get_all(&self) -> db::Result<Vec<Note>>;

    async fn get_note(&self, id: NoteId) -> db::Result<Option<Note>>;

    /// Persists a new note and returns it with its assigned id.
    async fn create_note(&self, note: NewNote) -> db::Result<Note>;

    /// Fails with [`db::Error::NotFound`] if no note has this id.
    async fn update_note(&self, id: NoteId, note: Note) -> db::Result<()>;

    /// Fails with [`db::Error::NotFound`] if no note has this id.
    async fn delete_note(&self, id: NoteId) -> db::Result<()>;
}

pub type Store = Arc<dyn NoteStore>;

#[derive(Iden)]
pub enum Notes {
    Table,
    Id,
    Text,
    Date,
}

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            text: row.get(1)?,
            date: row.get(2)?,
        })
    }
}

#[derive(Clone)]
pub struct SqliteNoteStore {
    db: DB,
}

impl SqliteNoteStore {
    pub fn new(db: DB) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn get_all(&self) -> db::Result<Vec<Note>> {
        self.db
            .call(|conn| {
                let (sql, values) = Query::select()
                    .columns([Notes::Id, Notes::Text, Notes::Date])
                    .from(Notes::Table)
                    .order_by(Notes::Id, Order::Asc)
                    .build_rusqlite(SqliteQueryBuilder);

                let notes = conn
                    .prepare(&sql)?
                    .query_map(&*values.as_params(), |row| Note::try_from(row))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await
            .map_err(db::Error::from)
    }

    async fn get_note(&self, id: NoteId) -> db::Result<Option<Note>> {
        self.db
            .call(move |conn| {
                let (sql, values) = Query::select()
                    .columns([Notes::Id, Notes::Text, Notes::Date])
                    .from(Notes::Table)
                    .and_where(Expr::col(Notes::Id).eq(id))
                    .build_rusqlite(SqliteQueryBuilder);

                let note = conn
                    .query_row(&sql, &*values.as_params(), |row| Note::try_from(row))
                    .optional()?;
                Ok(note)
            })
            .await
            .map_err(db::Error::from)
    }

    async fn create_note(&self, NewNote { text, date }: NewNote) -> db::Result<Note> {
        self.db
            .call(move |conn| {
                conn.query_row(
                    "INSERT INTO notes (text, date) VALUES (?, ?) RETURNING id, text, date",
                    params![text, date],
                    |row| Note::try_from(row),
                )
                .map_err(|e| e.into())
            })
            .await
            .map_err(db::Error::from)
    }

    async fn update_note(&self, id: NoteId, Note { text, date, .. }: Note) -> db::Result<()> {
        let updated = self
            .db
            .call(move |conn| {
                conn.execute("UPDATE notes SET text = ?, date = ? WHERE id = ?", params![text, date, id])
                    .map_err(|e| e.into())
            })
            .await
            .map_err(db::Error::from)?;

        match updated {
            0 => Err(db::Error::NotFound(format!("note {id} not found"))),
            _ => Ok(()),
        }
    }

    async fn delete_note(&self, id: NoteId) -> db::Result<()> {
        let deleted = self
            .db
            .call(move |conn| {
                conn.execute("DELETE FROM notes WHERE id = ?", params![id])
                    .map_err(|e| e.into())
            })
            .await
            .map_err(db::Error::from)?;

        match deleted {
            0 => Err(db::Error::NotFound(format!("note {id} not found"))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Every call fails like a lost database connection.
    pub struct FailingStore;

    fn unavailable() -> db::Error {
        db::Error::TokioRusqlite(db::tokio_rusqlite::Error::ConnectionClosed)
    }

    #[async_trait]
    impl NoteStore for FailingStore {
        async fn get_all(&self) -> db::Result<Vec<Note>> {
            Err(unavailable())
        }

        async fn get_note(&self, _id: NoteId) -> db::Result<Option<Note>> {
            Err(unavailable())
        }

        async fn create_note(&self, _note: NewNote) -> db::Result<Note> {
            Err(unavailable())
        }

        async fn update_note(&self, _id: NoteId, _note: Note) -> db::Result<()> {
            Err(unavailable())
        }

        async fn delete_note(&self, _id: NoteId) -> db::Result<()> {
            Err(unavailable())
        }
    }

    /// Reads succeed through the inner store, writes fail.
    pub struct ReadOnlyStore<S>(pub S);

    #[async_trait]
    impl<S: NoteStore> NoteStore for ReadOnlyStore<S> {
        async fn get_all(&self) -> db::Result<Vec<Note>> {
            self.0.get_all().await
        }

        async fn get_note(&self, id: NoteId) -> db::Result<Option<Note>> {
            self.0.get_note(id).await
        }

        async fn create_note(&self, _note: NewNote) -> db::Result<Note> {
            Err(unavailable())
        }

        async fn update_note(&self, _id: NoteId, _note: Note) -> db::Result<()> {
            Err(unavailable())
        }

        async fn delete_note(&self, _id: NoteId) -> db::Result<()> {
            Err(unavailable())
        }
    }

    /// Records the name of every backend call before delegating.
    pub struct RecordingStore<S> {
        inner: S,
        calls: Mutex<Vec<&'static str>>,
    }

    impl<S> RecordingStore<S> {
        pub fn new(inner: S) -> Self {
            Self {
                inner,
                calls: Mutex::new(vec![]),
            }
        }

        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl<S: NoteStore> NoteStore for RecordingStore<S> {
        async fn get_all(&self) -> db::Result<Vec<Note>> {
            self.record("get_all");
            self.inner.get_all().await
        }

        async fn get_note(&self, id: NoteId) -> db::Result<Option<Note>> {
            self.record("get_note");
            self.inner.get_note(id).await
        }

        async fn create_note(&self, note: NewNote) -> db::Result<Note> {
            self.record("create_note");
            self.inner.create_note(note).await
        }

        async fn update_note(&self, id: NoteId, note: Note) -> db::Result<()> {
            self.record("update_note");
            self.inner.update_note(id, note).await
        }

        async fn delete_note(&self, id: NoteId) -> db::Result<()> {
            self.record("delete_note");
            self.inner.delete_note(id).await
        }
    }
}
