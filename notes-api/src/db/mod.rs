mod migrations;

use tokio_rusqlite::Connection;

use migrations::MIGRATIONS;

pub use rusqlite;
pub use tokio_rusqlite;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),
    #[error(transparent)]
    TokioRusqlite(tokio_rusqlite::Error),
    #[error(transparent)]
    Rusqlite(rusqlite::Error),
}

impl Error {
    pub fn not_found_message(self, message: impl Into<String>) -> Self {
        if matches!(self, Self::NotFound(_)) {
            return Self::NotFound(message.into());
        }
        self
    }
}

impl From<tokio_rusqlite::Error> for Error {
    fn from(error: tokio_rusqlite::Error) -> Self {
        match error {
            tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows) => Self::NotFound("Not found".into()),
            error => Self::TokioRusqlite(error),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Rusqlite(error)
    }
}

pub type DB = Connection;

pub async fn init_db(database_url: &str) -> Result<DB> {
    let conn = tokio_rusqlite::Connection::open(database_url).await?;

    conn.call(|conn| {
        MIGRATIONS
            .to_latest(conn)
            .map_err(|e| tokio_rusqlite::Error::Other(e.into()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(())
    })
    .await?;

    tracing::debug!("database ready at {database_url}");

    Ok(conn)
}

#[cfg(test)]
pub async fn init_test_db() -> Result<DB> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;

    conn.call(|conn| {
        MIGRATIONS
            .to_latest(conn)
            .map_err(|e| tokio_rusqlite::Error::Other(e.into()))?;

        Ok(())
    })
    .await?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_valid() {
        assert!(MIGRATIONS.validate().is_ok());
    }

    #[test]
    fn not_found_message_only_rewrites_not_found() {
        let error = Error::NotFound("Not found".into()).not_found_message("note not found");
        assert!(matches!(error, Error::NotFound(message) if message == "note not found"));

        let error = Error::Rusqlite(rusqlite::Error::InvalidQuery).not_found_message("note not found");
        assert!(matches!(error, Error::Rusqlite(_)));
    }

    #[tokio::test]
    async fn no_rows_maps_to_not_found() -> Result<()> {
        let db = init_test_db().await?;

        let error = db
            .call(|conn| {
                conn.query_row("SELECT id FROM notes WHERE id = 1", [], |row| row.get::<_, i64>(0))
                    .map_err(|e| e.into())
            })
            .await
            .map_err(Error::from)
            .unwrap_err();

        assert!(matches!(error, Error::NotFound(_)));
        Ok(())
    }
}
