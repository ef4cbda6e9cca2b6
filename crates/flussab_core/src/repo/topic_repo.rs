//! Topic repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide load-all/insert/update/append APIs over the `topics` table.
//! - Keep SQL and JSON encoding of detail lists inside the persistence
//!   boundary.
//!
//! # Invariants
//! - Write paths must call `Topic::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Multi-statement writes (`insert` of an expanded record, `set_expanded`,
//!   `append_detail`) run in one immediate transaction, so they either apply
//!   fully or not at all and concurrent appends are not lost.
//! - At most one stored record has `expanded = 1` after any write through
//!   this repository.

use crate::db::DbError;
use crate::model::topic::{Topic, TopicId, TopicValidationError};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

const TOPIC_SELECT_SQL: &str = "SELECT
    id,
    name,
    details,
    expanded
FROM topics";

const REQUIRED_COLUMNS: [&str; 4] = ["id", "name", "details", "expanded"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for topic persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TopicValidationError),
    Db(DbError),
    NotFound(TopicId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "topic not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted topic data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TopicValidationError> for RepoError {
    fn from(value: TopicValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable record store for topics, keyed by `Topic::id`.
pub trait TopicRepository {
    /// Loads every record, newest (highest id) first.
    fn load_all(&self) -> RepoResult<Vec<Topic>>;
    /// Inserts a new record and returns its id.
    ///
    /// An expanded record collapses every other record in the same write.
    fn insert(&self, topic: &Topic) -> RepoResult<TopicId>;
    /// Replaces the full record with the same id.
    fn update(&self, topic: &Topic) -> RepoResult<()>;
    /// Makes `active` the only expanded record; `None` collapses all.
    fn set_expanded(&self, active: Option<TopicId>) -> RepoResult<()>;
    /// Appends one detail line to the stored record atomically.
    fn append_detail(&self, id: TopicId, text: &str) -> RepoResult<()>;
    /// Gets one record by id.
    fn get(&self, id: TopicId) -> RepoResult<Option<Topic>>;
}

/// SQLite-backed topic repository.
///
/// Holds the connection in a `RefCell` so multi-statement writes can open an
/// immediate transaction behind a shared-reference API.
pub struct SqliteTopicRepository<'conn> {
    conn: RefCell<&'conn mut Connection>,
}

impl<'conn> SqliteTopicRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_topic_connection_ready(conn)?;
        Ok(Self {
            conn: RefCell::new(conn),
        })
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn load_all(&self) -> RepoResult<Vec<Topic>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!("{TOPIC_SELECT_SQL} ORDER BY id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        debug!(
            "event=topics_load module=repo status=ok topic_count={}",
            topics.len()
        );
        Ok(topics)
    }

    fn insert(&self, topic: &Topic) -> RepoResult<TopicId> {
        topic.validate()?;
        let details = encode_details(&topic.details)?;

        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if topic.expanded {
            tx.execute("UPDATE topics SET expanded = 0 WHERE expanded = 1;", [])?;
        }
        tx.execute(
            "INSERT INTO topics (id, name, details, expanded) VALUES (?1, ?2, ?3, ?4);",
            params![
                topic.id,
                topic.name.as_str(),
                details,
                bool_to_int(topic.expanded)
            ],
        )
        .map_err(|err| {
            error!(
                "event=topic_insert module=repo status=error topic_id={} error={}",
                topic.id, err
            );
            err
        })?;
        tx.commit()?;

        Ok(topic.id)
    }

    fn update(&self, topic: &Topic) -> RepoResult<()> {
        topic.validate()?;
        let details = encode_details(&topic.details)?;

        let conn = self.conn.borrow();
        let changed = conn.execute(
            "UPDATE topics
             SET
                name = ?2,
                details = ?3,
                expanded = ?4
             WHERE id = ?1;",
            params![
                topic.id,
                topic.name.as_str(),
                details,
                bool_to_int(topic.expanded)
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(topic.id));
        }

        Ok(())
    }

    fn set_expanded(&self, active: Option<TopicId>) -> RepoResult<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(id) = active {
            let exists: i64 = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM topics WHERE id = ?1);",
                [id],
                |row| row.get(0),
            )?;
            if exists != 1 {
                return Err(RepoError::NotFound(id));
            }
        }

        // `id = NULL` is never true, so `None` collapses every row.
        tx.execute(
            "UPDATE topics
             SET expanded = CASE WHEN id = ?1 THEN 1 ELSE 0 END
             WHERE expanded != (CASE WHEN id = ?1 THEN 1 ELSE 0 END);",
            params![active],
        )?;
        tx.commit()?;

        debug!(
            "event=topic_expand module=repo status=ok active_id={}",
            active.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        Ok(())
    }

    fn append_detail(&self, id: TopicId, text: &str) -> RepoResult<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stored: Option<String> = tx
            .query_row(
                "SELECT details FROM topics WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(stored) = stored else {
            return Err(RepoError::NotFound(id));
        };

        let mut details = decode_details(id, &stored)?;
        details.push(text.to_string());
        tx.execute(
            "UPDATE topics SET details = ?2 WHERE id = ?1;",
            params![id, encode_details(&details)?],
        )?;
        tx.commit()?;

        debug!(
            "event=detail_append module=repo status=ok topic_id={} detail_count={}",
            id,
            details.len()
        );
        Ok(())
    }

    fn get(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!("{TOPIC_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }
        Ok(None)
    }
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    let id: TopicId = row.get("id")?;
    let details_text: String = row.get("details")?;
    let details = decode_details(id, &details_text)?;

    let expanded = match row.get::<_, i64>("expanded")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid expanded value `{other}` in topics.expanded for id {id}"
            )));
        }
    };

    let topic = Topic {
        id,
        name: row.get("name")?,
        details,
        expanded,
    };
    topic
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(topic)
}

fn encode_details(details: &[String]) -> RepoResult<String> {
    serde_json::to_string(details)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode details: {err}")))
}

fn decode_details(id: TopicId, value: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(value).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid details json in topics.details for id {id}: {err}"
        ))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_topic_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "topics")? {
        return Err(RepoError::MissingRequiredTable("topics"));
    }
    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "topics", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "topics",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
