//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide batch insert, delete, count and paged query APIs over
//!   `wordle_people`.
//! - Translate a `QuerySelector` into one of the four filter shapes.
//!
//! # Invariants
//! - List queries are ordered by `id ASC` so paging is stable.
//! - Read paths reject unknown enum text instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::filter::counts::FilterCounts;
use crate::filter::state::QuerySelector;
use crate::model::person::{Color, Gender, NewPerson, Person, PersonId};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use thiserror::Error;

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    middle_name,
    last_name,
    gender,
    color
FROM wordle_people";

/// Rows per page handed to list views.
pub const PAGE_SIZE: u32 = 50;
/// Upper bound of rows a host should keep cached across pages.
pub const MAX_CACHED_ROWS: u32 = PAGE_SIZE * 5;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for people persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("person not found: {0}")]
    NotFound(PersonId),
    #[error("invalid persisted person data: {0}")]
    InvalidData(String),
    #[error("database schema version {found} is older than required {expected}")]
    SchemaNotReady { found: u32, expected: u32 },
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Window into an ordered people query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: PAGE_SIZE,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Page `index` (zero-based) of `limit` rows.
    pub fn nth(index: u64, limit: u32) -> Self {
        Self {
            limit,
            offset: index.saturating_mul(u64::from(limit)),
        }
    }
}

/// Storage contract used by the filter views and the import pipeline.
pub trait PersonRepository {
    /// Inserts all rows in one write. Returns rows inserted.
    fn insert_batch(&self, batch: &[NewPerson]) -> RepoResult<usize>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Deletes one row; `NotFound` when `id` matched nothing.
    fn delete_person(&self, id: PersonId) -> RepoResult<()>;
    /// Deletes every row. Returns rows deleted.
    fn delete_all(&self) -> RepoResult<usize>;
    fn count_all(&self) -> RepoResult<u64>;
    fn count_for(&self, selector: &QuerySelector) -> RepoResult<u64>;
    fn list_people(&self, selector: &QuerySelector, page: PageRequest) -> RepoResult<Vec<Person>>;

    /// Count for `selector` paired with the unfiltered total.
    ///
    /// The default issues two independent reads; implementations that can
    /// should read both from one snapshot so `filtered <= total` holds.
    fn count_pair(&self, selector: &QuerySelector) -> RepoResult<FilterCounts> {
        let total = self.count_all()?;
        let filtered = match selector {
            QuerySelector::Unfiltered => total,
            _ => self.count_for(selector)?,
        };
        Ok(FilterCounts { filtered, total })
    }
}

impl<R: PersonRepository + ?Sized> PersonRepository for &R {
    fn insert_batch(&self, batch: &[NewPerson]) -> RepoResult<usize> {
        (**self).insert_batch(batch)
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        (**self).get_person(id)
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        (**self).delete_person(id)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        (**self).delete_all()
    }

    fn count_all(&self) -> RepoResult<u64> {
        (**self).count_all()
    }

    fn count_for(&self, selector: &QuerySelector) -> RepoResult<u64> {
        (**self).count_for(selector)
    }

    fn list_people(&self, selector: &QuerySelector, page: PageRequest) -> RepoResult<Vec<Person>> {
        (**self).list_people(selector, page)
    }

    fn count_pair(&self, selector: &QuerySelector) -> RepoResult<FilterCounts> {
        (**self).count_pair(selector)
    }
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Wraps a connection without checking its schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking migrations have been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected = latest_version();
        if found < expected {
            return Err(RepoError::SchemaNotReady { found, expected });
        }
        Ok(Self::new(conn))
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn insert_batch(&self, batch: &[NewPerson]) -> RepoResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO wordle_people (
                    first_name,
                    middle_name,
                    last_name,
                    gender,
                    color
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for person in batch {
                stmt.execute(params![
                    person.first_name.as_str(),
                    person.middle_name.as_str(),
                    person.last_name.as_str(),
                    person.gender.as_str(),
                    person.color.as_str(),
                ])?;
            }
        }
        tx.commit()?;

        debug!(
            "event=people_insert module=repo status=ok rows={}",
            batch.len()
        );
        Ok(batch.len())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }
        Ok(None)
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM wordle_people WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let deleted = self.conn.execute("DELETE FROM wordle_people;", [])?;
        debug!("event=people_clear module=repo status=ok rows={deleted}");
        Ok(deleted)
    }

    fn count_all(&self) -> RepoResult<u64> {
        self.count_for(&QuerySelector::Unfiltered)
    }

    fn count_for(&self, selector: &QuerySelector) -> RepoResult<u64> {
        count_rows(self.conn, selector)
    }

    fn count_pair(&self, selector: &QuerySelector) -> RepoResult<FilterCounts> {
        // Both reads share one transaction so a concurrent writer cannot
        // land between them.
        let tx = self.conn.unchecked_transaction()?;
        let total = count_rows(&tx, &QuerySelector::Unfiltered)?;
        let filtered = match selector {
            QuerySelector::Unfiltered => total,
            _ => count_rows(&tx, selector)?,
        };
        tx.commit()?;
        Ok(FilterCounts { filtered, total })
    }

    fn list_people(&self, selector: &QuerySelector, page: PageRequest) -> RepoResult<Vec<Person>> {
        let (where_sql, mut bind_values) = selector_where_clause(selector);
        let sql = format!("{PERSON_SELECT_SQL}{where_sql} ORDER BY id ASC LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(page.limit)));
        bind_values.push(Value::Integer(
            i64::try_from(page.offset).unwrap_or(i64::MAX),
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }
        Ok(people)
    }
}

/// Builds the `WHERE` clause and bind values for one selector variant.
///
/// Returns an empty clause for `Unfiltered`.
fn count_rows(conn: &Connection, selector: &QuerySelector) -> RepoResult<u64> {
    let (where_sql, bind_values) = selector_where_clause(selector);
    let sql = format!("SELECT COUNT(*) FROM wordle_people{where_sql};");
    let count: i64 = conn.query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
}

fn selector_where_clause(selector: &QuerySelector) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut bind_values = Vec::new();

    if let Some(genders) = selector.genders() {
        clauses.push(format!("gender IN ({})", placeholders(genders.len())));
        bind_values.extend(
            genders
                .iter()
                .map(|gender| Value::Text(gender.as_str().to_string())),
        );
    }
    if let Some(colors) = selector.colors() {
        clauses.push(format!("color IN ({})", placeholders(colors.len())));
        bind_values.extend(
            colors
                .iter()
                .map(|color| Value::Text(color.as_str().to_string())),
        );
    }

    if clauses.is_empty() {
        (String::new(), bind_values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), bind_values)
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let gender_text: String = row.get("gender")?;
    let gender: Gender = gender_text.parse().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid gender `{gender_text}` in wordle_people.gender"
        ))
    })?;

    let color_text: String = row.get("color")?;
    let color: Color = color_text.parse().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid color `{color_text}` in wordle_people.color"
        ))
    })?;

    Ok(Person {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        middle_name: row.get("middle_name")?,
        last_name: row.get("last_name")?,
        gender,
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::{placeholders, selector_where_clause, PageRequest};
    use crate::filter::state::QuerySelector;
    use crate::model::person::{Color, Gender};
    use rusqlite::types::Value;

    #[test]
    fn unfiltered_selector_has_no_where_clause() {
        let (sql, binds) = selector_where_clause(&QuerySelector::Unfiltered);
        assert!(sql.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn combined_selector_binds_genders_before_colors() {
        let selector = QuerySelector::ByGenderAndColor {
            genders: [Gender::West, Gender::North].into_iter().collect(),
            colors: [Color::Blue].into_iter().collect(),
        };
        let (sql, binds) = selector_where_clause(&selector);

        assert_eq!(sql, " WHERE gender IN (?, ?) AND color IN (?)");
        assert_eq!(
            binds,
            vec![
                Value::Text("North".to_string()),
                Value::Text("West".to_string()),
                Value::Text("Blue".to_string()),
            ]
        );
    }

    #[test]
    fn placeholders_and_page_offsets() {
        assert_eq!(placeholders(3), "?, ?, ?");
        assert_eq!(PageRequest::nth(2, 50).offset, 100);
        assert_eq!(PageRequest::default().limit, 50);
    }
}
