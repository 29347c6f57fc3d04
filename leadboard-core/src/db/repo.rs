//! Database repository layer
//!
//! Translates lead queries to SQL and maps rows back to [`Lead`]s.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, Row};

use crate::error::{Error, Result};
use crate::source::{Condition, LeadQuery, LeadSource};
use crate::types::{Column, DeleteOutcome, Lead, LeadId};

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
    label: String,
}

/// Stored form of a timestamp. Fixed width so text comparison is chronological.
fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp. Unparseable text is an error, not a missing value.
fn parse_timestamp(idx: usize, text: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    text.map(|t| {
        DateTime::parse_from_rfc3339(&t)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            label: format!("sqlite:{}", path.display()),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
            label: "sqlite::memory:".to_string(),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.connection()?;
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::DataSource("database connection lock poisoned".to_string()))
    }

    // ============================================
    // Lead operations
    // ============================================

    /// Insert a lead, keeping its identifier. Returns the stored identifier.
    pub fn insert_lead(&self, lead: &Lead) -> Result<LeadId> {
        let conn = self.connection()?;
        conn.execute(
            r#"
            INSERT INTO leads (id, created_at, nome, email, telefone, fat_deposito,
                               tag, id_trello, instagram, expertise, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                lead.id,
                lead.created_at.as_ref().map(timestamp_text),
                lead.name,
                lead.email,
                lead.phone,
                lead.potential,
                lead.tag,
                lead.board_card_id,
                lead.instagram,
                lead.expertise,
                lead.status,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert many leads in one transaction.
    pub fn insert_leads(&self, leads: &[Lead]) -> Result<usize> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO leads (id, created_at, nome, email, telefone, fat_deposito,
                                   tag, id_trello, instagram, expertise, status)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )?;
            for lead in leads {
                stmt.execute(params![
                    lead.id,
                    lead.created_at.as_ref().map(timestamp_text),
                    lead.name,
                    lead.email,
                    lead.phone,
                    lead.potential,
                    lead.tag,
                    lead.board_card_id,
                    lead.instagram,
                    lead.expertise,
                    lead.status,
                ])?;
            }
        }
        tx.commit()?;
        Ok(leads.len())
    }

    /// Count stored leads
    pub fn count_leads(&self) -> Result<i64> {
        let conn = self.connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM leads", [], |r| r.get(0))?;
        Ok(count)
    }

    /// Run a lead query
    pub fn select_leads(&self, query: &LeadQuery) -> Result<Vec<Lead>> {
        let columns = query.selected_columns();
        let (sql, values) = build_select(query, &columns);
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let leads = stmt
            .query_map(params_refs.as_slice(), |row| row_to_lead(row, &columns))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(leads)
    }

    /// Delete a lead by identifier
    pub fn delete_lead(&self, id: LeadId) -> Result<DeleteOutcome> {
        let conn = self.connection()?;
        let affected = conn.execute("DELETE FROM leads WHERE id = ?1", [id])?;
        Ok(if affected > 0 {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        })
    }
}

/// Build the SQL and bound values for a query. Only known column names are
/// interpolated; values are always bound.
fn build_select(query: &LeadQuery, columns: &[Column]) -> (String, Vec<String>) {
    let column_list = columns
        .iter()
        .map(Column::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("SELECT {} FROM leads WHERE 1=1", column_list);
    let mut values = Vec::new();

    for condition in &query.conditions {
        match condition {
            Condition::Eq(column, value) => {
                sql.push_str(&format!(" AND {} = ?", column));
                values.push(value.clone());
            }
            Condition::Gte(column, ts) => {
                sql.push_str(&format!(" AND {} >= ?", column));
                values.push(timestamp_text(ts));
            }
            Condition::Lte(column, ts) => {
                sql.push_str(&format!(" AND {} <= ?", column));
                values.push(timestamp_text(ts));
            }
        }
    }

    if let Some(column) = query.order_desc {
        sql.push_str(&format!(" ORDER BY {} DESC NULLS LAST, id DESC", column));
    }

    (sql, values)
}

fn row_to_lead(row: &Row<'_>, columns: &[Column]) -> rusqlite::Result<Lead> {
    let mut lead = Lead::new(0, None);
    for (idx, column) in columns.iter().enumerate() {
        match column {
            Column::Id => lead.id = row.get(idx)?,
            Column::CreatedAt => lead.created_at = parse_timestamp(idx, row.get(idx)?)?,
            Column::Name => lead.name = row.get(idx)?,
            Column::Email => lead.email = row.get(idx)?,
            Column::Phone => lead.phone = row.get(idx)?,
            Column::Potential => lead.potential = row.get(idx)?,
            Column::Tag => lead.tag = row.get(idx)?,
            Column::BoardCardId => lead.board_card_id = row.get(idx)?,
            Column::Instagram => lead.instagram = row.get(idx)?,
            Column::Expertise => lead.expertise = row.get(idx)?,
            Column::Status => lead.status = row.get(idx)?,
        }
    }
    Ok(lead)
}

#[async_trait]
impl LeadSource for Database {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn select(&self, query: &LeadQuery) -> Result<Vec<Lead>> {
        self.select_leads(query)
    }

    async fn delete(&self, id: LeadId) -> Result<DeleteOutcome> {
        self.delete_lead(id)
    }
}
