//! Note aggregate loader over the therapy notes SQLite schema.
//!
//! # Responsibility
//! - List exportable notes in a stable order.
//! - Resolve one note's client, symptoms, referrals and collateral contacts
//!   into a [`NoteAggregate`].
//!
//! # Invariants
//! - A missing note row is `RepoError::NoteNotFound`, never a partial aggregate.
//! - A null or dangling client reference loads as `client: None`.
//! - Related rows keep insertion order.
//! - Remark columns are read under either the exporter's `*_notes` names or
//!   the desktop app's `*_comment` names. Per-row referral and contact
//!   remarks are optional and load as `None` when the column is absent.
//! - SQLite's dynamic typing is tolerated for text columns: integers and
//!   reals are stringified instead of rejected.

use crate::db::DbError;
use crate::model::aggregate::{
    AssessmentOption, Client, LinkedOption, NoteAggregate, NoteId, OptionChoice, SessionNote,
    Symptom,
};
use log::debug;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Notes columns selected as-is.
const NOTE_COLUMNS: &[&str] = &[
    "note_id",
    "client_id",
    "appt_date_time",
    "virtual_appt",
    "session_number",
    "session_length",
    "diagnosis",
    "appt_note",
    "narrative",
    "appearance",
    "speech",
    "affect",
    "eye_contact",
    "next_appt",
    "certified",
    "insert_date",
    "update_date",
];

/// Remark columns on `notes`: the exporter name first, then the name the
/// desktop app writes. Either one satisfies the schema check.
const NOTE_REMARK_COLUMNS: &[(&str, &str)] = &[
    ("appearance_notes", "appearance_comment"),
    ("speech_notes", "speech_comment"),
    ("affect_notes", "affect_comment"),
    ("eye_contact_notes", "eye_contact_comment"),
    ("next_appt_notes", "next_appt_comment"),
];

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("notes", NOTE_COLUMNS),
    (
        "clients",
        &[
            "client_id",
            "first_name",
            "last_name",
            "client_code",
            "date_of_birth",
        ],
    ),
    ("assessment_options", &["id", "type", "name", "description"]),
    ("symptoms", &["note_id", "symptom_id"]),
    ("referrals", &["note_id", "referral_id"]),
    ("collateral_contacts", &["note_id", "collateral_contact_type_id"]),
];

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NoteNotFound(NoteId),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
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
            Self::Db(err) => Some(err),
            _ => None,
        }
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

/// Read contract the export driver needs from storage.
pub trait NoteRepository {
    /// All note ids, newest appointment first.
    fn list_note_ids(&self) -> RepoResult<Vec<NoteId>>;
    /// The full assessment option lookup table.
    fn list_assessment_options(&self) -> RepoResult<Vec<AssessmentOption>>;
    /// Loads one note with its related rows and the given option table.
    fn load_aggregate(
        &self,
        note_id: NoteId,
        options: &[AssessmentOption],
    ) -> RepoResult<NoteAggregate>;
}

/// SQLite-backed aggregate loader.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
    queries: LoaderQueries,
}

/// SQL resolved against the columns the opened database actually has.
struct LoaderQueries {
    note: String,
    referrals: String,
    collateral_contacts: String,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a loader after checking that every queried column exists.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        let queries = resolve_queries(conn)?;
        Ok(Self { conn, queries })
    }

    fn load_note(&self, note_id: NoteId) -> RepoResult<SessionNote> {
        self.conn
            .query_row(&self.queries.note, [note_id], parse_note_row)
            .optional()?
            .ok_or(RepoError::NoteNotFound(note_id))
    }

    fn load_client(&self, client_id: Option<i64>) -> RepoResult<Option<Client>> {
        let Some(client_id) = client_id else {
            return Ok(None);
        };

        let client = self
            .conn
            .query_row(
                "SELECT client_id, first_name, last_name, client_code, date_of_birth
                 FROM clients
                 WHERE client_id = ?1;",
                [client_id],
                |row| {
                    Ok(Client {
                        id: row.get("client_id")?,
                        first_name: text_column(row, "first_name")?,
                        last_name: text_column(row, "last_name")?,
                        client_code: text_column(row, "client_code")?,
                        date_of_birth: text_column(row, "date_of_birth")?,
                    })
                },
            )
            .optional()?;
        Ok(client)
    }

    fn load_symptoms(&self, note_id: NoteId) -> RepoResult<Vec<Symptom>> {
        let mut stmt = self.conn.prepare(
            "SELECT ao.name, ao.description
             FROM symptoms s
             INNER JOIN assessment_options ao ON s.symptom_id = ao.id
             WHERE s.note_id = ?1
             ORDER BY s.rowid ASC;",
        )?;
        let mut rows = stmt.query([note_id])?;
        let mut symptoms = Vec::new();
        while let Some(row) = rows.next()? {
            symptoms.push(Symptom {
                name: text_column(row, "name")?.unwrap_or_default(),
                description: text_column(row, "description")?,
            });
        }
        Ok(symptoms)
    }

    fn load_linked(&self, sql: &str, note_id: NoteId) -> RepoResult<Vec<LinkedOption>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([note_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(LinkedOption {
                name: text_column(row, "name")?,
                description: text_column(row, "description")?,
                note: text_column(row, "note")?,
            });
        }
        Ok(items)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn list_note_ids(&self) -> RepoResult<Vec<NoteId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT note_id FROM notes ORDER BY appt_date_time DESC, note_id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn list_assessment_options(&self) -> RepoResult<Vec<AssessmentOption>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, name, description
             FROM assessment_options
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut options = Vec::new();
        while let Some(row) = rows.next()? {
            options.push(AssessmentOption {
                id: row.get("id")?,
                kind: text_column(row, "type")?.unwrap_or_default(),
                name: text_column(row, "name")?.unwrap_or_default(),
                description: text_column(row, "description")?,
            });
        }
        Ok(options)
    }

    fn load_aggregate(
        &self,
        note_id: NoteId,
        options: &[AssessmentOption],
    ) -> RepoResult<NoteAggregate> {
        let note = self.load_note(note_id)?;
        let client = self.load_client(note.client_id)?;
        let symptoms = self.load_symptoms(note_id)?;
        let referrals = self.load_linked(&self.queries.referrals, note_id)?;
        let collateral_contacts =
            self.load_linked(&self.queries.collateral_contacts, note_id)?;

        debug!(
            "event=aggregate_load module=repo status=ok note_id={} client_resolved={} symptoms={} referrals={} contacts={}",
            note_id,
            client.is_some(),
            symptoms.len(),
            referrals.len(),
            collateral_contacts.len()
        );

        Ok(NoteAggregate {
            note,
            client,
            symptoms,
            referrals,
            collateral_contacts,
            assessment_options: options.to_vec(),
        })
    }
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<SessionNote> {
    Ok(SessionNote {
        id: row.get("note_id")?,
        client_id: row.get("client_id")?,
        appt_date_time: text_column(row, "appt_date_time")?,
        virtual_appt: row.get::<_, Option<i64>>("virtual_appt")?.unwrap_or(0) != 0,
        session_number: row.get("session_number")?,
        session_length: text_column(row, "session_length")?,
        diagnosis: text_column(row, "diagnosis")?,
        appt_note: text_column(row, "appt_note")?,
        narrative: text_column(row, "narrative")?,
        appearance: choice_columns(row, "appearance", "appearance_notes")?,
        speech: choice_columns(row, "speech", "speech_notes")?,
        affect: choice_columns(row, "affect", "affect_notes")?,
        eye_contact: choice_columns(row, "eye_contact", "eye_contact_notes")?,
        next_appt: choice_columns(row, "next_appt", "next_appt_notes")?,
        certified: text_column(row, "certified")?,
        insert_date: text_column(row, "insert_date")?,
        update_date: text_column(row, "update_date")?,
    })
}

fn choice_columns(
    row: &Row<'_>,
    id_column: &str,
    notes_column: &str,
) -> rusqlite::Result<OptionChoice> {
    Ok(OptionChoice::new(
        row.get(id_column)?,
        text_column(row, notes_column)?,
    ))
}

fn text_column(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<String>> {
    let value = match row.get_ref(column)? {
        ValueRef::Null => None,
        ValueRef::Integer(value) => Some(value.to_string()),
        ValueRef::Real(value) => Some(value.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    };
    Ok(value)
}

fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn resolve_queries(conn: &Connection) -> RepoResult<LoaderQueries> {
    let mut selected: Vec<String> = NOTE_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .collect();
    for &(exporter_name, app_name) in NOTE_REMARK_COLUMNS {
        if table_has_column(conn, "notes", exporter_name)? {
            selected.push(exporter_name.to_string());
        } else if table_has_column(conn, "notes", app_name)? {
            selected.push(format!("{app_name} AS {exporter_name}"));
        } else {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column: exporter_name,
            });
        }
    }
    let note = format!(
        "SELECT {} FROM notes WHERE note_id = ?1;",
        selected.join(", ")
    );

    let referral_note = optional_column(conn, "referrals", "r", "referral_note")?;
    let referrals = format!(
        "SELECT ao.name, ao.description, {referral_note} AS note
         FROM referrals r
         INNER JOIN assessment_options ao ON r.referral_id = ao.id
         WHERE r.note_id = ?1
         ORDER BY r.rowid ASC;"
    );

    let contact_note =
        optional_column(conn, "collateral_contacts", "cc", "collateral_contact_note")?;
    let collateral_contacts = format!(
        "SELECT ao.name, ao.description, {contact_note} AS note
         FROM collateral_contacts cc
         INNER JOIN assessment_options ao ON cc.collateral_contact_type_id = ao.id
         WHERE cc.note_id = ?1
         ORDER BY cc.rowid ASC;"
    );

    debug!(
        "event=schema_resolve module=repo status=ok referral_notes={} contact_notes={}",
        referral_note != "NULL",
        contact_note != "NULL"
    );

    Ok(LoaderQueries {
        note,
        referrals,
        collateral_contacts,
    })
}

/// `alias.column` when `table` has it, else a `NULL` literal.
fn optional_column(
    conn: &Connection,
    table: &str,
    alias: &str,
    column: &str,
) -> RepoResult<String> {
    if table_has_column(conn, table, column)? {
        Ok(format!("{alias}.{column}"))
    } else {
        Ok("NULL".to_string())
    }
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
