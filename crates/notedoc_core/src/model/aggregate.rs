//! Note aggregate: everything needed to render one session note.
//!
//! # Responsibility
//! - Hold the note row plus its resolved client, symptoms, referrals,
//!   collateral contacts and the assessment option lookup table.
//!
//! # Invariants
//! - `note` is always present; a missing note row never becomes an aggregate.
//! - `client` is `None` when the reference is null or dangling.
//! - Item lists may be empty but are never absent.
//! - Timestamps are kept as the raw stored text; formatting happens at render.

use serde::{Deserialize, Serialize};

/// Primary key of a row in `notes`.
pub type NoteId = i64;

/// Primary key of a row in `assessment_options`.
pub type OptionId = i64;

/// A coded selection plus the clinician's free-text remark about it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChoice {
    /// Reference into `NoteAggregate::assessment_options`.
    pub option_id: Option<OptionId>,
    pub notes: Option<String>,
}

impl OptionChoice {
    pub fn new(option_id: Option<OptionId>, notes: Option<String>) -> Self {
        Self { option_id, notes }
    }
}

/// One row of `notes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNote {
    pub id: NoteId,
    pub client_id: Option<i64>,
    pub appt_date_time: Option<String>,
    pub virtual_appt: bool,
    pub session_number: Option<i64>,
    pub session_length: Option<String>,
    pub diagnosis: Option<String>,
    /// Free-text appointment note shown under Session Information.
    pub appt_note: Option<String>,
    pub narrative: Option<String>,
    pub appearance: OptionChoice,
    pub speech: OptionChoice,
    pub affect: OptionChoice,
    pub eye_contact: OptionChoice,
    pub next_appt: OptionChoice,
    /// Set once the clinician certifies the note.
    pub certified: Option<String>,
    pub insert_date: Option<String>,
    pub update_date: Option<String>,
}

impl SessionNote {
    /// Creates an otherwise empty note with the given id.
    pub fn new(id: NoteId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// The subset of `clients` the export shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub client_code: Option<String>,
    pub date_of_birth: Option<String>,
}

impl Client {
    /// `first last`, trimmed, or `None` when both parts are blank.
    pub fn display_name(&self) -> Option<String> {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        let joined = format!("{first} {last}");
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// A presenting symptom resolved from the lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    pub name: String,
    pub description: Option<String>,
}

/// A referral or collateral contact: a resolved option plus a per-note remark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedOption {
    pub name: Option<String>,
    pub description: Option<String>,
    pub note: Option<String>,
}

/// One row of `assessment_options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOption {
    pub id: OptionId,
    /// Option category, e.g. `appearance` or `next_appt`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: Option<String>,
}

/// Fully resolved input for one rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAggregate {
    pub note: SessionNote,
    pub client: Option<Client>,
    pub symptoms: Vec<Symptom>,
    pub referrals: Vec<LinkedOption>,
    pub collateral_contacts: Vec<LinkedOption>,
    pub assessment_options: Vec<AssessmentOption>,
}

impl NoteAggregate {
    /// Creates an aggregate with no client and empty related lists.
    pub fn new(note: SessionNote) -> Self {
        Self {
            note,
            client: None,
            symptoms: Vec::new(),
            referrals: Vec::new(),
            collateral_contacts: Vec::new(),
            assessment_options: Vec::new(),
        }
    }

    /// Client display name, or `Unknown` when unresolved or unnamed.
    pub fn client_name(&self) -> String {
        self.client
            .as_ref()
            .and_then(Client::display_name)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}
