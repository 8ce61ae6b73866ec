//! Note renderer: one aggregate in, one document model out.
//!
//! # Responsibility
//! - Walk the fixed section order and apply each section's inclusion rule.
//! - Resolve option references and client names into display text.
//!
//! # Invariants
//! - Sections are visited once, in [`SECTION_PLAN`] order, never revisited.
//! - Rendering never fails; unresolved data renders as placeholders.
//! - The aggregate is only read.

use crate::format::{format_date, format_date_time, has_text};
use crate::model::aggregate::{AssessmentOption, LinkedOption, NoteAggregate, OptionId};
use crate::model::document::DocumentModel;
use crate::palette::Palette;
use crate::render::builder::{AssessmentItem, DocumentBuilder, ListItem};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const DOCUMENT_TITLE: &str = "THERAPY PROGRESS NOTE";

static BLANK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("valid blank line regex"));

/// Independently includable region of a rendered note, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Title,
    ClientInformation,
    SessionInformation,
    SessionNarrative,
    PresentingSymptoms,
    MentalStatusAssessment,
    CollateralContacts,
    ReferralsMade,
    FollowUp,
    Footer,
}

impl Section {
    /// Heading text, or `None` for the untitled title and footer regions.
    pub fn heading(self) -> Option<&'static str> {
        match self {
            Self::Title | Self::Footer => None,
            Self::ClientInformation => Some("Client Information"),
            Self::SessionInformation => Some("Session Information"),
            Self::SessionNarrative => Some("Session Narrative"),
            Self::PresentingSymptoms => Some("Presenting Symptoms"),
            Self::MentalStatusAssessment => Some("Mental Status Assessment"),
            Self::CollateralContacts => Some("Collateral Contacts"),
            Self::ReferralsMade => Some("Referrals Made"),
            Self::FollowUp => Some("Follow-Up"),
        }
    }

    fn title(self) -> &'static str {
        self.heading().unwrap_or_default()
    }
}

/// Option id to name mapping, built once per rendered note.
pub struct OptionLookup<'a> {
    names: HashMap<OptionId, &'a str>,
}

impl<'a> OptionLookup<'a> {
    pub fn new(options: &'a [AssessmentOption]) -> Self {
        let mut names = HashMap::with_capacity(options.len());
        for option in options {
            // First occurrence wins for duplicated ids.
            names.entry(option.id).or_insert(option.name.as_str());
        }
        Self { names }
    }

    /// Name for `id`; `None` when the id is null or unknown.
    pub fn resolve(&self, id: Option<OptionId>) -> Option<&'a str> {
        id.and_then(|id| self.names.get(&id).copied())
    }
}

struct RenderContext<'a> {
    aggregate: &'a NoteAggregate,
    options: OptionLookup<'a>,
    palette: &'a Palette,
}

struct SectionStep {
    section: Section,
    include: fn(&NoteAggregate) -> bool,
    render: fn(&mut DocumentBuilder<'_>, &RenderContext<'_>),
}

const SECTION_PLAN: [SectionStep; 10] = [
    SectionStep {
        section: Section::Title,
        include: always,
        render: render_title,
    },
    SectionStep {
        section: Section::ClientInformation,
        include: always,
        render: render_client,
    },
    SectionStep {
        section: Section::SessionInformation,
        include: always,
        render: render_session,
    },
    SectionStep {
        section: Section::SessionNarrative,
        include: has_narrative,
        render: render_narrative,
    },
    SectionStep {
        section: Section::PresentingSymptoms,
        include: always,
        render: render_symptoms,
    },
    SectionStep {
        section: Section::MentalStatusAssessment,
        include: always,
        render: render_mental_status,
    },
    SectionStep {
        section: Section::CollateralContacts,
        include: has_collateral_contacts,
        render: render_collateral_contacts,
    },
    SectionStep {
        section: Section::ReferralsMade,
        include: has_referrals,
        render: render_referrals,
    },
    SectionStep {
        section: Section::FollowUp,
        include: always,
        render: render_follow_up,
    },
    SectionStep {
        section: Section::Footer,
        include: always,
        render: render_footer,
    },
];

/// Sections that will appear for `aggregate`, in document order.
pub fn section_plan(aggregate: &NoteAggregate) -> Vec<Section> {
    SECTION_PLAN
        .iter()
        .filter(|step| (step.include)(aggregate))
        .map(|step| step.section)
        .collect()
}

/// Splits narrative text on blank lines into trimmed, non-empty paragraphs.
pub fn narrative_paragraphs(text: &str) -> Vec<&str> {
    BLANK_LINE_RE
        .split(text)
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}

/// Renders note aggregates with a fixed palette.
#[derive(Debug, Clone, Default)]
pub struct NoteRenderer {
    palette: Palette,
}

impl NoteRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Builds the full document for one note.
    pub fn render(&self, aggregate: &NoteAggregate) -> DocumentModel {
        let context = RenderContext {
            aggregate,
            options: OptionLookup::new(&aggregate.assessment_options),
            palette: &self.palette,
        };
        let mut builder = DocumentBuilder::new(&self.palette);
        let mut rendered = 0usize;

        for step in &SECTION_PLAN {
            if (step.include)(aggregate) {
                (step.render)(&mut builder, &context);
                rendered += 1;
            }
        }

        let model = builder.finish();
        debug!(
            "event=note_render module=render status=ok note_id={} sections={} blocks={}",
            aggregate.note.id,
            rendered,
            model.blocks.len()
        );
        model
    }
}

fn always(_: &NoteAggregate) -> bool {
    true
}

fn has_narrative(aggregate: &NoteAggregate) -> bool {
    has_text(aggregate.note.narrative.as_deref())
}

fn has_collateral_contacts(aggregate: &NoteAggregate) -> bool {
    !aggregate.collateral_contacts.is_empty()
}

fn has_referrals(aggregate: &NoteAggregate) -> bool {
    !aggregate.referrals.is_empty()
}

fn render_title(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    builder.add_title(DOCUMENT_TITLE);

    let certified = context
        .aggregate
        .note
        .certified
        .as_deref()
        .filter(|value| has_text(Some(*value)));
    match certified {
        Some(value) => builder.add_status_line(
            &format!("Certified on {}", format_date(Some(value))),
            context.palette.certified,
        ),
        None => builder.add_status_line("Not yet certified", context.palette.not_certified),
    }
}

fn render_client(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    let aggregate = context.aggregate;
    let client = aggregate.client.as_ref();
    builder.add_section_heading(Section::ClientInformation.title());
    builder.add_label_value("Client", Some(aggregate.client_name()), false);
    builder.add_label_value(
        "Client Code",
        client.and_then(|client| client.client_code.as_deref()),
        false,
    );

    let birth_date = client.and_then(|client| client.date_of_birth.as_deref());
    if has_text(birth_date) {
        builder.add_label_value("Date of Birth", Some(format_date(birth_date)), false);
    }
}

fn render_session(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    let note = &context.aggregate.note;
    builder.add_section_heading(Section::SessionInformation.title());
    builder.add_label_value(
        "Appointment Date/Time",
        Some(format_date_time(note.appt_date_time.as_deref())),
        false,
    );
    let session_type = if note.virtual_appt {
        "Virtual/Telehealth"
    } else {
        "In-Person"
    };
    builder.add_label_value("Session Type", Some(session_type), false);
    builder.add_label_value("Session Number", note.session_number, false);
    builder.add_label_value("Session Length", note.session_length.as_deref(), false);
    builder.add_label_value("Diagnosis", note.diagnosis.as_deref(), false);

    if has_text(note.appt_note.as_deref()) {
        builder.add_text_block("Appointment Notes", note.appt_note.as_deref());
    }
}

fn render_narrative(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    builder.add_section_heading(Section::SessionNarrative.title());
    let narrative = context.aggregate.note.narrative.as_deref().unwrap_or("");
    for paragraph in narrative_paragraphs(narrative) {
        builder.add_body_paragraph(paragraph);
    }
}

fn render_symptoms(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    let items: Vec<ListItem> = context
        .aggregate
        .symptoms
        .iter()
        .map(|symptom| ListItem {
            name: symptom.name.clone(),
            description: symptom.description.clone(),
            note: None,
        })
        .collect();
    builder.add_list_section(Section::PresentingSymptoms.title(), &items);
}

fn render_mental_status(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    let note = &context.aggregate.note;
    builder.add_section_heading(Section::MentalStatusAssessment.title());

    let dimensions = [
        ("Appearance", &note.appearance),
        ("Speech", &note.speech),
        ("Affect", &note.affect),
        ("Eye Contact", &note.eye_contact),
    ];
    let items: Vec<AssessmentItem> = dimensions
        .into_iter()
        .map(|(label, choice)| AssessmentItem {
            label: label.to_string(),
            value: context.options.resolve(choice.option_id).map(str::to_string),
            notes: choice.notes.clone(),
        })
        .collect();
    builder.add_assessment_table(&items);
}

fn render_collateral_contacts(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    let items = linked_items(&context.aggregate.collateral_contacts, "Contact");
    builder.add_list_section(Section::CollateralContacts.title(), &items);
}

fn render_referrals(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    let items = linked_items(&context.aggregate.referrals, "Referral");
    builder.add_list_section(Section::ReferralsMade.title(), &items);
}

fn render_follow_up(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    let next_appt = &context.aggregate.note.next_appt;
    builder.add_section_heading(Section::FollowUp.title());
    builder.add_label_value(
        "Next Appointment",
        context.options.resolve(next_appt.option_id),
        false,
    );
    if has_text(next_appt.notes.as_deref()) {
        builder.add_text_block("Follow-Up Notes", next_appt.notes.as_deref());
    }
}

fn render_footer(builder: &mut DocumentBuilder<'_>, context: &RenderContext<'_>) {
    let note = &context.aggregate.note;
    builder.add_footer(&format!(
        "Note ID: {}  |  Created: {}  |  Last Updated: {}",
        note.id,
        format_date(note.insert_date.as_deref()),
        format_date(note.update_date.as_deref())
    ));
}

fn linked_items(entries: &[LinkedOption], fallback_name: &str) -> Vec<ListItem> {
    entries
        .iter()
        .map(|entry| ListItem {
            name: entry
                .name
                .as_deref()
                .filter(|name| has_text(Some(*name)))
                .unwrap_or(fallback_name)
                .to_string(),
            description: entry.description.clone(),
            note: entry.note.clone(),
        })
        .collect()
}
