use notedoc_core::db::open_db_in_memory;
use notedoc_core::model::document::{Block, DocumentModel};
use notedoc_core::{
    section_plan, Client, NoteAggregate, NoteRenderer, NoteRepository, Palette, Section,
    SessionNote, SqliteNoteRepository,
};
use rusqlite::Connection;

fn seed_certified_note(conn: &Connection) -> i64 {
    conn.execute_batch(
        "INSERT INTO assessment_options (id, type, name, description) VALUES
            (1, 'appearance', 'Well-groomed', NULL),
            (2, 'speech', 'Pressured', NULL),
            (3, 'symptom', 'Insomnia', 'Difficulty falling asleep'),
            (4, 'referral', 'Psychiatry', NULL),
            (5, 'next_appt', 'Two weeks', NULL);
         INSERT INTO clients (client_id, first_name, last_name, client_code, date_of_birth)
         VALUES (10, 'Jane', 'Doe', 'JD-01', '1990-04-12');
         INSERT INTO notes (note_id, client_id, appt_date_time, virtual_appt, session_number,
                            session_length, diagnosis, narrative,
                            appearance, speech, speech_notes, next_appt, next_appt_notes,
                            certified, insert_date, update_date)
         VALUES (42, 10, '2024-03-05T14:30:00', 0, 3,
                 '50 minutes', 'F41.1', 'Client arrived on time.\n\nDiscussed sleep.',
                 1, 2, 'Fast at start', 5, 'Bring sleep log',
                 '2024-03-06T09:00:00', '2024-03-05 15:00:00', '2024-03-06 09:00:00');
         INSERT INTO symptoms (note_id, symptom_id) VALUES (42, 3);
         INSERT INTO referrals (note_id, referral_id, referral_note)
         VALUES (42, 4, 'Medication review');",
    )
    .unwrap();
    42
}

fn load(conn: &Connection, note_id: i64) -> NoteAggregate {
    let repo = SqliteNoteRepository::try_new(conn).unwrap();
    let options = repo.list_assessment_options().unwrap();
    repo.load_aggregate(note_id, &options).unwrap()
}

fn paragraph_texts(blocks: &[Block]) -> Vec<String> {
    blocks.iter().filter_map(Block::text).collect()
}

fn render_seeded() -> (NoteAggregate, DocumentModel) {
    let conn = open_db_in_memory().unwrap();
    let note_id = seed_certified_note(&conn);
    let aggregate = load(&conn, note_id);
    let model = NoteRenderer::default().render(&aggregate);
    (aggregate, model)
}

#[test]
fn certified_note_renders_sections_in_fixed_order() {
    let (aggregate, model) = render_seeded();

    assert_eq!(
        section_plan(&aggregate),
        vec![
            Section::Title,
            Section::ClientInformation,
            Section::SessionInformation,
            Section::SessionNarrative,
            Section::PresentingSymptoms,
            Section::MentalStatusAssessment,
            Section::ReferralsMade,
            Section::FollowUp,
            Section::Footer,
        ]
    );
    assert_eq!(
        model.headings(),
        vec![
            "Client Information",
            "Session Information",
            "Session Narrative",
            "Presenting Symptoms",
            "Mental Status Assessment",
            "Referrals Made",
            "Follow-Up",
        ]
    );
    assert!(model.section("Collateral Contacts").is_none());
}

#[test]
fn certified_note_has_green_status_line() {
    let (_, model) = render_seeded();
    let palette = Palette::standard();

    assert_eq!(model.blocks[0].text().as_deref(), Some("THERAPY PROGRESS NOTE"));
    let Block::Paragraph(status) = &model.blocks[1] else {
        panic!("status line should be a paragraph");
    };
    assert_eq!(status.text(), "Certified on March 06, 2024");
    assert_eq!(status.runs[0].color, Some(palette.certified));
    assert!(status.runs[0].italic);
}

#[test]
fn client_and_session_fields_render_as_labels() {
    let (_, model) = render_seeded();

    let client = paragraph_texts(model.section("Client Information").unwrap());
    assert_eq!(
        client,
        vec![
            "Client: Jane Doe",
            "Client Code: JD-01",
            "Date of Birth: April 12, 1990",
        ]
    );

    let session = paragraph_texts(model.section("Session Information").unwrap());
    assert_eq!(
        session,
        vec![
            "Appointment Date/Time: Tuesday, March 05, 2024 at 02:30 PM",
            "Session Type: In-Person",
            "Session Number: 3",
            "Session Length: 50 minutes",
            "Diagnosis: F41.1",
        ]
    );

    let narrative = paragraph_texts(model.section("Session Narrative").unwrap());
    assert_eq!(narrative, vec!["Client arrived on time.", "Discussed sleep."]);
}

#[test]
fn single_symptom_and_referral_render_one_row_tables() {
    let (_, model) = render_seeded();

    let symptoms = model.section("Presenting Symptoms").unwrap();
    let Block::Table(table) = &symptoms[0] else {
        panic!("symptoms should render as a table");
    };
    assert_eq!(table.rows.len(), 1);
    assert_eq!(
        table.rows[0].cells[0].text(),
        "Insomnia\nDifficulty falling asleep"
    );

    let referrals = model.section("Referrals Made").unwrap();
    let Block::Table(table) = &referrals[0] else {
        panic!("referrals should render as a table");
    };
    assert_eq!(table.rows.len(), 1);
    assert_eq!(
        table.rows[0].cells[0].text(),
        "Psychiatry\nNote: Medication review"
    );
}

#[test]
fn mental_status_table_resolves_options_and_placeholders() {
    let (_, model) = render_seeded();

    let blocks = model.section("Mental Status Assessment").unwrap();
    let Block::Table(table) = &blocks[0] else {
        panic!("mental status should render as a table");
    };
    let findings: Vec<(String, String)> = table
        .rows
        .iter()
        .map(|row| (row.cells[0].text(), row.cells[1].text()))
        .collect();
    assert_eq!(
        findings,
        vec![
            ("Assessment".to_string(), "Finding".to_string()),
            ("Appearance".to_string(), "Well-groomed".to_string()),
            (
                "Speech".to_string(),
                "Pressured\nNotes: Fast at start".to_string()
            ),
            ("Affect".to_string(), "Not specified".to_string()),
            ("Eye Contact".to_string(), "Not specified".to_string()),
        ]
    );
}

#[test]
fn follow_up_and_footer_close_the_document() {
    let (_, model) = render_seeded();

    let follow_up = paragraph_texts(model.section("Follow-Up").unwrap());
    assert_eq!(follow_up[0], "Next Appointment: Two weeks");
    assert_eq!(follow_up[1], "Follow-Up Notes:");
    assert_eq!(follow_up[2], "Bring sleep log");

    let last = model.blocks.last().and_then(Block::text).unwrap();
    assert_eq!(
        last,
        "Note ID: 42  |  Created: March 05, 2024  |  Last Updated: March 06, 2024"
    );
    let divider = model.blocks[model.blocks.len() - 2].text().unwrap();
    assert_eq!(divider, "\u{2500}".repeat(60));
}

#[test]
fn rendering_is_deterministic() {
    let (aggregate, first) = render_seeded();
    let second = NoteRenderer::default().render(&aggregate);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

fn texts_in(model: &DocumentModel, title: &str) -> Vec<String> {
    paragraph_texts(model.section(title).unwrap())
}

#[test]
fn empty_symptom_list_renders_placeholder_without_table() {
    let aggregate = NoteAggregate::new(SessionNote::new(1));
    let model = NoteRenderer::default().render(&aggregate);

    let blocks = model.section("Presenting Symptoms").unwrap();
    assert_eq!(blocks.len(), 1);
    assert!(!blocks.iter().any(|block| matches!(block, Block::Table(_))));
    assert_eq!(blocks[0].text().as_deref(), Some("None recorded"));
}

#[test]
fn birth_date_line_is_omitted_when_absent() {
    let mut aggregate = NoteAggregate::new(SessionNote::new(1));
    aggregate.client = Some(Client {
        first_name: Some("Ana".to_string()),
        client_code: Some("AR-2".to_string()),
        date_of_birth: Some("  ".to_string()),
        ..Client::default()
    });
    let model = NoteRenderer::default().render(&aggregate);

    assert_eq!(
        texts_in(&model, "Client Information"),
        vec!["Client: Ana", "Client Code: AR-2"]
    );
}

#[test]
fn appointment_notes_block_follows_note_text() {
    let mut aggregate = NoteAggregate::new(SessionNote::new(1));
    let model = NoteRenderer::default().render(&aggregate);
    let session = texts_in(&model, "Session Information");
    assert!(!session.iter().any(|line| line.starts_with("Appointment Notes")));

    aggregate.note.appt_note = Some("Arrived late\n\nTraffic".to_string());
    let model = NoteRenderer::default().render(&aggregate);
    let session = texts_in(&model, "Session Information");
    let start = session
        .iter()
        .position(|line| line == "Appointment Notes:")
        .unwrap();
    assert_eq!(&session[start + 1..], &["Arrived late", " ", "Traffic"]);
}

#[test]
fn follow_up_notes_block_is_omitted_when_absent() {
    let mut aggregate = NoteAggregate::new(SessionNote::new(1));
    aggregate.note.next_appt.notes = Some(String::new());
    let model = NoteRenderer::default().render(&aggregate);

    let follow_up = texts_in(&model, "Follow-Up");
    assert_eq!(follow_up[0], "Next Appointment: Not specified");
    assert!(!follow_up.iter().any(|line| line == "Follow-Up Notes:"));
}

#[test]
fn virtual_session_renders_telehealth_type() {
    let mut aggregate = NoteAggregate::new(SessionNote::new(1));
    aggregate.note.virtual_appt = true;
    let model = NoteRenderer::default().render(&aggregate);

    assert!(texts_in(&model, "Session Information")
        .iter()
        .any(|line| line == "Session Type: Virtual/Telehealth"));
}
