use notedoc_core::db::{install_schema, open_db};
use notedoc_core::{
    DbError, DocxSerializer, ExportDriver, ExportOptions, NoteRenderer, SqliteNoteRepository,
};
use rusqlite::Connection;
use std::path::Path;

fn create_notes_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    install_schema(&conn).unwrap();
    conn.execute_batch(
        "INSERT INTO assessment_options (id, type, name) VALUES (1, 'symptom', 'Anxiety');
         INSERT INTO clients (client_id, first_name, last_name, client_code)
         VALUES (1, 'Sam', 'Lee', 'SL 7/B');
         INSERT INTO notes (note_id, client_id, appt_date_time, narrative)
         VALUES (1, 1, '2024-05-02T10:00:00', 'First session.'),
                (2, NULL, NULL, NULL);
         INSERT INTO symptoms (note_id, symptom_id) VALUES (1, 1);",
    )
    .unwrap();
}

#[test]
fn exports_one_docx_per_note() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("notes.db");
    create_notes_db(&db_path);
    let output_dir = dir.path().join("out").join("nested");

    let conn = open_db(&db_path).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let driver = ExportDriver::new(repo, NoteRenderer::default(), DocxSerializer);
    let summary = driver.run(&ExportOptions::new(&output_dir)).unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.exported.len(), 2);

    let first = &summary.exported[0];
    assert_eq!(first.note_id, 1);
    assert_eq!(
        first.path,
        output_dir.join("note_1_SL_7_B_2024-05-02.docx")
    );
    let second = &summary.exported[1];
    assert_eq!(second.path, output_dir.join("note_2_unknown_no-date.docx"));

    for exported in &summary.exported {
        let bytes = std::fs::read(&exported.path).unwrap();
        assert_eq!(bytes.len(), exported.bytes);
        assert_eq!(&bytes[..2], b"PK");
    }
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("notes.db");
    create_notes_db(&db_path);
    let output_dir = dir.path().join("out");

    let conn = open_db(&db_path).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let driver = ExportDriver::new(repo, NoteRenderer::default(), DocxSerializer);
    let mut options = ExportOptions::new(&output_dir);
    options.dry_run = true;
    let summary = driver.run(&options).unwrap();

    assert_eq!(summary.exported.len(), 2);
    assert!(summary.exported.iter().all(|note| note.bytes == 0));
    assert!(!output_dir.exists());
}

#[test]
fn missing_note_is_recorded_and_others_still_export() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("notes.db");
    create_notes_db(&db_path);
    let output_dir = dir.path().join("out");

    let conn = open_db(&db_path).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let driver = ExportDriver::new(repo, NoteRenderer::default(), DocxSerializer);
    let mut options = ExportOptions::new(&output_dir);
    options.note_ids = vec![99, 1];
    let summary = driver.run(&options).unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].note_id, 99);
    assert!(summary.failed[0].reason.contains("99"));
    assert_eq!(summary.exported.len(), 1);
    assert!(summary.exported[0].path.is_file());
}

#[test]
fn open_db_reports_missing_file_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.db");

    let err = open_db(&missing).unwrap_err();
    assert!(matches!(err, DbError::DatabaseNotFound(ref path) if path == &missing));
    assert!(!missing.exists());
}

#[test]
fn open_db_is_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("notes.db");
    create_notes_db(&db_path);

    let conn = open_db(&db_path).unwrap();
    assert!(conn.execute("DELETE FROM notes;", []).is_err());
}
