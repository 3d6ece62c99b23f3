use chrono::NaiveDate;
use tempfile::TempDir;
use todo::{Database, TaskDraft, TaskStatus};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn tasks_survive_reopening_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("to-do.db");

    let id = {
        let db = Database::open(&path).unwrap();
        db.create_task(
            &TaskDraft::new("Pay rent")
                .description("flat 3")
                .deadline("2024-01-01")
                .status(TaskStatus::InProgress)
                .reminder(true),
        )
        .unwrap()
    };

    let db = Database::open(&path).unwrap();
    let task = db.get_task(id).unwrap().unwrap();
    assert_eq!(task.title, "Pay rent");
    assert_eq!(task.description, "flat 3");
    assert_eq!(task.deadline, "2024-01-01");
    assert_eq!(task.status, TaskStatus::InProgress);
    assert!(task.reminder);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("to-do.db")).unwrap();

    let first = db.create_task(&TaskDraft::new("one")).unwrap();
    let second = db.create_task(&TaskDraft::new("two")).unwrap();
    assert!(second > first);

    assert_eq!(db.delete_task(second).unwrap(), 1);
    let third = db.create_task(&TaskDraft::new("three")).unwrap();
    assert!(third > second);
}

#[test]
fn deleted_tasks_drop_out_of_due_queries() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("to-do.db")).unwrap();
    let id = db
        .create_task(&TaskDraft::new("Pay rent").deadline("2024-01-01").reminder(true))
        .unwrap();

    assert_eq!(db.tasks_due_on(day("2024-01-01"), true).unwrap().len(), 1);
    db.delete_task(id).unwrap();
    assert!(db.tasks_due_on(day("2024-01-01"), true).unwrap().is_empty());
    assert!(db.tasks_due_on(day("2024-01-01"), false).unwrap().is_empty());
}

#[test]
fn due_queries_respect_status_and_reminder() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("to-do.db")).unwrap();
    db.create_task(&TaskDraft::new("reminded").deadline("2024-01-01").reminder(true)).unwrap();
    db.create_task(&TaskDraft::new("quiet").deadline("2024-01-01")).unwrap();
    db.create_task(
        &TaskDraft::new("done")
            .deadline("2024-01-01")
            .reminder(true)
            .status(TaskStatus::Completed),
    )
    .unwrap();
    db.create_task(&TaskDraft::new("tomorrow").deadline("2024-01-02").reminder(true)).unwrap();

    let with_reminder: Vec<String> = db
        .tasks_due_on(day("2024-01-01"), true)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(with_reminder, vec!["reminded"]);

    let all_due: Vec<String> = db
        .tasks_due_on(day("2024-01-01"), false)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(all_due, vec!["reminded", "quiet"]);
}

#[test]
fn second_connection_sees_committed_writes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("to-do.db");
    let writer = Database::open(&path).unwrap();
    let reader = Database::open(&path).unwrap();

    let id = writer.create_task(&TaskDraft::new("shared")).unwrap();
    writer.set_status(id, TaskStatus::Completed).unwrap();

    let task = reader.get_task(id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
}
