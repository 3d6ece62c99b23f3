use chrono::NaiveDate;
use std::time::Duration;
use tempfile::TempDir;
use todo::reminder::{poll_once, PollerState, ReminderPoller, ReminderQueue};
use todo::{Database, TaskDraft, TaskStatus};
use tokio_util::sync::CancellationToken;

fn new_year() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

#[test]
fn each_cycle_enqueues_again() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("to-do.db");
    let db = Database::open(&path).unwrap();
    let id = db
        .create_task(&TaskDraft::new("Pay rent").deadline("2024-01-01").reminder(true))
        .unwrap();

    let (sender, mut queue) = ReminderQueue::unbounded();
    assert_eq!(poll_once(&path, new_year(), &sender).unwrap(), 1);
    assert_eq!(poll_once(&path, new_year(), &sender).unwrap(), 1);

    let titles: Vec<String> = queue.drain().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["Pay rent", "Pay rent"]);

    db.set_status(id, TaskStatus::Completed).unwrap();
    assert_eq!(poll_once(&path, new_year(), &sender).unwrap(), 0);
    assert!(queue.drain().is_empty());
}

#[test]
fn nothing_is_enqueued_on_other_days() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("to-do.db");
    let db = Database::open(&path).unwrap();
    db.create_task(&TaskDraft::new("Pay rent").deadline("2024-01-01").reminder(true))
        .unwrap();

    let (sender, mut queue) = ReminderQueue::unbounded();
    let jan_2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    assert_eq!(poll_once(&path, jan_2, &sender).unwrap(), 0);
    assert!(queue.drain().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn running_poller_delivers_and_stops_promptly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("to-do.db");
    let db = Database::open(&path).unwrap();
    db.create_task(&TaskDraft::new("Pay rent").deadline("2024-01-01").reminder(true))
        .unwrap();

    let (sender, mut queue) = ReminderQueue::unbounded();
    let handle = ReminderPoller::new(&path, sender, CancellationToken::new())
        .with_interval(Duration::from_secs(3600))
        .with_clock(new_year)
        .spawn(&tokio::runtime::Handle::current());

    // First check runs immediately
    let mut received = Vec::new();
    for _ in 0..100 {
        received.extend(queue.drain());
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].title, "Pay rent");
    assert_eq!(handle.state(), PollerState::Running);

    // Well inside the hour-long interval
    handle.stop();
    for _ in 0..100 {
        if handle.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(handle.is_finished());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_cycles_do_not_stop_the_poller() {
    let dir = TempDir::new().unwrap();
    // A directory cannot be opened as a database file
    let path = dir.path().to_path_buf();

    let (sender, mut queue) = ReminderQueue::unbounded();
    let handle = ReminderPoller::new(&path, sender, CancellationToken::new())
        .with_interval(Duration::from_millis(20))
        .with_clock(new_year)
        .spawn(&tokio::runtime::Handle::current());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(handle.state(), PollerState::Running);
    assert!(queue.drain().is_empty());

    handle.stop();
    for _ in 0..100 {
        if handle.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(handle.is_finished());
}
