//! Concurrent duplicate submissions: one winner, one stored row

use profrate_backend::auth::UserStore;
use profrate_backend::ratings::{RatingService, RatingSubmission};
use profrate_backend::{Database, ServiceError};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::NamedTempFile;

const WRITERS: usize = 8;

fn submission() -> RatingSubmission {
    RatingSubmission {
        professor_id: 1,
        module_code: "CS3021".to_string(),
        year: 2024,
        semester: 1,
        value: 4,
    }
}

/// Professor 1 teaching CS3021/2024/1, plus one user. Returns the user id.
fn prepare(db: &Database) -> String {
    let professor = db.ensure_professor("Dr. A").unwrap();
    let module = db.ensure_module("CS3021", "Compilers", 2024, 1).unwrap();
    db.assign_professor(module.id, professor.id).unwrap();

    let users = UserStore::new(db.clone(), 4);
    users.create_user("bob", "", "password123").unwrap().id.to_string()
}

fn tally(results: Vec<Result<i64, ServiceError>>) -> (usize, usize) {
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(ServiceError::Conflict(_))))
        .count();
    (successes, conflicts)
}

#[test]
fn test_threads_sharing_one_handle() {
    let db = Database::in_memory().unwrap();
    let user_id = prepare(&db);
    let service = RatingService::new(db.clone());
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let service = service.clone();
            let barrier = barrier.clone();
            let user_id = user_id.clone();
            thread::spawn(move || {
                barrier.wait();
                service.submit_rating(&user_id, &submission())
            })
        })
        .collect();

    let results = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(tally(results), (1, WRITERS - 1));
    assert_eq!(db.rating_values(1, "CS3021", None, None).unwrap(), vec![4]);
}

#[test]
fn test_separate_connections_to_one_file() {
    let file = NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let user_id = prepare(&Database::open(&path).unwrap());
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let path = path.clone();
            let barrier = barrier.clone();
            let user_id = user_id.clone();
            thread::spawn(move || {
                let service = RatingService::new(Database::open(&path).unwrap());
                barrier.wait();
                service.submit_rating(&user_id, &submission())
            })
        })
        .collect();

    let results = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(tally(results), (1, WRITERS - 1));

    let db = Database::open(&path).unwrap();
    assert_eq!(db.rating_values(1, "CS3021", None, None).unwrap(), vec![4]);
}
