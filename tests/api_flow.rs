//! End-to-end API behaviour through the HTTP client

mod common;

use profrate_backend::client::{ApiClient, ClientError};
use profrate_backend::models::{AverageRating, RatingLabel};

fn assert_api_error(err: ClientError, status: u16, detail: &str) {
    match err {
        ClientError::Api { status: s, detail: d } => {
            assert_eq!(s, status, "unexpected status for {:?}", d);
            assert_eq!(d, detail);
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

async fn logged_in(base_url: &str, username: &str) -> ApiClient {
    let mut client = ApiClient::new(base_url).unwrap();
    client
        .register(username, &format!("{}@uni.example", username), "password123")
        .await
        .unwrap();
    client.login(username, "password123").await.unwrap();
    client
}

#[tokio::test]
async fn test_rating_scenario() {
    let base_url = common::spawn_server(common::seeded_db()).await;
    let bob = logged_in(&base_url, "bob").await;

    let message = bob.rate(1, "CS3021", 2024, 1, 4).await.unwrap();
    assert_eq!(message, "Rating submitted successfully.");

    let err = bob.rate(1, "CS3021", 2024, 1, 5).await.unwrap_err();
    assert_api_error(err, 400, "You have already rated this professor for this module.");

    let summary = bob
        .average_rating(1, "CS3021", Some(2024), Some(1))
        .await
        .unwrap();
    assert_eq!(summary.average_rating, AverageRating::Score(4));
    assert_eq!(summary.professor_name, "Dr. A");
    assert_eq!(summary.module_name, "Compilers");
    assert_eq!(summary.year, Some(2024));

    // The other CS3021 instance has no ratings yet
    let summary = bob
        .average_rating(1, "CS3021", Some(2023), Some(2))
        .await
        .unwrap();
    assert_eq!(summary.average_rating, AverageRating::NoRatings);
}

#[tokio::test]
async fn test_rounding_across_users() {
    let base_url = common::spawn_server(common::seeded_db()).await;

    for (user, value) in [("u1", 5), ("u2", 5), ("u3", 4)] {
        let client = logged_in(&base_url, user).await;
        client.rate(1, "CS3021", 2024, 1, value).await.unwrap();
    }
    for (user, value) in [("u4", 1), ("u5", 2)] {
        let client = logged_in(&base_url, user).await;
        client.rate(2, "CS2010", 2024, 2, value).await.unwrap();
    }

    let reader = ApiClient::new(&base_url).unwrap();
    let professors = reader.list_professors().await.unwrap();

    let dr_a = professors.iter().find(|p| p.name == "Dr. A").unwrap();
    assert_eq!(dr_a.average_score, Some(5));
    assert_eq!(dr_a.label, Some(RatingLabel::Excellent));
    assert_eq!(dr_a.average_rating, "⭐⭐⭐⭐⭐ (Excellent)");
    assert_eq!(dr_a.modules.len(), 2);

    let dr_b = professors.iter().find(|p| p.name == "Dr. B").unwrap();
    assert_eq!(dr_b.average_score, Some(2));
    assert_eq!(dr_b.label, Some(RatingLabel::Bad));

    let dr_c = professors.iter().find(|p| p.name == "Dr. C").unwrap();
    assert_eq!(dr_c.average_rating, "No ratings yet");
    assert_eq!(dr_c.average_score, None);
}

#[tokio::test]
async fn test_submission_errors() {
    let base_url = common::spawn_server(common::seeded_db()).await;
    let bob = logged_in(&base_url, "bob").await;

    let err = bob.rate(99, "CS3021", 2024, 1, 3).await.unwrap_err();
    assert_api_error(err, 404, "Professor not found.");

    let err = bob.rate(1, "CS3021", 2022, 1, 3).await.unwrap_err();
    assert_api_error(err, 404, "Module not found for the specified year and semester.");

    let err = bob.rate(3, "CS3021", 2024, 1, 3).await.unwrap_err();
    assert_api_error(
        err,
        400,
        "Professor Dr. C does not teach Compilers in 2024 (Semester 1).",
    );

    let err = bob.rate(1, "CS3021", 2024, 1, 6).await.unwrap_err();
    assert_api_error(err, 400, "Rating must be between 1 and 5.");

    let err = bob.average_rating(1, "XX0000", None, None).await.unwrap_err();
    assert_api_error(err, 404, "Module not found.");

    // Reserved characters stay inside the module segment
    let err = bob.average_rating(1, "CS/3021", None, None).await.unwrap_err();
    assert_api_error(err, 404, "Module not found.");
}

#[tokio::test]
async fn test_modules_listing() {
    let base_url = common::spawn_server(common::seeded_db()).await;
    let client = ApiClient::new(&base_url).unwrap();

    let modules = client.list_modules().await.unwrap();
    assert_eq!(modules.len(), 3);

    let shared = modules
        .iter()
        .find(|m| m.code == "CS3021" && m.year == 2023)
        .unwrap();
    let names: Vec<_> = shared.professors.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Dr. A", "Dr. B"]);
}

#[tokio::test]
async fn test_auth_lifecycle() {
    let base_url = common::spawn_server(common::seeded_db()).await;
    let mut bob = logged_in(&base_url, "bob").await;
    let token = bob.token().unwrap().to_string();

    // Logging in again hands back the same token
    let mut again = ApiClient::new(&base_url).unwrap();
    assert_eq!(again.login("bob", "password123").await.unwrap(), token);

    let err = again.login("bob", "wrong-password").await.unwrap_err();
    assert_api_error(err, 401, "Unable to log in with provided credentials.");

    let err = ApiClient::new(&base_url)
        .unwrap()
        .register("bob", "", "password123")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 400, .. }));

    assert_eq!(bob.logout().await.unwrap(), "Logged out successfully");
    assert!(bob.token().is_none());

    // The shared token is gone for every client that held it
    let err = again.rate(1, "CS3021", 2024, 1, 4).await.unwrap_err();
    assert_api_error(err, 401, "Invalid token.");

    let anonymous = ApiClient::new(&base_url).unwrap();
    let err = anonymous.rate(1, "CS3021", 2024, 1, 4).await.unwrap_err();
    assert_api_error(err, 401, "Authentication credentials were not provided.");
}
