use std::sync::Arc;

use actix_web::{test, web, App};
use serde_json::json;
use tempfile::TempDir;

use taskpad::app_state::AppState;
use taskpad::config::Config;
use taskpad::models::{DeleteResponse, HealthcheckResponse, Task};
use taskpad::routes;
use taskpad::task_db::TaskDb;

fn state(dir: &TempDir) -> AppState {
    let path = dir.path().join("tasks.db");
    AppState {
        db: Arc::new(TaskDb::open(&path).unwrap()),
        config: Config {
            server_port: 0,
            database_path: path.to_string_lossy().into_owned(),
            frontend_origin: "http://localhost:3000".to_string(),
        },
    }
}

macro_rules! test_app {
    ($dir:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state($dir)))
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn healthcheck_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(&dir);

    let req = test::TestRequest::get().uri("/healthcheck").to_request();
    let body: HealthcheckResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.status, "ok");
}

#[actix_web::test]
async fn create_returns_the_persisted_row() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(&dir);

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({"title": "Buy milk"}))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;

    assert_eq!(task.title, "Buy milk");
    assert!(!task.completed);
    assert_eq!(task.description, None);
    assert_eq!(task.created_at, task.updated_at);
}

#[actix_web::test]
async fn create_with_empty_title_is_rejected_before_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(&dir);

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({"title": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::get().uri("/tasks").to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(tasks.is_empty());
}

#[actix_web::test]
async fn get_of_missing_id_answers_null_not_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(&dir);

    let req = test::TestRequest::get().uri("/tasks/12345").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = test::read_body(resp).await;
    assert_eq!(std::str::from_utf8(&body).unwrap(), "null");
}

#[actix_web::test]
async fn update_applies_present_fields_and_clears_explicit_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(&dir);

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({"title": "Original", "description": "keep or clear"}))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;

    // description omitted: stays
    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}", task.id))
        .set_json(json!({"completed": true}))
        .to_request();
    let updated: Task = test::call_and_read_body_json(&app, req).await;
    assert!(updated.completed);
    assert_eq!(updated.description.as_deref(), Some("keep or clear"));

    // description explicitly null: cleared
    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}", task.id))
        .set_json(json!({"description": null}))
        .to_request();
    let updated: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.description, None);
    assert!(updated.completed);
    assert_eq!(updated.title, "Original");
}

#[actix_web::test]
async fn update_rejects_null_or_empty_title() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(&dir);

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({"title": "Original"}))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;

    for body in [json!({"title": null}), json!({"title": ""})] {
        let req = test::TestRequest::put()
            .uri(&format!("/tasks/{}", task.id))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task.id))
        .to_request();
    let unchanged: Option<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unchanged.unwrap().title, "Original");
}

#[actix_web::test]
async fn update_of_missing_id_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(&dir);

    let req = test::TestRequest::put()
        .uri("/tasks/77")
        .set_json(json!({"completed": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn toggle_flips_completed_and_404s_on_missing_id() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(&dir);

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({"title": "flip"}))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{}/toggle", task.id))
        .to_request();
    let toggled: Task = test::call_and_read_body_json(&app, req).await;
    assert!(toggled.completed);

    let req = test::TestRequest::post().uri("/tasks/999/toggle").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn delete_succeeds_once_then_404s() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(&dir);

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({"title": "doomed"}))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", task.id))
        .to_request();
    let deleted: DeleteResponse = test::call_and_read_body_json(&app, req).await;
    assert!(deleted.success);

    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", task.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task.id))
        .to_request();
    let gone: Option<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(gone.is_none());
}
