use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::{error, info};

use crate::app_state::AppState;
use crate::models::{CreateTaskRequest, DeleteResponse, HealthcheckResponse, UpdateTaskRequest};
use crate::task_db::DbError;

/// Static status payload, no side effects.
pub async fn healthcheck() -> impl Responder {
    HttpResponse::Ok().json(HealthcheckResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}

/// CREATE a new task
pub async fn create_task(
    data: web::Data<AppState>,
    payload: web::Json<CreateTaskRequest>,
) -> impl Responder {
    if payload.title.trim().is_empty() {
        return HttpResponse::BadRequest().body("Title must not be empty");
    }

    match data.db.insert(&payload) {
        Ok(task) => {
            info!("Task created: {}", task.id);
            HttpResponse::Ok().json(task)
        }
        Err(e) => {
            error!("Error inserting task: {}", e);
            HttpResponse::InternalServerError().body("Error inserting task")
        }
    }
}

/// LIST all tasks, newest first
pub async fn list_tasks(data: web::Data<AppState>) -> impl Responder {
    match data.db.fetch_all() {
        Ok(tasks) => HttpResponse::Ok().json(tasks),
        Err(e) => {
            error!("Error fetching tasks: {}", e);
            HttpResponse::InternalServerError().body("Error fetching tasks")
        }
    }
}

/// GET a single task. A missing id answers 200 with a JSON null body; absence
/// is a result here, not a failure.
pub async fn get_task_by_id(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match data.db.get_by_id(id) {
        Ok(task) => HttpResponse::Ok().json(task),
        Err(e) => {
            error!("Error fetching task {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error fetching task")
        }
    }
}

/// UPDATE an existing task. Fields absent from the body are untouched, fields
/// present overwrite, explicit null clears a nullable field. updated_at is
/// refreshed even for an empty body.
pub async fn update_task(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<UpdateTaskRequest>,
) -> impl Responder {
    let id = path.into_inner();
    match &payload.title {
        Some(None) => return HttpResponse::BadRequest().body("Title must not be null"),
        Some(Some(title)) if title.trim().is_empty() => {
            return HttpResponse::BadRequest().body("Title must not be empty");
        }
        _ => {}
    }

    match data.db.update(id, &payload) {
        Ok(task) => HttpResponse::Ok().json(task),
        Err(DbError::NotFound(_)) => HttpResponse::NotFound().body("Task not found"),
        Err(e) => {
            error!("Error updating task {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating task")
        }
    }
}

/// TOGGLE the completed flag
pub async fn toggle_task(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match data.db.toggle(id) {
        Ok(task) => HttpResponse::Ok().json(task),
        Err(DbError::NotFound(_)) => HttpResponse::NotFound().body("Task not found"),
        Err(e) => {
            error!("Error toggling task {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error toggling task")
        }
    }
}

/// DELETE a task. Strict: deleting an already-deleted id is a 404.
pub async fn delete_task(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match data.db.delete(id) {
        Ok(()) => {
            info!("Task deleted: {}", id);
            HttpResponse::Ok().json(DeleteResponse { success: true })
        }
        Err(DbError::NotFound(_)) => HttpResponse::NotFound().body("Task not found"),
        Err(e) => {
            error!("Error deleting task {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error deleting task")
        }
    }
}
