use actix_web::web;

use crate::task::{
    create_task, delete_task, get_task_by_id, healthcheck, list_tasks, toggle_task, update_task,
};

/// One entry point per procedure. Shared between main and the endpoint tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthcheck", web::get().to(healthcheck)).service(
        web::scope("/tasks")
            .route("", web::post().to(create_task))
            .route("", web::get().to(list_tasks))
            .route("/{id}", web::get().to(get_task_by_id))
            .route("/{id}", web::put().to(update_task))
            .route("/{id}/toggle", web::post().to(toggle_task))
            .route("/{id}", web::delete().to(delete_task)),
    );
}
