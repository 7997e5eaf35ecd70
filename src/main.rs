use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use taskpad::app_state::AppState;
use taskpad::config::Config;
use taskpad::routes;
use taskpad::task_db::TaskDb;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let db = Arc::new(TaskDb::open(&config.database_path).expect("Failed to open task database"));

    println!("Task server running at http://0.0.0.0:{}", config.server_port);
    println!("Allowed CORS Origin: {}", config.frontend_origin);

    let port = config.server_port;
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(AppState {
                db: db.clone(),
                config: config.clone(),
            }))
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
