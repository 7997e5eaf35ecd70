use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub frontend_origin: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "2022".to_string())
            .parse()
            .unwrap_or(2022);

        Self {
            server_port,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "tasks.db".to_string()),
            frontend_origin: env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}
