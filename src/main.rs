use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use taskhub::clock::SystemClock;
use taskhub::config::Config;
use taskhub::error::AppError;
use taskhub::store::{MemoryStore, PgStore, Repositories};
use taskhub::AppContext;

fn to_io(error: AppError) -> io::Error {
    io::Error::other(error.to_string())
}

async fn open_store(config: &Config) -> Result<Repositories, AppError> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            let store = PgStore::new(pool);
            store.migrate().await?;
            log::info!("Connected to PostgreSQL and applied migrations");
            Ok(Repositories::postgres(store))
        }
        None => {
            log::warn!("DATABASE_URL is not set; using the in-memory store, data is lost on exit");
            Ok(Repositories::memory(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io)?;
    let repos = open_store(&config).await.map_err(to_io)?;
    let context = AppContext::new(repos, &config, Arc::new(SystemClock));

    log::info!("Starting taskhub server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| context.configure(cfg))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
