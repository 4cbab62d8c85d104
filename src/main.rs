use std::io;

use actix_web::HttpServer;
use log::info;
use warbler::config::AppConfig;
use warbler::db::connect_db;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let config = AppConfig::from_env();
    let db = connect_db(&config)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("db connect failed: {}", e)))?;
    let server_port = config.server_port;

    let server = HttpServer::new(move || warbler::app(config.clone(), db.clone()))
        .bind(("0.0.0.0", server_port))?;
    info!("server started at http://0.0.0.0:{}", server_port);
    server.run().await
}
