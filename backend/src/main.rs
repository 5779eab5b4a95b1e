mod config;
mod error;
mod mailer;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use config::MailerConfig;
use mailer::ReportMailer;
use mailer::smtp::SmtpRelay;
use routes::configure_routes;
use std::env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = MailerConfig::load().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    let sender = config.sender().map_err(|e| std::io::Error::other(e.to_string()))?;

    let relay = SmtpRelay::new(&config.smtp).map_err(|e| {
        log::error!("Failed to set up SMTP relay: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    let report_mailer = ReportMailer::new(Arc::new(relay), sender, config.mail.subject.clone());

    let frontend_dir = config.frontend_dir.clone();
    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Serving frontend from {}", frontend_dir);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(report_mailer.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
