use crate::error::MailerError;
use crate::mailer::ReportMailer;
use actix_files::Files;
use actix_web::{HttpResponse, web};
use serde_json::json;
use shared::mail::{SEND_REPORT_PATH, SendReportRequest, SendReportResponse};
use uuid::Uuid;

// Data URIs of full-resolution smear images are large.
const JSON_LIMIT: usize = 16 * 1024 * 1024;

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            log::warn!("Rejected send-report body: {}", err);
            MailerError::Validation(format!("Invalid request body: {}", err)).into()
        });

    cfg.service(web::resource("/api/health").route(web::get().to(health)))
        .service(
            web::resource(SEND_REPORT_PATH)
                .app_data(json_config)
                .route(web::post().to(send_report)),
        );
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    configure_api(cfg);
    cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn send_report(
    mailer: web::Data<ReportMailer>,
    body: web::Json<SendReportRequest>,
) -> Result<HttpResponse, MailerError> {
    let request_id = Uuid::new_v4();
    log::info!(
        "[{}] Send-report request (image: {})",
        request_id,
        if body.image_data.is_some() { "yes" } else { "no" }
    );

    match mailer.send(body.into_inner(), request_id).await {
        Ok(()) => {
            log::info!("[{}] Report sent", request_id);
            Ok(HttpResponse::Ok().json(SendReportResponse::ok()))
        }
        Err(e) => {
            log::error!("[{}] Send-report failed: {}", request_id, e);
            Err(e)
        }
    }
}
