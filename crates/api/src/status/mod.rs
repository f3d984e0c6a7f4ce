use actix_web::{web, HttpResponse};

async fn status() -> HttpResponse {
    HttpResponse::Ok().body("running")
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
