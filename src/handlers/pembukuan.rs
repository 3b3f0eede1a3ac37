use crate::middlewares::current_user;
use crate::models::*;
use crate::policy;
use crate::services::BookkeepingService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/pembukuan/summary",
    tag = "pembukuan",
    params(
        ("period" = Option<String>, Query, description = "this_month (default), last_month, this_year or custom"),
        ("start_date" = Option<String>, Query, description = "YYYY-MM-DD, required for custom"),
        ("end_date" = Option<String>, Query, description = "YYYY-MM-DD, required for custom")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Profit and loss over the period", body = BookkeepingReport),
        (status = 400, description = "Bad or missing dates"),
        (status = 403, description = "Caller is not ADMIN or WAREHOUSE")
    )
)]
pub async fn summary(
    bookkeeping_service: web::Data<BookkeepingService>,
    req: HttpRequest,
    query: web::Query<BookkeepingQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    policy::require_bookkeeping(&user)?;

    let range = query.effective_period().resolve(
        Utc::now().date_naive(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )?;

    match bookkeeping_service.summary(range).await {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(report))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn pembukuan_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/pembukuan").route("/summary", web::get().to(summary)));
}
