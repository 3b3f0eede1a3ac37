use crate::middlewares::current_user;
use crate::models::*;
use crate::services::CommissionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/commissions",
    tag = "commissions",
    params(
        ("status" = Option<String>, Query, description = "PENDING, PAID or CANCELLED"),
        ("type" = Option<String>, Query, description = "COURIER or AFFILIATE"),
        ("start_date" = Option<String>, Query, description = "YYYY-MM-DD, on the creation date"),
        ("end_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Commissions visible to the caller", body = [CommissionResponse])
    )
)]
pub async fn list_commissions(
    commission_service: web::Data<CommissionService>,
    req: HttpRequest,
    query: web::Query<CommissionQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match commission_service.list_commissions(&user, &query).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/commissions/{id}",
    tag = "commissions",
    params(
        ("id" = Uuid, Path, description = "Commission id")
    ),
    request_body = UpdateCommissionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Commission updated", body = CommissionResponse),
        (status = 403, description = "Only ADMIN and WAREHOUSE can update commission status"),
        (status = 404, description = "Commission not found"),
        (status = 409, description = "Commission is no longer PENDING")
    )
)]
pub async fn update_commission(
    commission_service: web::Data<CommissionService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdateCommissionRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match commission_service
        .update_status(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(commission) => Ok(HttpResponse::Ok().json(ApiResponse::success(commission))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn commissions_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/commissions")
            .route("", web::get().to(list_commissions))
            .route("/{id}", web::patch().to(update_commission)),
    );
}
