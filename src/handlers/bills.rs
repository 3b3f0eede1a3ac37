use crate::middlewares::current_user;
use crate::models::*;
use crate::services::BillService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/bills",
    tag = "bills",
    params(
        ("status" = Option<String>, Query, description = "UNPAID or PAID"),
        ("start_date" = Option<String>, Query, description = "YYYY-MM-DD, on the creation date"),
        ("end_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Bills, newest first", body = [BillResponse]),
        (status = 403, description = "COURIER and AFFILIATE callers")
    )
)]
pub async fn list_bills(
    bill_service: web::Data<BillService>,
    req: HttpRequest,
    query: web::Query<BillQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match bill_service.list_bills(&user, &query).await {
        Ok(bills) => Ok(HttpResponse::Ok().json(ApiResponse::success(bills))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/bills/{id}",
    tag = "bills",
    params(
        ("id" = Uuid, Path, description = "Bill id")
    ),
    request_body = UpdateBillRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Bill marked as paid", body = BillResponse),
        (status = 403, description = "Caller is not ADMIN or WAREHOUSE"),
        (status = 404, description = "Bill not found"),
        (status = 409, description = "Bill already paid")
    )
)]
pub async fn update_bill(
    bill_service: web::Data<BillService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdateBillRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match bill_service
        .update_status(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(bill) => Ok(HttpResponse::Ok().json(ApiResponse::success(bill))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn bills_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bills")
            .route("", web::get().to(list_bills))
            .route("/{id}", web::patch().to(update_bill)),
    );
}
