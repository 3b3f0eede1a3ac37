use crate::middlewares::current_user;
use crate::models::*;
use crate::policy;
use crate::services::OtherExpenseService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/other-expenses",
    tag = "other-expenses",
    params(
        ("start_date" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("end_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive; ignored without start_date")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Expenses, latest first", body = [OtherExpenseResponse]),
        (status = 403, description = "Caller is not ADMIN or WAREHOUSE")
    )
)]
pub async fn list_other_expenses(
    expense_service: web::Data<OtherExpenseService>,
    req: HttpRequest,
    query: web::Query<OtherExpenseQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    policy::require_expense_read(&user)?;

    match expense_service.list(&query).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/other-expenses",
    tag = "other-expenses",
    request_body = OtherExpenseRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Expense recorded", body = OtherExpenseResponse),
        (status = 400, description = "Keterangan dan nominal wajib diisi"),
        (status = 403, description = "Caller is not ADMIN")
    )
)]
pub async fn create_other_expense(
    expense_service: web::Data<OtherExpenseService>,
    req: HttpRequest,
    request: web::Json<OtherExpenseRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    policy::require_expense_write(&user)?;

    match expense_service.create(request.into_inner()).await {
        Ok(expense) => Ok(HttpResponse::Created().json(ApiResponse::success(expense))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/other-expenses/{id}",
    tag = "other-expenses",
    params(
        ("id" = Uuid, Path, description = "Expense id")
    ),
    request_body = OtherExpenseRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Expense updated", body = OtherExpenseResponse),
        (status = 400, description = "Keterangan dan nominal wajib diisi"),
        (status = 403, description = "Caller is not ADMIN"),
        (status = 404, description = "Expense not found")
    )
)]
pub async fn update_other_expense(
    expense_service: web::Data<OtherExpenseService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<OtherExpenseRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    policy::require_expense_write(&user)?;

    match expense_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(expense) => Ok(HttpResponse::Ok().json(ApiResponse::success(expense))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/other-expenses/{id}",
    tag = "other-expenses",
    params(
        ("id" = Uuid, Path, description = "Expense id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Expense deleted successfully"),
        (status = 403, description = "Caller is not ADMIN"),
        (status = 404, description = "Expense not found")
    )
)]
pub async fn delete_other_expense(
    expense_service: web::Data<OtherExpenseService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    policy::require_expense_write(&user)?;

    match expense_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(
            "Expense deleted successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn other_expenses_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/other-expenses")
            .route("", web::get().to(list_other_expenses))
            .route("", web::post().to(create_other_expense))
            .route("/{id}", web::put().to(update_other_expense))
            .route("/{id}", web::delete().to(delete_other_expense)),
    );
}
