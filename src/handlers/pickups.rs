use crate::middlewares::current_user;
use crate::models::*;
use crate::services::PickupService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/pickups",
    tag = "pickups",
    params(
        ("status" = Option<String>, Query, description = "PENDING, SCHEDULED, COMPLETED or CANCELLED"),
        ("start_date" = Option<String>, Query, description = "YYYY-MM-DD, on the scheduled date"),
        ("end_date" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, 1..=100")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pickups visible to the caller"),
        (status = 403, description = "AFFILIATE callers")
    )
)]
pub async fn list_pickups(
    pickup_service: web::Data<PickupService>,
    req: HttpRequest,
    query: web::Query<PickupQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match pickup_service.list_pickups(&user, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/pickups",
    tag = "pickups",
    request_body = CreatePickupRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Pickup requested", body = PickupResponse),
        (status = 400, description = "Invalid volume, date or customer"),
        (status = 403, description = "COURIER and AFFILIATE callers")
    )
)]
pub async fn create_pickup(
    pickup_service: web::Data<PickupService>,
    req: HttpRequest,
    request: web::Json<CreatePickupRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match pickup_service.create_pickup(&user, request.into_inner()).await {
        Ok(pickup) => Ok(HttpResponse::Created().json(ApiResponse::success(pickup))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/pickups/{id}/assign",
    tag = "pickups",
    params(
        ("id" = Uuid, Path, description = "Pickup id")
    ),
    request_body = AssignCourierRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Courier assigned", body = PickupResponse),
        (status = 403, description = "Caller is not ADMIN or WAREHOUSE"),
        (status = 404, description = "Pickup not found"),
        (status = 409, description = "Pickup already completed or cancelled")
    )
)]
pub async fn assign_courier(
    pickup_service: web::Data<PickupService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<AssignCourierRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match pickup_service
        .assign_courier(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(pickup) => Ok(HttpResponse::Ok().json(ApiResponse::success(pickup))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/pickups/{id}/complete",
    tag = "pickups",
    params(
        ("id" = Uuid, Path, description = "Pickup id")
    ),
    request_body = CompletePickupRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pickup completed, bill and commissions raised", body = PickupResponse),
        (status = 403, description = "Caller is neither staff nor the assigned courier"),
        (status = 404, description = "Pickup not found"),
        (status = 409, description = "Pickup is not SCHEDULED")
    )
)]
pub async fn complete_pickup(
    pickup_service: web::Data<PickupService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<CompletePickupRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match pickup_service
        .complete_pickup(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(pickup) => Ok(HttpResponse::Ok().json(ApiResponse::success(pickup))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/pickups/{id}/cancel",
    tag = "pickups",
    params(
        ("id" = Uuid, Path, description = "Pickup id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pickup cancelled", body = PickupResponse),
        (status = 403, description = "Not allowed to cancel this pickup"),
        (status = 404, description = "Pickup not found"),
        (status = 409, description = "Pickup already completed or cancelled")
    )
)]
pub async fn cancel_pickup(
    pickup_service: web::Data<PickupService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match pickup_service.cancel_pickup(&user, path.into_inner()).await {
        Ok(pickup) => Ok(HttpResponse::Ok().json(ApiResponse::success(pickup))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn pickups_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pickups")
            .route("", web::get().to(list_pickups))
            .route("", web::post().to(create_pickup))
            .route("/{id}/assign", web::patch().to(assign_courier))
            .route("/{id}/complete", web::post().to(complete_pickup))
            .route("/{id}/cancel", web::post().to(cancel_pickup)),
    );
}
