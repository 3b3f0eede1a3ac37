use crate::middlewares::current_user;
use crate::models::*;
use crate::policy;
use crate::services::UserService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(
        ("role" = Option<String>, Query, description = "Role filter, or ALL"),
        ("search" = Option<String>, Query, description = "Name, email or phone"),
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, 1..=100")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Paginated users with pickup and referral counts"),
        (status = 403, description = "Caller is not ADMIN")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    policy::require_admin(&user)?;

    match user_service.list_users(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Missing fields, duplicate email or unknown referral code"),
        (status = 403, description = "Caller is not ADMIN")
    )
)]
pub async fn create_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    policy::require_admin(&user)?;

    match user_service.create_user(request.into_inner()).await {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(CreateUserResponse {
            message: "User created successfully".to_string(),
            user: created,
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/users/{id}/active",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    request_body = UpdateUserActiveRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 403, description = "Caller is not ADMIN"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_user_active(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdateUserActiveRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    policy::require_admin(&user)?;

    match user_service
        .set_active(path.into_inner(), request.is_active)
        .await
    {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success(updated))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn users_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/{id}/active", web::patch().to(set_user_active)),
    );
}
