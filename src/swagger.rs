use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    BillStatus, CommissionStatus, CommissionType, NotificationType, PickupStatus, UserRole,
};
use crate::handlers;
use crate::models::*;
use crate::policy::PageAccess;
use crate::utils::{DateRange, Period};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::set_user_active,
        handlers::pickups::list_pickups,
        handlers::pickups::create_pickup,
        handlers::pickups::assign_courier,
        handlers::pickups::complete_pickup,
        handlers::pickups::cancel_pickup,
        handlers::bills::list_bills,
        handlers::bills::update_bill,
        handlers::commissions::list_commissions,
        handlers::commissions::update_commission,
        handlers::other_expenses::list_other_expenses,
        handlers::other_expenses::create_other_expense,
        handlers::other_expenses::update_other_expense,
        handlers::other_expenses::delete_other_expense,
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification_read,
        handlers::pembukuan::summary,
        handlers::access::admin_access,
    ),
    components(
        schemas(
            UserRole,
            PickupStatus,
            BillStatus,
            CommissionType,
            CommissionStatus,
            NotificationType,
            ApiError,
            UserResponse,
            UserSummary,
            UserCounts,
            UserListItem,
            CreateUserRequest,
            CreateUserResponse,
            UpdateUserActiveRequest,
            LoginRequest,
            AuthResponse,
            PickupResponse,
            CreatePickupRequest,
            AssignCourierRequest,
            CompletePickupRequest,
            BillResponse,
            UpdateBillRequest,
            CommissionResponse,
            UpdateCommissionRequest,
            OtherExpenseResponse,
            OtherExpenseRequest,
            SettingsResponse,
            UpdateSettingsRequest,
            NotificationResponse,
            BookkeepingSummary,
            BookkeepingReport,
            DateRange,
            Period,
            PageAccess,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login and tokens"),
        (name = "users", description = "User management (ADMIN)"),
        (name = "pickups", description = "Oil pickups"),
        (name = "bills", description = "Customer bills"),
        (name = "commissions", description = "Courier and affiliate commissions"),
        (name = "other-expenses", description = "Operational expenses"),
        (name = "settings", description = "Per-liter rates"),
        (name = "notifications", description = "In-app notifications"),
        (name = "pembukuan", description = "Bookkeeping summary"),
        (name = "access", description = "Admin page gating"),
    ),
    info(
        title = "Jelantah Backend API",
        version = "0.1.0",
        description = "Used cooking oil collection back-office REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/login",
            "/users/{id}/active",
            "/pickups/{id}/complete",
            "/commissions/{id}",
            "/other-expenses/{id}",
            "/pembukuan/summary",
            "/access/admin",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
