use crate::middlewares::optional_user;
use crate::models::*;
use crate::policy::{self, PageAccess};
use actix_web::{HttpRequest, HttpResponse, Result, web};

#[utoipa::path(
    get,
    path = "/access/admin",
    tag = "access",
    params(
        ("path" = String, Query, description = "Front-end path under /admin")
    ),
    responses(
        (status = 200, description = "Whether the page may be shown, or where to redirect", body = PageAccess)
    )
)]
pub async fn admin_access(req: HttpRequest, query: web::Query<AccessQuery>) -> Result<HttpResponse> {
    let role = optional_user(&req).map(|u| u.role);
    let access = policy::admin_page_access(role, &query.path);
    if !access.allowed {
        log::debug!("Admin page {} refused for {role:?}", query.path);
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(access)))
}

pub fn access_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/access").route("/admin", web::get().to(admin_access)));
}
