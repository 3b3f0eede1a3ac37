use actix_web::{App, HttpServer, error::InternalError, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use jelantah_backend::{
    AppError,
    config::Config,
    database::{create_pool, run_migrations, share_pool},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

/// Request bodies above this are rejected.
const JSON_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Extractor failures (bad JSON, query or path) use the common error envelope.
fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response =
        actix_web::ResponseError::error_response(&AppError::ValidationError(err.to_string()));
    InternalError::from_response(err, response).into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let db = || share_pool(&pool).expect("Failed to share database connection pool");

    let auth_service = AuthService::new(db(), jwt_service.clone());
    match auth_service.ensure_bootstrap_admin(&config.bootstrap).await {
        Ok(true) => {}
        Ok(false) => log::debug!("Bootstrap admin not needed"),
        Err(e) => log::error!("Failed to create bootstrap admin: {e}"),
    }

    let auth_service = web::Data::new(auth_service);
    let user_service = web::Data::new(UserService::new(db()));
    let pickup_service = web::Data::new(PickupService::new(db()));
    let bill_service = web::Data::new(BillService::new(db()));
    let commission_service = web::Data::new(CommissionService::new(db()));
    let other_expense_service = web::Data::new(OtherExpenseService::new(db()));
    let settings_service = web::Data::new(SettingsService::new(db()));
    let notification_service = web::Data::new(NotificationService::new(db()));
    let bookkeeping_service = web::Data::new(BookkeepingService::new(db()));

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        let json_config = web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(|err, _req| bad_request(err));
        let query_config = web::QueryConfig::default().error_handler(|err, _req| bad_request(err));
        let path_config = web::PathConfig::default().error_handler(|err, _req| bad_request(err));

        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .app_data(json_config)
            .app_data(query_config)
            .app_data(path_config)
            .app_data(auth_service.clone())
            .app_data(user_service.clone())
            .app_data(pickup_service.clone())
            .app_data(bill_service.clone())
            .app_data(commission_service.clone())
            .app_data(other_expense_service.clone())
            .app_data(settings_service.clone())
            .app_data(notification_service.clone())
            .app_data(bookkeeping_service.clone())
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::users_config)
                    .configure(handlers::pickups_config)
                    .configure(handlers::bills_config)
                    .configure(handlers::commissions_config)
                    .configure(handlers::other_expenses_config)
                    .configure(handlers::settings_config)
                    .configure(handlers::notifications_config)
                    .configure(handlers::pembukuan_config)
                    .configure(handlers::access_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
