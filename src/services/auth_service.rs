use crate::config::BootstrapConfig;
use crate::entities::{UserRole, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token =
            self.jwt_service
                .generate_access_token(user.id, &user.email, user.role)?;
        let refresh_token =
            self.jwt_service
                .generate_refresh_token(user.id, &user.email, user.role)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::ValidationError(
                "Email and password are required".to_string(),
            ));
        }

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            log::warn!("Failed login for {email}");
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }
        if !user.is_active {
            return Err(AppError::AuthError("Account is inactive".to_string()));
        }

        log::info!("User {} ({}) logged in", user.email, user.role);
        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let identity = self
            .jwt_service
            .verify_refresh_token(refresh_token)
            .and_then(AuthUser::try_from)
            .map_err(|e| {
                log::warn!("Refresh token rejected: {e}");
                AppError::AuthError("Invalid refresh token".to_string())
            })?;

        let user = self.find_user(identity.id).await?;
        if !user.is_active {
            return Err(AppError::AuthError("Account is inactive".to_string()));
        }

        let access_token =
            self.jwt_service
                .generate_access_token(user.id, &user.email, user.role)?;
        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn me(&self, user_id: Uuid) -> AppResult<UserResponse> {
        self.find_user(user_id).await.map(UserResponse::from)
    }

    async fn find_user(&self, user_id: Uuid) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Creates the first ADMIN from config when the database has none.
    /// Returns whether an account was created.
    pub async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<bool> {
        let (Some(email), Some(password)) = (
            bootstrap.admin_email.as_deref(),
            bootstrap.admin_password.as_deref(),
        ) else {
            return Ok(false);
        };

        let admins = users::Entity::find()
            .filter(users::Column::Role.eq(UserRole::Admin))
            .count(&self.pool)
            .await?;
        if admins > 0 {
            return Ok(false);
        }

        validate_password(password)
            .map_err(|e| AppError::ConfigError(format!("Bootstrap admin password: {e}")))?;
        let referral_code = generate_unique_referral_code(&self.pool).await?;
        let now = Utc::now();

        users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(bootstrap
                .admin_name
                .clone()
                .unwrap_or_else(|| "Administrator".to_string())),
            email: Set(email.trim().to_lowercase()),
            phone: Set(String::new()),
            address: Set(None),
            password_hash: Set(hash_password(password)?),
            role: Set(UserRole::Admin),
            is_active: Set(true),
            referral_code: Set(referral_code),
            referred_by_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Bootstrap admin {email} created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600, 7200)
    }

    fn user(password: &str, is_active: bool) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Uuid::new_v4(),
            name: "Gudang".to_string(),
            email: "gudang@example.com".to_string(),
            phone: "6281200000000".to_string(),
            address: None,
            password_hash: hash_password(password).unwrap(),
            role: UserRole::Warehouse,
            is_active,
            referral_code: "GUDANG01".to_string(),
            referred_by_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn test_login_issues_tokens_with_role() {
        let row = user("rahasia123", true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row.clone()]])
            .into_connection();
        let service = AuthService::new(db, jwt());

        let resp = service
            .login(LoginRequest {
                email: " Gudang@Example.com ".to_string(),
                password: "rahasia123".to_string(),
            })
            .await
            .unwrap();
        let claims = jwt().verify_access_token(&resp.access_token).unwrap();
        assert_eq!(claims.role, UserRole::Warehouse);
        assert_eq!(claims.sub, row.id.to_string());
        assert_eq!(resp.expires_in, 3600);
    }

    #[actix_web::test]
    async fn test_login_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user("rahasia123", true)]])
            .into_connection();
        let service = AuthService::new(db, jwt());

        let err = service
            .login(LoginRequest {
                email: "gudang@example.com".to_string(),
                password: "salah".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(ref m) if m == INVALID_CREDENTIALS));
    }

    #[actix_web::test]
    async fn test_login_inactive_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user("rahasia123", false)]])
            .into_connection();
        let service = AuthService::new(db, jwt());

        let err = service
            .login(LoginRequest {
                email: "gudang@example.com".to_string(),
                password: "rahasia123".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(ref m) if m == "Account is inactive"));
    }

    #[actix_web::test]
    async fn test_refresh_rejects_access_token() {
        let service = AuthService::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            jwt(),
        );
        let access = jwt()
            .generate_access_token(Uuid::new_v4(), "a@example.com", UserRole::Admin)
            .unwrap();
        let err = service.refresh_token(&access).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(ref m) if m == "Invalid refresh token"));
    }

    #[actix_web::test]
    async fn test_bootstrap_skipped_without_config() {
        let service = AuthService::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            jwt(),
        );
        let created = service
            .ensure_bootstrap_admin(&BootstrapConfig::default())
            .await
            .unwrap();
        assert!(!created);
    }
}
