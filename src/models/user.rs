use crate::entities::{UserRole, user_entity as users};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub referral_code: String,
    pub referred_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            address: user.address,
            role: user.role,
            is_active: user.is_active,
            referral_code: user.referral_code,
            referred_by_id: user.referred_by_id,
            created_at: user.created_at,
        }
    }
}

/// Contact card embedded in pickups, bills and commissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
}

impl From<&users::Model> for UserSummary {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserCounts {
    pub pickups_as_customer: u64,
    pub pickups_as_courier: u64,
    pub referrals: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListItem {
    #[serde(flatten)]
    pub user: UserResponse,
    pub counts: UserCounts,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UserQuery {
    /// A role name, or `ALL`
    pub role: Option<String>,
    /// Case-insensitive match on name, email or phone
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Budi Santoso")]
    pub name: Option<String>,
    #[schema(example = "budi@example.com")]
    pub email: Option<String>,
    #[schema(example = "081234567890")]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<UserRole>,
    pub password: Option<String>,
    /// Referral code of the user who brought this one in
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@example.com")]
    pub email: String,
    #[schema(example = "rahasia123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}
