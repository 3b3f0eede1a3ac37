use crate::entities::{UserRole, pickup_entity as pickups, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{
    generate_unique_referral_code, hash_password, normalize_phone, validate_password,
    validate_phone,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, FromQueryResult)]
struct GroupCount {
    key: Uuid,
    count: i64,
}

/// Contact cards for a set of users, keyed by id. Unknown ids are skipped.
pub async fn summaries_by_ids<C>(db: &C, ids: &[Uuid]) -> AppResult<HashMap<Uuid, UserSummary>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = users::Entity::find()
        .filter(users::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    Ok(rows.iter().map(|u| (u.id, UserSummary::from(u))).collect())
}

const LIKE_ESCAPE: char = '\\';

/// Substring pattern with the LIKE wildcards in `search` taken literally.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn search_condition(search: &str) -> Condition {
    let pattern = contains_pattern(search);
    let lower_like = |col: users::Column| {
        Expr::expr(Func::lower(Expr::col((users::Entity, col))))
            .like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE))
    };

    Condition::any()
        .add(lower_like(users::Column::Name))
        .add(lower_like(users::Column::Email))
        .add(lower_like(users::Column::Phone))
        .add(users::Column::Phone.eq(normalize_phone(search)))
        .add(users::Column::Phone.eq(search))
}

pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_users(&self, query: &UserQuery) -> AppResult<PaginatedResponse<UserListItem>> {
        let params = PaginationParams::new(query.page, query.limit);

        let mut select = users::Entity::find();
        if let Some(role) = query.role.as_deref().filter(|r| *r != "ALL" && !r.is_empty()) {
            let role: UserRole = role.parse().map_err(AppError::ValidationError)?;
            select = select.filter(users::Column::Role.eq(role));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(search_condition(search));
        }

        let total = select.clone().count(&self.pool).await?;
        let rows = select
            .order_by_desc(users::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|u| u.id).collect();
        let counts = self.counts_for(&ids).await?;

        let data = rows
            .into_iter()
            .map(|u| {
                let counts = counts.get(&u.id).cloned().unwrap_or_default();
                UserListItem {
                    user: UserResponse::from(u),
                    counts,
                }
            })
            .collect();

        Ok(PaginatedResponse::new(data, &params, total))
    }

    async fn counts_for(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, UserCounts>> {
        let mut out: HashMap<Uuid, UserCounts> = HashMap::new();
        if ids.is_empty() {
            return Ok(out);
        }

        let as_customer = pickups::Entity::find()
            .select_only()
            .column_as(pickups::Column::CustomerId, "key")
            .column_as(Expr::col(pickups::Column::Id).count(), "count")
            .filter(pickups::Column::CustomerId.is_in(ids.iter().copied()))
            .group_by(pickups::Column::CustomerId)
            .into_model::<GroupCount>()
            .all(&self.pool)
            .await?;
        for row in as_customer {
            out.entry(row.key).or_default().pickups_as_customer = row.count as u64;
        }

        let as_courier = pickups::Entity::find()
            .select_only()
            .column_as(pickups::Column::CourierId, "key")
            .column_as(Expr::col(pickups::Column::Id).count(), "count")
            .filter(pickups::Column::CourierId.is_in(ids.iter().copied()))
            .group_by(pickups::Column::CourierId)
            .into_model::<GroupCount>()
            .all(&self.pool)
            .await?;
        for row in as_courier {
            out.entry(row.key).or_default().pickups_as_courier = row.count as u64;
        }

        let referrals = users::Entity::find()
            .select_only()
            .column_as(users::Column::ReferredById, "key")
            .column_as(Expr::col(users::Column::Id).count(), "count")
            .filter(users::Column::ReferredById.is_in(ids.iter().copied()))
            .group_by(users::Column::ReferredById)
            .into_model::<GroupCount>()
            .all(&self.pool)
            .await?;
        for row in referrals {
            out.entry(row.key).or_default().referrals = row.count as u64;
        }

        Ok(out)
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<UserResponse> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let (Some(name), Some(email), Some(phone), Some(password), Some(role)) = (
            non_blank(&request.name),
            non_blank(&request.email).map(|e| e.to_lowercase()),
            non_blank(&request.phone),
            request.password.clone().filter(|p| !p.is_empty()),
            request.role,
        ) else {
            return Err(AppError::ValidationError(
                "Missing required fields".to_string(),
            ));
        };

        validate_password(&password)?;
        let phone = normalize_phone(&phone);
        validate_phone(&phone)?;

        let taken = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .count(&self.pool)
            .await?;
        if taken > 0 {
            return Err(AppError::ValidationError("Email already exists".to_string()));
        }

        let referred_by_id = match non_blank(&request.referral_code) {
            Some(code) => {
                let referrer = users::Entity::find()
                    .filter(users::Column::ReferralCode.eq(code.to_uppercase()))
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| {
                        AppError::ValidationError("Referral code not found".to_string())
                    })?;
                Some(referrer.id)
            }
            None => None,
        };

        let referral_code = generate_unique_referral_code(&self.pool).await?;
        let password_hash = hash_password(&password)?;
        let now = Utc::now();

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            phone: Set(phone),
            address: Set(non_blank(&request.address)),
            password_hash: Set(password_hash),
            role: Set(role),
            is_active: Set(true),
            referral_code: Set(referral_code),
            referred_by_id: Set(referred_by_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("User {} created with role {}", user.email, user.role);
        Ok(UserResponse::from(user))
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<UserResponse> {
        let mut model = users::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
            .into_active_model();
        model.is_active = Set(is_active);
        model.updated_at = Set(Utc::now());
        let user = model.update(&self.pool).await?;

        log::info!("User {} is_active set to {is_active}", user.email);
        Ok(UserResponse::from(user))
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<UserResponse> {
        users::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait, Value};
    use std::collections::BTreeMap;

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn user(email: &str, role: UserRole) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Uuid::new_v4(),
            name: "Siti".to_string(),
            email: email.to_string(),
            phone: "6281234567890".to_string(),
            address: None,
            password_hash: "x".to_string(),
            role,
            is_active: true,
            referral_code: "ABCD1234".to_string(),
            referred_by_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn request() -> CreateUserRequest {
        CreateUserRequest {
            name: Some("Siti".to_string()),
            email: Some("Siti@Example.com".to_string()),
            phone: Some("0812-3456-7890".to_string()),
            address: None,
            role: Some(UserRole::Customer),
            password: Some("rahasia123".to_string()),
            referral_code: None,
        }
    }

    #[actix_web::test]
    async fn test_create_user_requires_fields() {
        let service = UserService::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let err = service
            .create_user(CreateUserRequest {
                name: Some("   ".to_string()),
                ..request()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "Missing required fields"));
    }

    #[actix_web::test]
    async fn test_create_user_rejects_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![count_row(1)]])
            .into_connection();
        let service = UserService::new(db);

        let err = service.create_user(request()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "Email already exists"));
    }

    #[actix_web::test]
    async fn test_create_user_unknown_referral_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![count_row(0)]])
            .append_query_results(vec![Vec::<users::Model>::new()])
            .into_connection();
        let service = UserService::new(db);

        let err = service
            .create_user(CreateUserRequest {
                referral_code: Some("nope0000".to_string()),
                ..request()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn test_create_user_normalizes_and_links_referrer() {
        let referrer = user("aff@example.com", UserRole::Affiliate);
        let mut created = user("siti@example.com", UserRole::Customer);
        created.referred_by_id = Some(referrer.id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![count_row(0)]])
            .append_query_results(vec![vec![referrer.clone()]])
            .append_query_results(vec![vec![count_row(0)]])
            .append_query_results(vec![vec![created.clone()]])
            .into_connection();
        let service = UserService::new(db);

        let resp = service
            .create_user(CreateUserRequest {
                referral_code: Some("abcd1234".to_string()),
                ..request()
            })
            .await
            .unwrap();
        assert_eq!(resp.referred_by_id, Some(referrer.id));
        assert_eq!(resp.phone, "6281234567890");
    }

    #[actix_web::test]
    async fn test_set_active_missing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<users::Model>::new()])
            .into_connection();
        let service = UserService::new(db);
        let err = service.set_active(Uuid::new_v4(), false).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_list_users_rejects_unknown_role() {
        let service = UserService::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let err = service
            .list_users(&UserQuery {
                role: Some("JANITOR".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        assert_eq!(contains_pattern("Siti"), "%siti%");
        assert_eq!(contains_pattern("_"), r"%\_%");
        assert_eq!(contains_pattern(r"50%\a"), r"%50\%\\a%");

        let sql = users::Entity::find()
            .filter(search_condition("_"))
            .build(DatabaseBackend::Postgres)
            .to_string();
        assert!(sql.contains("ESCAPE"));
    }
}
