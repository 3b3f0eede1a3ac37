use crate::entities::user_entity as users;
use crate::error::AppResult;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

/// Eight upper-case hex characters taken from a fresh UUID v4.
pub fn generate_referral_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

/// Keep drawing codes until one is not held by any user.
pub async fn generate_unique_referral_code<C>(db: &C) -> AppResult<String>
where
    C: ConnectionTrait,
{
    loop {
        let referral_code = generate_referral_code();

        let exists = users::Entity::find()
            .filter(users::Column::ReferralCode.eq(referral_code.as_str()))
            .count(db)
            .await?;

        if exists == 0 {
            return Ok(referral_code);
        }
        log::debug!("Referral code collision on {referral_code}, retrying");
    }
}
