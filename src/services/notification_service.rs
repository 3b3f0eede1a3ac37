use crate::entities::{NotificationType, notification_entity as notifications};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// In-app message for one user. Takes any connection so callers can write it
/// inside the transaction that caused it.
pub async fn notify<C>(
    db: &C,
    user_id: Uuid,
    title: &str,
    message: String,
    notification_type: NotificationType,
    related_id: Option<Uuid>,
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        title: Set(title.to_string()),
        message: Set(message),
        notification_type: Set(notification_type),
        related_id: Set(related_id),
        is_read: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;
    Ok(())
}

pub struct NotificationService {
    pool: DatabaseConnection,
}

impl NotificationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        query: &NotificationQuery,
    ) -> AppResult<Vec<NotificationResponse>> {
        let mut select =
            notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id));
        if query.unread_only.unwrap_or(false) {
            select = select.filter(notifications::Column::IsRead.eq(false));
        }

        let rows = select
            .order_by_desc(notifications::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(NotificationResponse::from).collect())
    }

    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<NotificationResponse> {
        let row = notifications::Entity::find_by_id(id)
            .filter(notifications::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if row.is_read {
            return Ok(row.into());
        }

        let mut model = row.into_active_model();
        model.is_read = Set(true);
        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }
}
