use crate::entities::{
    CommissionStatus, NotificationType, commission_entity as commissions, pickup_entity as pickups,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::policy::{self, Scope};
use crate::services::notification_service::notify;
use crate::services::pickup_service::with_parties;
use crate::services::user_service::summaries_by_ids;
use crate::utils::{AuthUser, DateRange, format_rupiah};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

pub async fn with_details<C>(
    db: &C,
    rows: Vec<commissions::Model>,
) -> AppResult<Vec<CommissionResponse>>
where
    C: ConnectionTrait,
{
    let pickup_ids: Vec<Uuid> = rows.iter().map(|c| c.pickup_id).collect();
    let pickup_rows = if pickup_ids.is_empty() {
        Vec::new()
    } else {
        pickups::Entity::find()
            .filter(pickups::Column::Id.is_in(pickup_ids))
            .all(db)
            .await?
    };
    let pickup_map: HashMap<Uuid, PickupResponse> = with_parties(db, pickup_rows)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let user_ids: Vec<Uuid> = rows.iter().map(|c| c.user_id).collect();
    let people = summaries_by_ids(db, &user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|c| {
            let pickup = pickup_map.get(&c.pickup_id).cloned();
            let user = people.get(&c.user_id).cloned();
            let mut resp = CommissionResponse::from(c);
            resp.pickup = pickup;
            resp.user = user;
            resp
        })
        .collect())
}

pub struct CommissionService {
    pool: DatabaseConnection,
}

impl CommissionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_commissions(
        &self,
        user: &AuthUser,
        query: &CommissionQuery,
    ) -> AppResult<Vec<CommissionResponse>> {
        let scope = policy::commission_scope(user)?;
        let range = DateRange::from_query(query.start_date.as_deref(), query.end_date.as_deref())?;

        let mut select = commissions::Entity::find();
        if let Scope::Own(owner) = scope {
            select = select.filter(commissions::Column::UserId.eq(owner));
        }
        if let Some(status) = query.status {
            select = select.filter(commissions::Column::Status.eq(status));
        }
        if let Some(commission_type) = query.commission_type {
            select = select.filter(commissions::Column::CommissionType.eq(commission_type));
        }
        if let Some(range) = range {
            select = select
                .filter(commissions::Column::CreatedAt.gte(range.starts_at()))
                .filter(commissions::Column::CreatedAt.lt(range.ends_before()));
        }

        let rows = select
            .order_by_desc(commissions::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        with_details(&self.pool, rows).await
    }

    /// PENDING -> PAID notifies the payee in the same transaction.
    pub async fn update_status(
        &self,
        user: &AuthUser,
        id: Uuid,
        request: UpdateCommissionRequest,
    ) -> AppResult<CommissionResponse> {
        policy::require_commission_update(user)?;

        let txn = self.pool.begin().await?;

        let commission = commissions::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Commission not found".to_string()))?;

        if !commission.status.can_transition_to(request.status) {
            return Err(AppError::Conflict(format!(
                "Commission cannot move from {} to {}",
                commission.status, request.status
            )));
        }

        let now = Utc::now();
        let mut model = commission.into_active_model();
        model.status = Set(request.status);
        if request.status == CommissionStatus::Paid {
            model.paid_date = Set(Some(now));
        }
        model.updated_at = Set(now);
        let commission = model.update(&txn).await?;

        if commission.status == CommissionStatus::Paid {
            notify(
                &txn,
                commission.user_id,
                "Komisi Dibayarkan",
                format!(
                    "Komisi {} sebesar Rp {} telah dibayarkan",
                    commission.commission_type,
                    format_rupiah(commission.amount)
                ),
                NotificationType::PaymentReceived,
                Some(commission.id),
            )
            .await?;
        }

        txn.commit().await?;

        log::info!(
            "Commission {} set to {} by {}",
            commission.id,
            commission.status,
            user.email
        );
        let mut out = with_details(&self.pool, vec![commission]).await?;
        out.pop().ok_or_else(|| {
            AppError::InternalError("Commission vanished after update".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        CommissionType, PickupStatus, UserRole, notification_entity as notifications,
        user_entity as users,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn auth(role: UserRole) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "staff@example.com".to_string(),
            role,
        }
    }

    fn commission(status: CommissionStatus) -> commissions::Model {
        let now = Utc::now();
        commissions::Model {
            id: Uuid::new_v4(),
            pickup_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            commission_type: CommissionType::Courier,
            amount: dec!(3000),
            status,
            paid_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn test_non_staff_update_is_denied_before_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = CommissionService::new(db);

        for role in [UserRole::Courier, UserRole::Customer, UserRole::Affiliate] {
            let err = service
                .update_status(
                    &auth(role),
                    Uuid::new_v4(),
                    UpdateCommissionRequest {
                        status: CommissionStatus::Paid,
                    },
                )
                .await
                .unwrap_err();
            assert!(
                matches!(err, AppError::PermissionDenied(ref m) if m == "Only ADMIN and WAREHOUSE can update commission status")
            );
        }
    }

    #[actix_web::test]
    async fn test_unknown_commission_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<commissions::Model>::new()])
            .into_connection();
        let service = CommissionService::new(db);

        let err = service
            .update_status(
                &auth(UserRole::Admin),
                Uuid::new_v4(),
                UpdateCommissionRequest {
                    status: CommissionStatus::Paid,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Commission not found"));
    }

    #[actix_web::test]
    async fn test_paid_commission_cannot_be_paid_again() {
        let paid = commission(CommissionStatus::Paid);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![paid.clone()]])
            .into_connection();
        let service = CommissionService::new(db);

        let err = service
            .update_status(
                &auth(UserRole::Warehouse),
                paid.id,
                UpdateCommissionRequest {
                    status: CommissionStatus::Paid,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn test_mark_paid_notifies_payee() {
        let pending = commission(CommissionStatus::Pending);
        let paid = commissions::Model {
            status: CommissionStatus::Paid,
            paid_date: Some(Utc::now()),
            ..pending.clone()
        };
        let now = Utc::now();
        let payee = users::Model {
            id: pending.user_id,
            name: "Kurir Andi".to_string(),
            email: "andi@example.com".to_string(),
            phone: "6281111111111".to_string(),
            address: None,
            password_hash: "x".to_string(),
            role: UserRole::Courier,
            is_active: true,
            referral_code: "KURIR001".to_string(),
            referred_by_id: None,
            created_at: now,
            updated_at: now,
        };
        let note = notifications::Model {
            id: Uuid::new_v4(),
            user_id: payee.id,
            title: "Komisi Dibayarkan".to_string(),
            message: "Komisi COURIER sebesar Rp 3.000 telah dibayarkan".to_string(),
            notification_type: NotificationType::PaymentReceived,
            related_id: Some(pending.id),
            is_read: false,
            created_at: now,
        };
        let customer_id = Uuid::new_v4();
        let pickup = pickups::Model {
            id: pending.pickup_id,
            customer_id,
            courier_id: Some(payee.id),
            status: PickupStatus::Completed,
            scheduled_date: now,
            actual_date: Some(now),
            volume: dec!(10),
            actual_volume: Some(dec!(10)),
            total_price: dec!(60000),
            courier_fee: dec!(3000),
            affiliate_fee: Decimal::ZERO,
            address: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![pending.clone()]])
            .append_query_results(vec![vec![paid.clone()]])
            .append_query_results(vec![vec![note]])
            .append_query_results(vec![vec![pickup]])
            .append_query_results(vec![vec![payee.clone()]])
            .append_query_results(vec![vec![payee.clone()]])
            .into_connection();
        let service = CommissionService::new(db);

        let resp = service
            .update_status(
                &auth(UserRole::Admin),
                pending.id,
                UpdateCommissionRequest {
                    status: CommissionStatus::Paid,
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status, CommissionStatus::Paid);
        assert!(resp.paid_date.is_some());
        assert_eq!(resp.user.as_ref().map(|u| u.id), Some(payee.id));
        assert_eq!(resp.pickup.as_ref().map(|p| p.id), Some(pending.pickup_id));

        let log = format!("{:?}", service.pool.into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("Komisi Dibayarkan"));
        assert!(log.contains("Komisi COURIER sebesar Rp 3.000 telah dibayarkan"));
    }
}
