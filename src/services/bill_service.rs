use crate::entities::{BillStatus, NotificationType, bill_entity as bills, pickup_entity as pickups};
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

/// Bills with their pickup (and its parties) and the billed customer.
pub async fn with_details<C>(db: &C, rows: Vec<bills::Model>) -> AppResult<Vec<BillResponse>>
where
    C: ConnectionTrait,
{
    let pickup_ids: Vec<Uuid> = rows.iter().map(|b| b.pickup_id).collect();
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

    let user_ids: Vec<Uuid> = rows.iter().map(|b| b.user_id).collect();
    let people = summaries_by_ids(db, &user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|b| {
            let pickup = pickup_map.get(&b.pickup_id).cloned();
            let user = people.get(&b.user_id).cloned();
            let mut resp = BillResponse::from(b);
            resp.pickup = pickup;
            resp.user = user;
            resp
        })
        .collect())
}

pub struct BillService {
    pool: DatabaseConnection,
}

impl BillService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_bills(&self, user: &AuthUser, query: &BillQuery) -> AppResult<Vec<BillResponse>> {
        let scope = policy::bill_scope(user)?;
        let range = DateRange::from_query(query.start_date.as_deref(), query.end_date.as_deref())?;

        let mut select = bills::Entity::find();
        if let Scope::Own(owner) = scope {
            select = select.filter(bills::Column::UserId.eq(owner));
        }
        if let Some(status) = query.status {
            select = select.filter(bills::Column::Status.eq(status));
        }
        if let Some(range) = range {
            select = select
                .filter(bills::Column::CreatedAt.gte(range.starts_at()))
                .filter(bills::Column::CreatedAt.lt(range.ends_before()));
        }

        let rows = select
            .order_by_desc(bills::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        with_details(&self.pool, rows).await
    }

    pub async fn update_status(
        &self,
        user: &AuthUser,
        id: Uuid,
        request: UpdateBillRequest,
    ) -> AppResult<BillResponse> {
        policy::require_staff(user)?;
        if request.status != BillStatus::Paid {
            return Err(AppError::ValidationError(
                "A bill can only be marked as PAID".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        let bill = bills::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Bill not found".to_string()))?;
        if bill.status == BillStatus::Paid {
            return Err(AppError::Conflict("Bill is already paid".to_string()));
        }

        let now = Utc::now();
        let mut model = bill.into_active_model();
        model.status = Set(BillStatus::Paid);
        model.paid_date = Set(Some(now));
        model.updated_at = Set(now);
        let bill = model.update(&txn).await?;

        notify(
            &txn,
            bill.user_id,
            "Pembayaran Diterima",
            format!(
                "Pembayaran minyak jelantah sebesar Rp {} telah dibayarkan",
                format_rupiah(bill.amount)
            ),
            NotificationType::PaymentReceived,
            Some(bill.id),
        )
        .await?;

        txn.commit().await?;

        log::info!("Bill {} marked PAID by {}", bill.id, user.email);
        let mut out = with_details(&self.pool, vec![bill]).await?;
        out.pop()
            .ok_or_else(|| AppError::InternalError("Bill vanished after update".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        PickupStatus, UserRole, notification_entity as notifications, user_entity as users,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn auth(role: UserRole) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            role,
        }
    }

    fn bill(status: BillStatus) -> bills::Model {
        let now = Utc::now();
        bills::Model {
            id: Uuid::new_v4(),
            pickup_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: dec!(60000),
            status,
            paid_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn test_courier_and_affiliate_cannot_see_bills() {
        for role in [UserRole::Courier, UserRole::Affiliate] {
            let service = BillService::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
            let err = service
                .list_bills(&auth(role), &BillQuery::default())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Forbidden));
        }
    }

    #[actix_web::test]
    async fn test_customer_cannot_mark_bill_paid() {
        let service = BillService::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let err = service
            .update_status(
                &auth(UserRole::Customer),
                Uuid::new_v4(),
                UpdateBillRequest {
                    status: BillStatus::Paid,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[actix_web::test]
    async fn test_paying_twice_conflicts() {
        let paid = bill(BillStatus::Paid);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![paid.clone()]])
            .into_connection();
        let service = BillService::new(db);

        let err = service
            .update_status(
                &auth(UserRole::Warehouse),
                paid.id,
                UpdateBillRequest {
                    status: BillStatus::Paid,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn test_missing_bill_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<bills::Model>::new()])
            .into_connection();
        let service = BillService::new(db);

        let err = service
            .update_status(
                &auth(UserRole::Admin),
                Uuid::new_v4(),
                UpdateBillRequest {
                    status: BillStatus::Paid,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_mark_paid_sets_date_and_notifies_customer() {
        let now = Utc::now();
        let unpaid = bill(BillStatus::Unpaid);
        let paid = bills::Model {
            status: BillStatus::Paid,
            paid_date: Some(now),
            ..unpaid.clone()
        };
        let customer = users::Model {
            id: unpaid.user_id,
            name: "Bu Sari".to_string(),
            email: "sari@example.com".to_string(),
            phone: "6281298765432".to_string(),
            address: Some("Jl. Melati 4".to_string()),
            password_hash: "x".to_string(),
            role: UserRole::Customer,
            is_active: true,
            referral_code: "SARI0001".to_string(),
            referred_by_id: None,
            created_at: now,
            updated_at: now,
        };
        let pickup = pickups::Model {
            id: unpaid.pickup_id,
            customer_id: customer.id,
            courier_id: None,
            status: PickupStatus::Completed,
            scheduled_date: now,
            actual_date: Some(now),
            volume: dec!(10),
            actual_volume: Some(dec!(10)),
            total_price: dec!(60000),
            courier_fee: Decimal::ZERO,
            affiliate_fee: Decimal::ZERO,
            address: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let note = notifications::Model {
            id: Uuid::new_v4(),
            user_id: customer.id,
            title: "Pembayaran Diterima".to_string(),
            message: "Pembayaran minyak jelantah sebesar Rp 60.000 telah dibayarkan".to_string(),
            notification_type: NotificationType::PaymentReceived,
            related_id: Some(unpaid.id),
            is_read: false,
            created_at: now,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![unpaid.clone()]])
            .append_query_results(vec![vec![paid]])
            .append_query_results(vec![vec![note]])
            .append_query_results(vec![vec![pickup]])
            .append_query_results(vec![vec![customer.clone()]])
            .append_query_results(vec![vec![customer.clone()]])
            .into_connection();
        let service = BillService::new(db);

        let resp = service
            .update_status(
                &auth(UserRole::Warehouse),
                unpaid.id,
                UpdateBillRequest {
                    status: BillStatus::Paid,
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status, BillStatus::Paid);
        assert!(resp.paid_date.is_some());
        assert_eq!(resp.user.as_ref().map(|u| u.id), Some(customer.id));
        assert_eq!(resp.pickup.as_ref().map(|p| p.id), Some(unpaid.pickup_id));

        let log = format!("{:?}", service.pool.into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("PAYMENT_RECEIVED"));
        assert!(log.contains("Pembayaran minyak jelantah sebesar Rp 60.000 telah dibayarkan"));
    }
}
