use crate::entities::{
    BillStatus, CommissionStatus, CommissionType, NotificationType, PickupStatus, UserRole,
    bill_entity as bills, commission_entity as commissions, pickup_entity as pickups,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::policy::{self, PickupScope};
use crate::services::notification_service::notify;
use crate::services::settings_service::{Rates, load_rates};
use crate::services::user_service::summaries_by_ids;
use crate::utils::{AuthUser, DateRange, format_rupiah, parse_datetime};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

/// Money derived from the weighed volume when a pickup completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionAmounts {
    pub total_price: Decimal,
    pub courier_fee: Decimal,
    pub affiliate_fee: Decimal,
}

pub fn completion_amounts(
    volume: Decimal,
    rates: &Rates,
    has_courier: bool,
    has_affiliate: bool,
) -> CompletionAmounts {
    CompletionAmounts {
        total_price: volume * rates.buy_price_per_liter,
        courier_fee: if has_courier {
            volume * rates.courier_fee_per_liter
        } else {
            Decimal::ZERO
        },
        affiliate_fee: if has_affiliate {
            volume * rates.affiliate_fee_per_liter
        } else {
            Decimal::ZERO
        },
    }
}

/// Attach customer and courier cards to pickup rows.
pub async fn with_parties<C>(db: &C, rows: Vec<pickups::Model>) -> AppResult<Vec<PickupResponse>>
where
    C: ConnectionTrait,
{
    let mut ids: Vec<Uuid> = rows
        .iter()
        .flat_map(|p| std::iter::once(p.customer_id).chain(p.courier_id))
        .collect();
    ids.sort();
    ids.dedup();
    let people = summaries_by_ids(db, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|p| {
            let customer = people.get(&p.customer_id).cloned();
            let courier = p.courier_id.and_then(|id| people.get(&id).cloned());
            let mut resp = PickupResponse::from(p);
            resp.customer = customer;
            resp.courier = courier;
            resp
        })
        .collect())
}

fn format_day(at: chrono::DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}

pub struct PickupService {
    pool: DatabaseConnection,
}

impl PickupService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_pickups(
        &self,
        user: &AuthUser,
        query: &PickupQuery,
    ) -> AppResult<PaginatedResponse<PickupResponse>> {
        let scope = policy::pickup_scope(user)?;
        let range = DateRange::from_query(query.start_date.as_deref(), query.end_date.as_deref())?;
        let params = PaginationParams::new(query.page, query.limit);

        let mut select = pickups::Entity::find();
        match scope {
            PickupScope::All => {}
            PickupScope::AsCustomer(id) => {
                select = select.filter(pickups::Column::CustomerId.eq(id));
            }
            PickupScope::AsCourier(id) => {
                select = select.filter(pickups::Column::CourierId.eq(id));
            }
        }
        if let Some(status) = query.status {
            select = select.filter(pickups::Column::Status.eq(status));
        }
        if let Some(range) = range {
            select = select
                .filter(pickups::Column::ScheduledDate.gte(range.starts_at()))
                .filter(pickups::Column::ScheduledDate.lt(range.ends_before()));
        }

        let total = select.clone().count(&self.pool).await?;
        let rows = select
            .order_by_desc(pickups::Column::ScheduledDate)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;

        let data = with_parties(&self.pool, rows).await?;
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn create_pickup(
        &self,
        user: &AuthUser,
        request: CreatePickupRequest,
    ) -> AppResult<PickupResponse> {
        let customer_id = match user.role {
            UserRole::Customer => user.id,
            UserRole::Admin | UserRole::Warehouse => {
                let id = request.customer_id.ok_or_else(|| {
                    AppError::ValidationError("customer_id is required".to_string())
                })?;
                let customer = users::Entity::find_by_id(id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;
                if customer.role != UserRole::Customer {
                    return Err(AppError::ValidationError(
                        "Pickups can only be scheduled for a CUSTOMER".to_string(),
                    ));
                }
                id
            }
            UserRole::Courier | UserRole::Affiliate => return Err(AppError::Forbidden),
        };

        if request.volume <= Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Volume must be greater than zero".to_string(),
            ));
        }
        let scheduled_date = parse_datetime(&request.scheduled_date)?;
        let now = Utc::now();

        let pickup = pickups::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            courier_id: Set(None),
            status: Set(PickupStatus::Pending),
            scheduled_date: Set(scheduled_date),
            actual_date: Set(None),
            volume: Set(request.volume),
            actual_volume: Set(None),
            total_price: Set(Decimal::ZERO),
            courier_fee: Set(Decimal::ZERO),
            affiliate_fee: Set(Decimal::ZERO),
            address: Set(request.address.filter(|a| !a.trim().is_empty())),
            notes: Set(request.notes.filter(|n| !n.trim().is_empty())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Pickup {} scheduled for customer {customer_id}", pickup.id);
        Ok(PickupResponse::from(pickup))
    }

    pub async fn assign_courier(
        &self,
        user: &AuthUser,
        id: Uuid,
        request: AssignCourierRequest,
    ) -> AppResult<PickupResponse> {
        policy::require_staff(user)?;

        let txn = self.pool.begin().await?;

        let pickup = pickups::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Pickup not found".to_string()))?;
        if !pickup.status.is_assignable() {
            return Err(AppError::Conflict(format!(
                "Pickup is {} and can no longer be assigned",
                pickup.status
            )));
        }

        let courier = users::Entity::find_by_id(request.courier_id)
            .one(&txn)
            .await?
            .filter(|u| u.role == UserRole::Courier && u.is_active)
            .ok_or_else(|| {
                AppError::ValidationError("courier_id must be an active COURIER".to_string())
            })?;

        let mut model = pickup.into_active_model();
        model.courier_id = Set(Some(courier.id));
        model.status = Set(PickupStatus::Scheduled);
        model.updated_at = Set(Utc::now());
        let pickup = model.update(&txn).await?;

        let day = format_day(pickup.scheduled_date);
        notify(
            &txn,
            courier.id,
            "Tugas Pickup Baru",
            format!("Anda ditugaskan mengambil minyak jelantah pada {day}"),
            NotificationType::PickupScheduled,
            Some(pickup.id),
        )
        .await?;
        notify(
            &txn,
            pickup.customer_id,
            "Pickup Dijadwalkan",
            format!("Pickup minyak jelantah Anda dijadwalkan pada {day}"),
            NotificationType::PickupScheduled,
            Some(pickup.id),
        )
        .await?;

        txn.commit().await?;

        log::info!("Pickup {} assigned to courier {}", pickup.id, courier.id);
        let mut out = with_parties(&self.pool, vec![pickup]).await?;
        out.pop()
            .ok_or_else(|| AppError::InternalError("Pickup vanished after update".to_string()))
    }

    /// Weigh-in: fixes the price, raises the customer's bill and the commissions.
    pub async fn complete_pickup(
        &self,
        user: &AuthUser,
        id: Uuid,
        request: CompletePickupRequest,
    ) -> AppResult<PickupResponse> {
        if !matches!(
            user.role,
            UserRole::Admin | UserRole::Warehouse | UserRole::Courier
        ) {
            return Err(AppError::Forbidden);
        }
        if request.actual_volume < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "actual_volume must not be negative".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        let pickup = pickups::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Pickup not found".to_string()))?;
        if user.role == UserRole::Courier && pickup.courier_id != Some(user.id) {
            return Err(AppError::Forbidden);
        }
        if pickup.status != PickupStatus::Scheduled {
            return Err(AppError::Conflict(format!(
                "Only SCHEDULED pickups can be completed (current: {})",
                pickup.status
            )));
        }

        let rates = load_rates(&txn).await?;
        let customer = users::Entity::find_by_id(pickup.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;
        let affiliate = match customer.referred_by_id {
            Some(ref_id) => users::Entity::find_by_id(ref_id)
                .one(&txn)
                .await?
                .filter(|u| u.role == UserRole::Affiliate),
            None => None,
        };

        let volume = request.actual_volume;
        let amounts = completion_amounts(
            volume,
            &rates,
            pickup.courier_id.is_some(),
            affiliate.is_some(),
        );
        let now = Utc::now();
        let courier_id = pickup.courier_id;

        let mut model = pickup.into_active_model();
        model.status = Set(PickupStatus::Completed);
        model.actual_date = Set(Some(now));
        model.actual_volume = Set(Some(volume));
        model.total_price = Set(amounts.total_price);
        model.courier_fee = Set(amounts.courier_fee);
        model.affiliate_fee = Set(amounts.affiliate_fee);
        model.updated_at = Set(now);
        let pickup = model.update(&txn).await?;

        let bill = bills::ActiveModel {
            id: Set(Uuid::new_v4()),
            pickup_id: Set(pickup.id),
            user_id: Set(customer.id),
            amount: Set(amounts.total_price),
            status: Set(BillStatus::Unpaid),
            paid_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let payees = [
            (courier_id, CommissionType::Courier, amounts.courier_fee),
            (
                affiliate.as_ref().map(|a| a.id),
                CommissionType::Affiliate,
                amounts.affiliate_fee,
            ),
        ];
        for (payee, commission_type, amount) in payees {
            let Some(payee) = payee else { continue };
            if amount <= Decimal::ZERO {
                continue;
            }
            commissions::ActiveModel {
                id: Set(Uuid::new_v4()),
                pickup_id: Set(pickup.id),
                user_id: Set(payee),
                commission_type: Set(commission_type),
                amount: Set(amount),
                status: Set(CommissionStatus::Pending),
                paid_date: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        notify(
            &txn,
            customer.id,
            "Pickup Selesai",
            format!(
                "Pickup {volume} liter selesai. Tagihan sebesar Rp {} telah dibuat",
                format_rupiah(bill.amount)
            ),
            NotificationType::PickupCompleted,
            Some(pickup.id),
        )
        .await?;

        txn.commit().await?;

        log::info!(
            "Pickup {} completed: {volume} L, bill {} of {}",
            pickup.id,
            bill.id,
            bill.amount
        );
        let mut out = with_parties(&self.pool, vec![pickup]).await?;
        out.pop()
            .ok_or_else(|| AppError::InternalError("Pickup vanished after update".to_string()))
    }

    pub async fn cancel_pickup(&self, user: &AuthUser, id: Uuid) -> AppResult<PickupResponse> {
        let txn = self.pool.begin().await?;

        let pickup = pickups::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Pickup not found".to_string()))?;

        let allowed = match user.role {
            UserRole::Admin | UserRole::Warehouse => true,
            UserRole::Customer => pickup.customer_id == user.id,
            UserRole::Courier | UserRole::Affiliate => false,
        };
        if !allowed {
            return Err(AppError::Forbidden);
        }
        if !pickup.status.is_cancellable() {
            return Err(AppError::Conflict(format!(
                "Pickup is {} and can no longer be cancelled",
                pickup.status
            )));
        }

        let mut model = pickup.into_active_model();
        model.status = Set(PickupStatus::Cancelled);
        model.updated_at = Set(Utc::now());
        let pickup = model.update(&txn).await?;

        txn.commit().await?;

        log::info!("Pickup {} cancelled by {}", pickup.id, user.email);
        Ok(PickupResponse::from(pickup))
    }
}
