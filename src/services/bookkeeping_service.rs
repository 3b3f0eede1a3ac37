use crate::entities::{
    BillStatus, CommissionStatus, PickupStatus, bill_entity as bills,
    commission_entity as commissions, other_expense_entity as other_expenses,
    pickup_entity as pickups,
};
use crate::error::AppResult;
use crate::models::*;
use crate::services::settings_service::{Rates, load_rates};
use crate::services::{bill_service, commission_service, pickup_service};
use crate::utils::DateRange;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Day a pickup is booked on: when it was weighed, or failing that when it was planned.
fn pickup_day(p: &pickups::Model) -> DateTime<Utc> {
    p.actual_date.unwrap_or(p.scheduled_date)
}

fn paid_in(range: &DateRange, paid_date: Option<DateTime<Utc>>) -> bool {
    paid_date.is_some_and(|d| range.contains(d))
}

/// Profit and loss over `range`. Rows outside the range or in the wrong state are ignored.
pub fn compute_summary(
    range: &DateRange,
    rates: &Rates,
    pickup_rows: &[pickups::Model],
    bill_rows: &[bills::Model],
    commission_rows: &[commissions::Model],
    expense_rows: &[other_expenses::Model],
) -> BookkeepingSummary {
    let total_volume: Decimal = pickup_rows
        .iter()
        .filter(|p| p.status == PickupStatus::Completed && range.contains(pickup_day(p)))
        .map(pickups::Model::effective_volume)
        .sum();
    let revenue = total_volume * rates.selling_price_per_liter;

    let customer_payments: Decimal = bill_rows
        .iter()
        .filter(|b| b.status == BillStatus::Paid && paid_in(range, b.paid_date))
        .map(|b| b.amount)
        .sum();
    let commissions_paid: Decimal = commission_rows
        .iter()
        .filter(|c| c.status == CommissionStatus::Paid && paid_in(range, c.paid_date))
        .map(|c| c.amount)
        .sum();
    let investor_fee = total_volume * rates.investor_fee_per_liter;
    let other: Decimal = expense_rows
        .iter()
        .filter(|e| range.contains(e.date))
        .map(|e| e.amount)
        .sum();

    let total_expenses = customer_payments + commissions_paid + investor_fee + other;

    BookkeepingSummary {
        revenue,
        total_volume,
        customer_payments,
        commissions: commissions_paid,
        investor_fee,
        other_expenses: other,
        total_expenses,
        net_profit: revenue - total_expenses,
        selling_price_per_liter: rates.selling_price_per_liter,
        investor_fee_per_liter: rates.investor_fee_per_liter,
    }
}

pub struct BookkeepingService {
    pool: DatabaseConnection,
}

impl BookkeepingService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn summary(&self, range: DateRange) -> AppResult<BookkeepingReport> {
        let (from, until) = (range.starts_at(), range.ends_before());
        let rates = load_rates(&self.pool).await?;

        let pickup_rows = pickups::Entity::find()
            .filter(pickups::Column::Status.eq(PickupStatus::Completed))
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(pickups::Column::ActualDate.gte(from))
                            .add(pickups::Column::ActualDate.lt(until)),
                    )
                    .add(
                        Condition::all()
                            .add(pickups::Column::ActualDate.is_null())
                            .add(pickups::Column::ScheduledDate.gte(from))
                            .add(pickups::Column::ScheduledDate.lt(until)),
                    ),
            )
            .order_by_desc(pickups::Column::ActualDate)
            .all(&self.pool)
            .await?;

        let bill_rows = bills::Entity::find()
            .filter(bills::Column::Status.eq(BillStatus::Paid))
            .filter(bills::Column::PaidDate.gte(from))
            .filter(bills::Column::PaidDate.lt(until))
            .order_by_desc(bills::Column::PaidDate)
            .all(&self.pool)
            .await?;

        let commission_rows = commissions::Entity::find()
            .filter(commissions::Column::Status.eq(CommissionStatus::Paid))
            .filter(commissions::Column::PaidDate.gte(from))
            .filter(commissions::Column::PaidDate.lt(until))
            .order_by_desc(commissions::Column::PaidDate)
            .all(&self.pool)
            .await?;

        let expense_rows = other_expenses::Entity::find()
            .filter(other_expenses::Column::Date.gte(from))
            .filter(other_expenses::Column::Date.lt(until))
            .order_by_desc(other_expenses::Column::Date)
            .all(&self.pool)
            .await?;

        let summary = compute_summary(
            &range,
            &rates,
            &pickup_rows,
            &bill_rows,
            &commission_rows,
            &expense_rows,
        );
        log::debug!(
            "Bookkeeping {}..{}: revenue {}, net {}",
            range.start_date,
            range.end_date,
            summary.revenue,
            summary.net_profit
        );

        Ok(BookkeepingReport {
            period: range,
            summary,
            pickups: pickup_service::with_parties(&self.pool, pickup_rows).await?,
            bills: bill_service::with_details(&self.pool, bill_rows).await?,
            commissions: commission_service::with_details(&self.pool, commission_rows).await?,
            other_expenses: expense_rows
                .into_iter()
                .map(OtherExpenseResponse::from)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CommissionType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn march() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn at(day: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap()
            .and_utc()
    }

    fn pickup(volume: Decimal, actual: Option<Decimal>, status: PickupStatus) -> pickups::Model {
        pickups::Model {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            courier_id: None,
            status,
            scheduled_date: at(10),
            actual_date: Some(at(11)),
            volume,
            actual_volume: actual,
            total_price: Decimal::ZERO,
            courier_fee: Decimal::ZERO,
            affiliate_fee: Decimal::ZERO,
            address: None,
            notes: None,
            created_at: at(1),
            updated_at: at(11),
        }
    }

    fn bill(amount: Decimal, paid: Option<DateTime<Utc>>) -> bills::Model {
        bills::Model {
            id: Uuid::new_v4(),
            pickup_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount,
            status: if paid.is_some() {
                BillStatus::Paid
            } else {
                BillStatus::Unpaid
            },
            paid_date: paid,
            created_at: at(11),
            updated_at: at(11),
        }
    }

    fn commission(amount: Decimal, status: CommissionStatus) -> commissions::Model {
        commissions::Model {
            id: Uuid::new_v4(),
            pickup_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            commission_type: CommissionType::Courier,
            amount,
            status,
            paid_date: (status == CommissionStatus::Paid).then(|| at(12)),
            created_at: at(11),
            updated_at: at(12),
        }
    }

    fn expense(amount: Decimal, date: DateTime<Utc>) -> other_expenses::Model {
        other_expenses::Model {
            id: Uuid::new_v4(),
            description: "Bensin".to_string(),
            amount,
            date,
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn test_empty_period_is_all_zero() {
        let summary = compute_summary(&march(), &Rates::default(), &[], &[], &[], &[]);
        assert_eq!(summary.revenue, Decimal::ZERO);
        assert_eq!(summary.total_expenses, Decimal::ZERO);
        assert_eq!(summary.net_profit, Decimal::ZERO);
    }

    #[test]
    fn test_worked_example() {
        let summary = compute_summary(
            &march(),
            &Rates::default(),
            &[pickup(dec!(12), Some(dec!(10)), PickupStatus::Completed)],
            &[bill(dec!(20000), Some(at(12)))],
            &[commission(dec!(3000), CommissionStatus::Paid)],
            &[expense(dec!(1000), at(15))],
        );

        assert_eq!(summary.total_volume, dec!(10));
        assert_eq!(summary.revenue, dec!(80000));
        assert_eq!(summary.investor_fee, dec!(5000));
        assert_eq!(summary.total_expenses, dec!(29000));
        assert_eq!(summary.net_profit, dec!(51000));
    }

    #[test]
    fn test_actual_volume_overrides_planned_even_when_zero() {
        let summary = compute_summary(
            &march(),
            &Rates::default(),
            &[pickup(dec!(20), Some(dec!(0)), PickupStatus::Completed)],
            &[],
            &[],
            &[],
        );
        assert_eq!(summary.total_volume, Decimal::ZERO);
        assert_eq!(summary.investor_fee, Decimal::ZERO);
    }

    #[test]
    fn test_only_settled_rows_in_range_count() {
        let mut outside = pickup(dec!(5), None, PickupStatus::Completed);
        outside.actual_date = Some(at(31) + chrono::Duration::days(1));

        let summary = compute_summary(
            &march(),
            &Rates::default(),
            &[
                pickup(dec!(5), None, PickupStatus::Scheduled),
                outside,
                pickup(dec!(2), None, PickupStatus::Completed),
            ],
            &[bill(dec!(12000), None)],
            &[
                commission(dec!(600), CommissionStatus::Pending),
                commission(dec!(600), CommissionStatus::Cancelled),
            ],
            &[expense(dec!(700), at(1) - chrono::Duration::days(1))],
        );

        assert_eq!(summary.total_volume, dec!(2));
        assert_eq!(summary.customer_payments, Decimal::ZERO);
        assert_eq!(summary.commissions, Decimal::ZERO);
        assert_eq!(summary.other_expenses, Decimal::ZERO);
        assert_eq!(summary.net_profit, dec!(16000) - dec!(1000));
    }

    #[test]
    fn test_pickup_without_actual_date_uses_scheduled_date() {
        let mut p = pickup(dec!(3), None, PickupStatus::Completed);
        p.actual_date = None;
        let summary = compute_summary(&march(), &Rates::default(), &[p], &[], &[], &[]);
        assert_eq!(summary.total_volume, dec!(3));
    }

    #[test]
    fn test_revenue_grows_with_each_completed_pickup() {
        let mut rows = Vec::new();
        let mut last = Decimal::ZERO;
        for liters in [dec!(0), dec!(1.5), dec!(7), dec!(0.25)] {
            rows.push(pickup(liters, None, PickupStatus::Completed));
            let summary = compute_summary(&march(), &Rates::default(), &rows, &[], &[], &[]);
            assert!(summary.revenue >= last);
            assert_eq!(summary.net_profit, summary.revenue - summary.total_expenses);
            last = summary.revenue;
        }
    }
}
