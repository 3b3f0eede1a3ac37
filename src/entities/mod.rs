pub mod bills;
pub mod commissions;
pub mod notifications;
pub mod other_expenses;
pub mod pickups;
pub mod settings;
pub mod users;

pub use bills as bill_entity;
pub use commissions as commission_entity;
pub use notifications as notification_entity;
pub use other_expenses as other_expense_entity;
pub use pickups as pickup_entity;
pub use settings as settings_entity;
pub use users as user_entity;

pub use bills::BillStatus;
pub use commissions::{CommissionStatus, CommissionType};
pub use notifications::NotificationType;
pub use pickups::PickupStatus;
pub use users::UserRole;
