pub mod auth_service;
pub mod bill_service;
pub mod bookkeeping_service;
pub mod commission_service;
pub mod notification_service;
pub mod other_expense_service;
pub mod pickup_service;
pub mod settings_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use bill_service::BillService;
pub use bookkeeping_service::BookkeepingService;
pub use commission_service::CommissionService;
pub use notification_service::NotificationService;
pub use other_expense_service::OtherExpenseService;
pub use pickup_service::PickupService;
pub use settings_service::{Rates, SettingsService};
pub use user_service::UserService;
