pub mod access;
pub mod auth;
pub mod bills;
pub mod commissions;
pub mod notifications;
pub mod other_expenses;
pub mod pembukuan;
pub mod pickups;
pub mod settings;
pub mod users;

pub use access::access_config;
pub use auth::auth_config;
pub use bills::bills_config;
pub use commissions::commissions_config;
pub use notifications::notifications_config;
pub use other_expenses::other_expenses_config;
pub use pembukuan::pembukuan_config;
pub use pickups::pickups_config;
pub use settings::settings_config;
pub use users::users_config;
