pub mod jwt;
pub mod money;
pub mod password;
pub mod period;
pub mod phone;
pub mod referral_code;

pub use jwt::*;
pub use money::format_rupiah;
pub use password::*;
pub use period::*;
pub use phone::*;
pub use referral_code::{generate_referral_code, generate_unique_referral_code};
