pub mod bill;
pub mod bookkeeping;
pub mod commission;
pub mod common;
pub mod notification;
pub mod other_expense;
pub mod pagination;
pub mod pickup;
pub mod settings;
pub mod user;

pub use bill::*;
pub use bookkeeping::*;
pub use commission::*;
pub use common::*;
pub use notification::*;
pub use other_expense::*;
pub use pagination::*;
pub use pickup::*;
pub use settings::*;
pub use user::*;
