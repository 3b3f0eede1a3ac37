//! Role-based visibility rules.
//!
//! Every handler asks this module what the caller may see or do before touching the
//! database, so the whole matrix lives in one place:
//!
//! | Resource            | ADMIN | WAREHOUSE | COURIER  | CUSTOMER | AFFILIATE |
//! |---------------------|-------|-----------|----------|----------|-----------|
//! | users               | full  | -         | -        | -        | -         |
//! | bills               | all   | all       | -        | own      | -         |
//! | commissions         | all   | all       | own      | own      | own       |
//! | other expenses      | crud  | read      | -        | -        | -         |
//! | pickups (list)      | all   | all       | assigned | own      | -         |
//! | bookkeeping         | yes   | yes       | -        | -        | -         |
//! | /admin pages        | all   | pembukuan | -        | -        | -         |

use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use crate::utils::AuthUser;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Which rows of an owner-scoped resource the caller may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Own(Uuid),
}

/// Pickups have two owners: the customer and the assigned courier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupScope {
    All,
    AsCustomer(Uuid),
    AsCourier(Uuid),
}

fn is_staff(role: UserRole) -> bool {
    matches!(role, UserRole::Admin | UserRole::Warehouse)
}

pub fn require_admin(user: &AuthUser) -> AppResult<()> {
    if user.role == UserRole::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// ADMIN and WAREHOUSE run the back office.
pub fn require_staff(user: &AuthUser) -> AppResult<()> {
    if is_staff(user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn bill_scope(user: &AuthUser) -> AppResult<Scope> {
    match user.role {
        UserRole::Admin | UserRole::Warehouse => Ok(Scope::All),
        UserRole::Customer => Ok(Scope::Own(user.id)),
        UserRole::Courier | UserRole::Affiliate => Err(AppError::Forbidden),
    }
}

pub fn commission_scope(user: &AuthUser) -> AppResult<Scope> {
    match user.role {
        UserRole::Admin | UserRole::Warehouse => Ok(Scope::All),
        UserRole::Courier | UserRole::Customer | UserRole::Affiliate => Ok(Scope::Own(user.id)),
    }
}

pub fn require_commission_update(user: &AuthUser) -> AppResult<()> {
    if is_staff(user.role) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "Only ADMIN and WAREHOUSE can update commission status".to_string(),
        ))
    }
}

pub fn pickup_scope(user: &AuthUser) -> AppResult<PickupScope> {
    match user.role {
        UserRole::Admin | UserRole::Warehouse => Ok(PickupScope::All),
        UserRole::Courier => Ok(PickupScope::AsCourier(user.id)),
        UserRole::Customer => Ok(PickupScope::AsCustomer(user.id)),
        UserRole::Affiliate => Err(AppError::Forbidden),
    }
}

pub fn require_expense_read(user: &AuthUser) -> AppResult<()> {
    require_staff(user)
}

pub fn require_expense_write(user: &AuthUser) -> AppResult<()> {
    require_admin(user)
}

pub fn require_bookkeeping(user: &AuthUser) -> AppResult<()> {
    require_staff(user)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageAccess {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl PageAccess {
    fn allow() -> Self {
        Self {
            allowed: true,
            redirect_to: None,
        }
    }

    fn redirect(to: &str) -> Self {
        Self {
            allowed: false,
            redirect_to: Some(to.to_string()),
        }
    }
}

/// Gate for the `/admin/*` pages of the back-office front end.
pub fn admin_page_access(role: Option<UserRole>, path: &str) -> PageAccess {
    match role {
        None => PageAccess::redirect("/login"),
        Some(UserRole::Admin) => PageAccess::allow(),
        Some(UserRole::Warehouse) if path.starts_with("/admin/pembukuan") => PageAccess::allow(),
        Some(_) => PageAccess::redirect("/dashboard"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: format!("{role}@example.com").to_lowercase(),
            role,
        }
    }

    const ALL_ROLES: [UserRole; 5] = [
        UserRole::Admin,
        UserRole::Warehouse,
        UserRole::Courier,
        UserRole::Customer,
        UserRole::Affiliate,
    ];

    #[test]
    fn test_user_management_is_admin_only() {
        for role in ALL_ROLES {
            assert_eq!(require_admin(&user(role)).is_ok(), role == UserRole::Admin);
        }
    }

    #[test]
    fn test_bill_scope() {
        assert_eq!(bill_scope(&user(UserRole::Admin)).unwrap(), Scope::All);
        assert_eq!(bill_scope(&user(UserRole::Warehouse)).unwrap(), Scope::All);

        let customer = user(UserRole::Customer);
        assert_eq!(bill_scope(&customer).unwrap(), Scope::Own(customer.id));

        assert!(bill_scope(&user(UserRole::Courier)).is_err());
        assert!(bill_scope(&user(UserRole::Affiliate)).is_err());
    }

    #[test]
    fn test_commission_scope() {
        assert_eq!(commission_scope(&user(UserRole::Admin)).unwrap(), Scope::All);
        assert_eq!(commission_scope(&user(UserRole::Warehouse)).unwrap(), Scope::All);
        for role in [UserRole::Courier, UserRole::Customer, UserRole::Affiliate] {
            let u = user(role);
            assert_eq!(commission_scope(&u).unwrap(), Scope::Own(u.id));
        }
    }

    #[test]
    fn test_commission_update_requires_staff() {
        assert!(require_commission_update(&user(UserRole::Admin)).is_ok());
        assert!(require_commission_update(&user(UserRole::Warehouse)).is_ok());
        assert!(matches!(
            require_commission_update(&user(UserRole::Courier)),
            Err(AppError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_other_expenses_matrix() {
        for role in ALL_ROLES {
            let u = user(role);
            let staff = matches!(role, UserRole::Admin | UserRole::Warehouse);
            assert_eq!(require_expense_read(&u).is_ok(), staff);
            assert_eq!(require_expense_write(&u).is_ok(), role == UserRole::Admin);
        }
    }

    #[test]
    fn test_pickup_scope() {
        let courier = user(UserRole::Courier);
        let customer = user(UserRole::Customer);
        assert_eq!(pickup_scope(&user(UserRole::Warehouse)).unwrap(), PickupScope::All);
        assert_eq!(
            pickup_scope(&courier).unwrap(),
            PickupScope::AsCourier(courier.id)
        );
        assert_eq!(
            pickup_scope(&customer).unwrap(),
            PickupScope::AsCustomer(customer.id)
        );
        assert!(pickup_scope(&user(UserRole::Affiliate)).is_err());
    }

    #[test]
    fn test_admin_page_access() {
        assert_eq!(
            admin_page_access(None, "/admin/pembukuan"),
            PageAccess::redirect("/login")
        );
        assert!(admin_page_access(Some(UserRole::Admin), "/admin/users").allowed);
        assert!(admin_page_access(Some(UserRole::Warehouse), "/admin/pembukuan").allowed);
        assert!(admin_page_access(Some(UserRole::Warehouse), "/admin/pembukuan/2025").allowed);
        assert_eq!(
            admin_page_access(Some(UserRole::Warehouse), "/admin/users"),
            PageAccess::redirect("/dashboard")
        );
        for role in [UserRole::Courier, UserRole::Customer, UserRole::Affiliate] {
            assert_eq!(
                admin_page_access(Some(role), "/admin/pembukuan"),
                PageAccess::redirect("/dashboard")
            );
        }
    }
}
