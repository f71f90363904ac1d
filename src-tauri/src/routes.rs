//! Screen routes and role guards.

use serde::Serialize;

use crate::models::{Role, User};

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Pos,
    OwnerMenu,
    OwnerCategories,
    OwnerPredikat,
    OwnerTax,
    OwnerProfit,
    OwnerTrends,
    KitchenOrders,
    KitchenStock,
    NotFound,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Login,
        Route::Pos,
        Route::OwnerMenu,
        Route::OwnerCategories,
        Route::OwnerPredikat,
        Route::OwnerTax,
        Route::OwnerProfit,
        Route::OwnerTrends,
        Route::KitchenOrders,
        Route::KitchenStock,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Pos => "/pos",
            Route::OwnerMenu => "/owner/menu",
            Route::OwnerCategories => "/owner/kategori",
            Route::OwnerPredikat => "/owner/predikat",
            Route::OwnerTax => "/owner/pajak",
            Route::OwnerProfit => "/owner/keuntungan",
            Route::OwnerTrends => "/owner/tren",
            Route::KitchenOrders => "/kitchen/pesanan",
            Route::KitchenStock => "/kitchen/stok",
            Route::NotFound => "*",
        }
    }

    /// Unknown paths map to [`Route::NotFound`].
    pub fn from_path(path: &str) -> Route {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .unwrap_or(Route::NotFound)
    }

    /// Role allowed on this route; `None` for public routes.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Login | Route::NotFound => None,
            Route::Pos => Some(Role::Cashier),
            Route::OwnerMenu
            | Route::OwnerCategories
            | Route::OwnerPredikat
            | Route::OwnerTax
            | Route::OwnerProfit
            | Route::OwnerTrends => Some(Role::Owner),
            Route::KitchenOrders | Route::KitchenStock => Some(Role::Kitchen),
        }
    }
}

pub fn default_route(role: Role) -> Route {
    match role {
        Role::Owner => Route::OwnerMenu,
        Role::Cashier => Route::Pos,
        Role::Kitchen => Route::KitchenOrders,
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "action", content = "route", rename_all = "lowercase")]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

/// Guards a protected route: no session goes to login, a role mismatch goes
/// to that role's landing page.
pub fn guard(path: &str, user: Option<&User>) -> Navigation {
    let route = Route::from_path(path);
    let Some(required) = route.required_role() else {
        return Navigation::Render(route);
    };

    match user {
        None => Navigation::Redirect(Route::Login),
        Some(user) if user.role != required => Navigation::Redirect(default_route(user.role)),
        Some(_) => Navigation::Render(route),
    }
}
