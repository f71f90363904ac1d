//! Demo login and the process-wide session.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{PosError, Result};
use crate::models::{Role, User};
use crate::session::KeyValueStore;

/// Storage key of the serialized logged-in user.
pub const SESSION_KEY: &str = "pos_user";

const DEMO_PASSWORD: &str = "123456";

/// Fixed demonstration accounts, one per role.
pub fn demo_accounts() -> Vec<User> {
    vec![
        User {
            id: "1".to_string(),
            username: "owner".to_string(),
            name: "Owner".to_string(),
            role: Role::Owner,
        },
        User {
            id: "2".to_string(),
            username: "kasir".to_string(),
            name: "Kasir".to_string(),
            role: Role::Cashier,
        },
        User {
            id: "3".to_string(),
            username: "dapur".to_string(),
            name: "Dapur".to_string(),
            role: Role::Kitchen,
        },
    ]
}

pub fn authenticate(username: &str, password: &str) -> Result<User> {
    demo_accounts()
        .into_iter()
        .find(|user| user.username == username && password == DEMO_PASSWORD)
        .ok_or(PosError::InvalidCredentials)
}

/// Checks credentials after the simulated network delay. Holds no session
/// state, so callers can await it without locking the [`AuthContext`].
pub async fn verify_login(username: &str, password: &str, delay: Duration) -> Result<User> {
    tokio::time::sleep(delay).await;
    authenticate(username, password).inspect_err(|_| warn!(username, "login failed"))
}

pub struct AuthContext {
    store: Box<dyn KeyValueStore>,
    user: Option<User>,
    login_delay: Duration,
}

impl AuthContext {
    /// Restores the session from `store` once. A record that does not parse
    /// is removed and the context starts logged out.
    pub fn init(store: Box<dyn KeyValueStore>, login_delay: Duration) -> Self {
        let mut ctx = AuthContext {
            store,
            user: None,
            login_delay,
        };

        match ctx.store.get(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    info!(username = %user.username, "session restored");
                    ctx.user = Some(user);
                }
                Err(e) => {
                    warn!(error = %e, "discarding malformed session record");
                    if let Err(e) = ctx.store.remove(SESSION_KEY) {
                        warn!(error = %e, "failed to clear session record");
                    }
                }
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "session store unavailable"),
        }

        ctx
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn login_delay(&self) -> Duration {
        self.login_delay
    }

    /// Persists an authenticated user as the current session.
    pub fn establish(&mut self, user: User) -> Result<()> {
        self.store.set(SESSION_KEY, &serde_json::to_string(&user)?)?;
        info!(username = %user.username, "logged in");
        self.user = Some(user);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(SESSION_KEY)?;
        if let Some(user) = self.user.take() {
            info!(username = %user.username, "logged out");
        }
        Ok(())
    }
}
