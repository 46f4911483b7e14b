//! Role-gated navigation shell
//!
//! Two independently initializing state cells — authentication and admin
//! role — joined into one route decision. No route is resolved until both
//! cells report initialized, so the UI never flashes the wrong view while
//! one subscription is still warming up.

use tokio::sync::watch;

use shared::client::UserInfo;

/// Authentication cell
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    /// The auth subscription has produced its first value
    pub initialized: bool,
    pub user: Option<UserInfo>,
}

/// Admin-role cell, fed by the token's custom claim
#[derive(Debug, Clone, Default)]
pub struct AdminState {
    /// The role subscription has produced its first value
    pub initialized: bool,
    pub is_admin: bool,
}

/// Exactly one of these is presented at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// One or both cells not initialized yet
    Loading,
    /// Unauthenticated
    Landing,
    /// Authenticated, first-time setup incomplete
    Setup,
    Employee,
    Admin,
}

/// Join both cells into one route
pub fn resolve(auth: &AuthState, admin: &AdminState) -> Route {
    // Barrier: both subscriptions must have reported before any decision
    if !auth.initialized || !admin.initialized {
        return Route::Loading;
    }

    let Some(user) = &auth.user else {
        return Route::Landing;
    };

    if !user.has_completed_setup {
        return Route::Setup;
    }

    if admin.is_admin { Route::Admin } else { Route::Employee }
}

/// Navigation shell — owns the cells and a watchable route
pub struct NavigationShell {
    auth: AuthState,
    admin: AdminState,
    route_tx: watch::Sender<Route>,
}

impl NavigationShell {
    pub fn new() -> (Self, watch::Receiver<Route>) {
        let (route_tx, route_rx) = watch::channel(Route::Loading);
        (
            Self {
                auth: AuthState::default(),
                admin: AdminState::default(),
                route_tx,
            },
            route_rx,
        )
    }

    fn publish(&self) {
        let _ = self.route_tx.send(resolve(&self.auth, &self.admin));
    }

    /// Feed one auth subscription event
    pub fn set_auth(&mut self, user: Option<UserInfo>) {
        self.auth = AuthState {
            initialized: true,
            user,
        };
        self.publish();
    }

    /// Feed one admin-role subscription event
    pub fn set_admin(&mut self, is_admin: bool) {
        self.admin = AdminState {
            initialized: true,
            is_admin,
        };
        self.publish();
    }

    pub fn route(&self) -> Route {
        resolve(&self.auth, &self.admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(setup_done: bool) -> UserInfo {
        UserInfo {
            id: "employee:a".to_string(),
            username: "asha".to_string(),
            display_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            is_admin: false,
            has_completed_setup: setup_done,
        }
    }

    #[test]
    fn test_no_route_until_both_initialized() {
        let (mut shell, rx) = NavigationShell::new();
        assert_eq!(*rx.borrow(), Route::Loading);

        // Auth arrives first; still loading until the role cell reports
        shell.set_auth(Some(user(true)));
        assert_eq!(*rx.borrow(), Route::Loading);

        shell.set_admin(false);
        assert_eq!(*rx.borrow(), Route::Employee);
    }

    #[test]
    fn test_unauthenticated_lands() {
        let (mut shell, rx) = NavigationShell::new();
        shell.set_auth(None);
        shell.set_admin(false);
        assert_eq!(*rx.borrow(), Route::Landing);
    }

    #[test]
    fn test_setup_gate_before_role_split() {
        let (mut shell, _rx) = NavigationShell::new();
        shell.set_auth(Some(user(false)));
        shell.set_admin(true);
        // Setup wins even for admins
        assert_eq!(shell.route(), Route::Setup);
    }

    #[test]
    fn test_admin_route() {
        let (mut shell, _rx) = NavigationShell::new();
        shell.set_auth(Some(user(true)));
        shell.set_admin(true);
        assert_eq!(shell.route(), Route::Admin);
    }

    #[test]
    fn test_late_auth_change_reroutes() {
        let (mut shell, rx) = NavigationShell::new();
        shell.set_auth(Some(user(true)));
        shell.set_admin(false);
        assert_eq!(*rx.borrow(), Route::Employee);

        // Sign-out event from the auth subscription
        shell.set_auth(None);
        assert_eq!(*rx.borrow(), Route::Landing);
    }
}
