//! Views of the dashboard and the rules for reaching them

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::auth::User;
use crate::error::{Error, Result};

/// A view of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Products,
    Users,
    Audit,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/auth",
            Route::Dashboard => "/dashboard",
            Route::Products => "/products",
            Route::Users => "/users",
            Route::Audit => "/audit",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, Route::Users | Route::Audit)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "/auth" | "/" => Ok(Route::Login),
            "/dashboard" => Ok(Route::Dashboard),
            "/products" => Ok(Route::Products),
            "/users" => Ok(Route::Users),
            "/audit" => Ok(Route::Audit),
            other => Err(Error::general(format!("Unknown route: {}", other))),
        }
    }
}

/// Where a user asking for `route` actually ends up
pub fn guard(route: Route, user: Option<&User>) -> Route {
    match user {
        None if route.requires_auth() => Route::Login,
        Some(user) if route.requires_admin() && !user.is_admin() => Route::Dashboard,
        _ => route,
    }
}

/// Fails with `Forbidden` unless the user is an admin
pub fn require_admin(user: Option<&User>, action: &str) -> Result<()> {
    match user {
        Some(user) if user.is_admin() => Ok(()),
        Some(_) => Err(Error::forbidden(format!("Only admins can {}", action))),
        None => Err(Error::unauthorized("Not logged in")),
    }
}

/// Current route, observable by whoever renders the views
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: Arc<watch::Sender<Route>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Route {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }

    pub fn navigate(&self, route: Route) {
        self.tx.send_if_modified(|current| {
            if *current == route {
                false
            } else {
                *current = route;
                true
            }
        });
    }

    /// Send the user to the login view unless they are already there
    pub fn redirect_to_login(&self) {
        if self.current() != Route::Login {
            info!("session rejected, redirecting to {}", Route::Login);
            self.navigate(Route::Login);
        }
    }

    /// Navigate to `route` through [`guard`], returning where we landed
    pub fn visit(&self, route: Route, user: Option<&User>) -> Route {
        let target = guard(route, user);
        self.navigate(target);
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: 3,
            email: "someone@example.com".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_users_go_to_login() {
        assert_eq!(guard(Route::Products, None), Route::Login);
        assert_eq!(guard(Route::Audit, None), Route::Login);
        assert_eq!(guard(Route::Login, None), Route::Login);
    }

    #[test]
    fn non_admins_are_sent_to_dashboard() {
        let u = user(Role::User);
        assert_eq!(guard(Route::Users, Some(&u)), Route::Dashboard);
        assert_eq!(guard(Route::Audit, Some(&u)), Route::Dashboard);
        assert_eq!(guard(Route::Products, Some(&u)), Route::Products);

        let admin = user(Role::Admin);
        assert_eq!(guard(Route::Users, Some(&admin)), Route::Users);
    }

    #[test]
    fn require_admin_errors() {
        assert!(require_admin(Some(&user(Role::Admin)), "delete products").is_ok());
        assert!(matches!(
            require_admin(Some(&user(Role::User)), "delete products"),
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            require_admin(None, "delete products"),
            Err(Error::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn redirect_notifies_subscribers_once() {
        let navigator = Navigator::new(Route::Products);
        let mut rx = navigator.subscribe();

        navigator.redirect_to_login();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Route::Login);

        navigator.redirect_to_login();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn route_paths_parse_back() {
        for route in [Route::Login, Route::Dashboard, Route::Products, Route::Users, Route::Audit] {
            assert_eq!(route.path().parse::<Route>().unwrap(), route);
        }
    }
}
