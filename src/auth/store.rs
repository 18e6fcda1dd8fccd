//! Auth store: current user, token, and the actions that change them

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::session::{Session, SessionHandle};
use super::types::{Role, TokenClaims, User};
use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::navigation::Route;

/// A 401 from login or signup means bad credentials, not an expired session
fn credential_error(err: &Error) -> String {
    match err {
        Error::Unauthorized(message) => message.clone(),
        other => other.user_message(),
    }
}

/// Point-in-time view of the auth store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Status {
    is_loading: bool,
    error: Option<String>,
}

/// Holds the logged-in user and exposes login, signup, logout and refresh
#[derive(Debug, Clone)]
pub struct AuthStore {
    api: ApiClient,
    status: Arc<RwLock<Status>>,
}

impl AuthStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            status: Arc::new(RwLock::new(Status::default())),
        }
    }

    fn session(&self) -> &SessionHandle {
        self.api.session()
    }

    pub async fn snapshot(&self) -> AuthState {
        let status = self.status.read().await;
        let session = self.session().get();
        AuthState {
            user: session.as_ref().map(|s| s.user.clone()),
            token: session.map(|s| s.token),
            is_loading: status.is_loading,
            error: status.error.clone(),
        }
    }

    pub fn user(&self) -> Option<User> {
        self.session().user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.user().map(|u| u.is_admin()).unwrap_or(false)
    }

    /// Decoded payload of the current token, if it is a readable JWT
    pub fn token_claims(&self) -> Option<TokenClaims> {
        let token = self.session().token()?;
        TokenClaims::decode(&token).ok()
    }

    async fn start(&self) {
        let mut status = self.status.write().await;
        status.is_loading = true;
        status.error = None;
    }

    async fn finish(&self, error: Option<String>) {
        let mut status = self.status.write().await;
        status.is_loading = false;
        status.error = error;
    }

    fn store_session(&self, session: Session) {
        let persist = self.api.options().persist_session;
        if let Err(e) = self.session().set(session, persist) {
            warn!("session kept in memory only: {}", e);
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        self.start().await;
        let result = self.api.login(email, password).await.and_then(|data| {
            let token = data
                .token
                .ok_or_else(|| Error::general("Login response did not include a token"))?;
            Ok(Session {
                token,
                user: data.user,
            })
        });

        match result {
            Ok(session) => {
                let user = session.user.clone();
                self.store_session(session);
                self.finish(None).await;
                info!(email = %user.email, role = %user.role, "logged in");
                Ok(user)
            }
            Err(e) => {
                self.finish(Some(credential_error(&e))).await;
                Err(e)
            }
        }
    }

    /// Register a new account; `role` defaults to [`Role::User`]
    pub async fn signup(&self, email: &str, password: &str, role: Option<Role>) -> Result<User> {
        self.start().await;
        let role = role.unwrap_or_default();
        let result = self
            .api
            .signup(email, password, Some(role))
            .await
            .and_then(|data| {
                let token = data
                    .token
                    .ok_or_else(|| Error::general("Signup response did not include a token"))?;
                Ok(Session {
                    token,
                    user: data.user,
                })
            });

        match result {
            Ok(session) => {
                let user = session.user.clone();
                self.store_session(session);
                self.finish(None).await;
                info!(email = %user.email, role = %user.role, "signed up");
                Ok(user)
            }
            Err(e) => {
                self.finish(Some(credential_error(&e))).await;
                Err(e)
            }
        }
    }

    /// Log out locally even when the server call fails
    pub async fn logout(&self) {
        {
            let mut status = self.status.write().await;
            status.is_loading = true;
        }

        if let Err(e) = self.api.logout().await {
            error!("Logout API error: {}", e);
        }

        if let Err(e) = self.session().clear() {
            warn!("failed to clear stored session: {}", e);
        }
        self.finish(None).await;
        self.api.navigator().navigate(Route::Login);
    }

    /// Re-read the user from `/auth/me`.
    ///
    /// Without a token this does nothing. A failed refresh keeps the current
    /// user and leaves `error` unset; the error is still returned.
    pub async fn refresh_current_user(&self) -> Result<Option<User>> {
        let Some(token) = self.session().token() else {
            self.finish(None).await;
            return Ok(None);
        };

        {
            let mut status = self.status.write().await;
            status.is_loading = true;
        }

        match self.api.current_user().await {
            Ok(data) => {
                let user = data.user;
                // the store may have been logged out while the request was in flight
                if self.session().is_authenticated() {
                    self.store_session(Session {
                        token: data.token.unwrap_or(token),
                        user: user.clone(),
                    });
                }
                self.finish(None).await;
                Ok(Some(user))
            }
            Err(e) => {
                warn!("Failed to refresh user data: {}", e);
                self.finish(None).await;
                Err(e)
            }
        }
    }

    pub async fn clear_error(&self) {
        self.status.write().await.error = None;
    }

    pub fn set_user(&self, user: User, token: String) {
        self.store_session(Session { token, user });
    }

    /// Restore the persisted session, returning its user
    pub fn initialize(&self) -> Option<User> {
        self.session().restore().map(|s| s.user)
    }
}
