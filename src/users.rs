//! User listing for admins

use crate::api::ApiClient;
use crate::auth::User;
use crate::error::Result;
use crate::navigation::require_admin;

/// Read-only directory of dashboard accounts
#[derive(Debug, Clone)]
pub struct UserDirectory {
    api: ApiClient,
}

impl UserDirectory {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All users. Only admins may ask; others get `Forbidden` without a request.
    pub async fn list(&self) -> Result<Vec<User>> {
        require_admin(self.api.session().user().as_ref(), "view users")?;
        self.api.list_users().await
    }
}

/// Counts of admins and regular users
pub fn role_counts(users: &[User]) -> (usize, usize) {
    let admins = users.iter().filter(|u| u.is_admin()).count();
    (admins, users.len() - admins)
}
