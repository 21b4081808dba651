//! Mock session and auth shim.
//!
//! Simulates a single-tenant authentication flow on top of the durable
//! store: sign-up creates a `user_profiles` row and persists a session
//! record, sign-in looks the profile up by email, sign-out removes the
//! session. This is explicitly a mock, not a security boundary — any
//! non-empty password is accepted on sign-in and nothing is hashed.
//!
//! At most one session exists at a time, persisted under its own storage
//! key separate from any table.
use crate::error::MimicError;
use crate::store::DurableStore;
use crate::types::{AuthResponse, Session};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Storage key for the persisted session record.
pub const SESSION_KEY: &str = "lms_user";

/// Storage key backing the `user_profiles` table.
const PROFILES_KEY: &str = "lms_profiles";

/// Credentials for sign-up and sign-in.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Email identifying the profile
    pub email: String,
    /// Plaintext password; only checked for non-emptiness
    pub password: String,
}

impl Credentials {
    /// Create a credentials pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Handle for a registered auth-state listener.
///
/// The callback fires exactly once per registration, on the next task-queue
/// tick; there is no live propagation across instances. Dropping the
/// subscription does not cancel the pending callback — call
/// [`AuthSubscription::unsubscribe`] for that.
pub struct AuthSubscription {
    handle: JoinHandle<()>,
}

impl AuthSubscription {
    /// Cancel the pending notification if it has not fired yet.
    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}

/// The mock auth facade, exposed as `db.auth()`.
pub struct MockAuth {
    store: Arc<DurableStore>,
}

impl MockAuth {
    pub(crate) fn new(store: Arc<DurableStore>) -> Self {
        Self { store }
    }

    /// Read the persisted session record, if any.
    pub async fn get_session(&self) -> Option<Session> {
        self.current_session()
    }

    /// Read the current user. Same record as [`MockAuth::get_session`];
    /// both names exist for API-shape compatibility.
    pub async fn get_user(&self) -> Option<Session> {
        self.current_session()
    }

    /// Register a listener for the current auth state.
    ///
    /// The callback is invoked once with the session as of registration,
    /// deferred to the next tick so callers can finish wiring up first.
    pub fn on_auth_state_change<F>(&self, callback: F) -> AuthSubscription
    where
        F: FnOnce(Option<Session>) + Send + 'static,
    {
        let current = self.current_session();
        let handle = tokio::spawn(async move {
            tokio::task::yield_now().await;
            callback(current);
        });
        AuthSubscription { handle }
    }

    /// Create a profile for a new email and sign the user in.
    ///
    /// Fails with `Validation` when email or password is empty and with
    /// `Conflict` when a profile with that email already exists.
    pub async fn sign_up(&self, credentials: Credentials) -> AuthResponse {
        let Credentials { email, password } = credentials;
        if email.is_empty() || password.is_empty() {
            return AuthResponse::err(MimicError::Validation {
                reason: "email and password required".to_string(),
            });
        }

        let user_id = Uuid::new_v4().to_string();
        let display_name = email.split('@').next().unwrap_or(&email).to_string();

        // Duplicate check and profile append under one entry lock, so two
        // racing sign-ups for the same email cannot both succeed.
        let created = self.store.mutate(PROFILES_KEY, |profiles| {
            if profiles
                .iter()
                .any(|p| p.get("email").and_then(|e| e.as_str()) == Some(email.as_str()))
            {
                return false;
            }
            profiles.push(json!({
                "id": user_id,
                "email": email,
                "display_name": display_name,
            }));
            true
        });

        match created {
            Ok(true) => {}
            Ok(false) => {
                return AuthResponse::err(MimicError::Conflict {
                    reason: format!("a profile for '{}' already exists", email),
                });
            }
            Err(e) => return AuthResponse::err(e),
        }

        debug!(%email, "sign-up");
        self.persist_session(Session::new(user_id, email))
    }

    /// Sign in against an existing profile.
    ///
    /// Any non-empty password is accepted; unknown emails and empty
    /// passwords fail with `InvalidCredentials`.
    pub async fn sign_in_with_password(&self, credentials: Credentials) -> AuthResponse {
        let Credentials { email, password } = credentials;
        if password.is_empty() {
            return AuthResponse::err(MimicError::InvalidCredentials);
        }

        let profiles = self.store.load(PROFILES_KEY);
        let Some(profile) = profiles
            .iter()
            .find(|p| p.get("email").and_then(|e| e.as_str()) == Some(email.as_str()))
        else {
            return AuthResponse::err(MimicError::InvalidCredentials);
        };

        let user_id = profile
            .get("id")
            .and_then(|id| id.as_str())
            .unwrap_or_default()
            .to_string();

        debug!(%email, "sign-in");
        self.persist_session(Session::new(user_id, email))
    }

    /// Remove the persisted session record.
    pub async fn sign_out(&self) -> AuthResponse {
        debug!("sign-out");
        match self.store.clear_record(SESSION_KEY) {
            Ok(()) => AuthResponse::ok(),
            Err(e) => AuthResponse::err(e),
        }
    }

    fn current_session(&self) -> Option<Session> {
        self.store
            .read_record(SESSION_KEY)
            .and_then(|record| serde_json::from_value(record).ok())
    }

    fn persist_session(&self, session: Session) -> AuthResponse {
        let record = match serde_json::to_value(&session) {
            Ok(record) => record,
            Err(e) => return AuthResponse::err(e.into()),
        };
        match self.store.write_record(SESSION_KEY, &record) {
            Ok(()) => AuthResponse::ok(),
            Err(e) => AuthResponse::err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MimicError;
    use std::sync::mpsc;

    fn auth() -> MockAuth {
        MockAuth::new(Arc::new(DurableStore::in_memory()))
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let auth = auth();
        assert!(auth.get_session().await.is_none());

        let response = auth.sign_up(Credentials::new("a@b.com", "secret")).await;
        assert!(response.error.is_none());

        let session = auth.get_session().await.unwrap();
        assert_eq!(session.email, "a@b.com");

        auth.sign_out().await;
        assert!(auth.get_session().await.is_none());
    }

    #[tokio::test]
    async fn test_sign_up_requires_email_and_password() {
        let auth = auth();

        let no_email = auth.sign_up(Credentials::new("", "secret")).await;
        assert!(matches!(no_email.error, Some(MimicError::Validation { .. })));

        let no_password = auth.sign_up(Credentials::new("a@b.com", "")).await;
        assert!(matches!(
            no_password.error,
            Some(MimicError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_conflicts() {
        let auth = auth();
        auth.sign_up(Credentials::new("a@b.com", "secret")).await;

        let duplicate = auth.sign_up(Credentials::new("a@b.com", "other")).await;
        assert!(matches!(
            duplicate.error,
            Some(MimicError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_sign_up_creates_profile_row() {
        let store = Arc::new(DurableStore::in_memory());
        let auth = MockAuth::new(Arc::clone(&store));

        auth.sign_up(Credentials::new("mara@example.com", "pw")).await;

        let profiles = store.load("lms_profiles");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["email"], "mara@example.com");
        assert_eq!(profiles[0]["display_name"], "mara");
    }

    #[tokio::test]
    async fn test_sign_in_accepts_any_nonempty_password() {
        let auth = auth();
        auth.sign_up(Credentials::new("a@b.com", "secret")).await;
        auth.sign_out().await;

        let response = auth
            .sign_in_with_password(Credentials::new("a@b.com", "not-the-password"))
            .await;
        assert!(response.error.is_none());
        assert_eq!(auth.get_session().await.unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email_fails() {
        let auth = auth();

        let response = auth
            .sign_in_with_password(Credentials::new("nobody@b.com", "pw"))
            .await;
        assert!(matches!(
            response.error,
            Some(MimicError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_empty_password_fails() {
        let auth = auth();
        auth.sign_up(Credentials::new("a@b.com", "secret")).await;
        auth.sign_out().await;

        let response = auth
            .sign_in_with_password(Credentials::new("a@b.com", ""))
            .await;
        assert!(matches!(
            response.error,
            Some(MimicError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_auth_state_change_fires_once_with_current_state() {
        let auth = auth();
        auth.sign_up(Credentials::new("a@b.com", "secret")).await;

        let (tx, rx) = mpsc::channel();
        let _subscription = auth.on_auth_state_change(move |session| {
            tx.send(session).unwrap();
        });

        let delivered = tokio::task::spawn_blocking(move || {
            rx.recv_timeout(std::time::Duration::from_secs(1)).unwrap()
        })
        .await
        .unwrap();
        assert_eq!(delivered.unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn test_auth_state_change_signed_out() {
        let auth = auth();

        let (tx, rx) = mpsc::channel();
        let _subscription = auth.on_auth_state_change(move |session| {
            tx.send(session).unwrap();
        });

        let delivered = tokio::task::spawn_blocking(move || {
            rx.recv_timeout(std::time::Duration::from_secs(1)).unwrap()
        })
        .await
        .unwrap();
        assert!(delivered.is_none());
    }
}
