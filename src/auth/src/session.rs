use std::sync::Arc;

use api::Backend;
use chrono::Utc;
use common::error::{ConsoleError, ConsoleResult};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use types::user::{AuthInfo, Credentials, Registration, User};

use crate::{token, AuthState, Tokens};

pub const LOGIN_PATH: &str = "auth/login/";
pub const REGISTER_PATH: &str = "auth/register/";
pub const CURRENT_USER_PATH: &str = "auth/user/";

/// The signed-in user and their tokens. Created once per process and
/// passed to whatever needs to know who is logged in.
pub struct Session {
    backend: Arc<dyn Backend>,
    state: RwLock<AuthState>,
    tokens: RwLock<Option<Tokens>>,
}

impl Session {
    /// Starts in [`AuthState::Loading`] until [`Session::resolve`] runs.
    pub fn new(backend: Arc<dyn Backend>, stored: Option<Tokens>) -> Self {
        Self {
            backend,
            state: RwLock::new(AuthState::Loading),
            tokens: RwLock::new(stored),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user().cloned()
    }

    pub async fn tokens(&self) -> Option<Tokens> {
        self.tokens.read().await.clone()
    }

    /// Restores the session from the stored access token: expired or
    /// rejected tokens are dropped and the session becomes anonymous.
    pub async fn resolve(&self) -> AuthState {
        let access = self.tokens.read().await.as_ref().map(|t| t.access.clone());
        let state = match access {
            None => AuthState::Anonymous,
            Some(access) if token::is_expired(&access, Utc::now()) => {
                debug!("stored access token expired");
                self.forget().await;
                AuthState::Anonymous
            }
            Some(access) => {
                self.backend.set_token(Some(access)).await;
                match self.current_user().await {
                    Ok(user) => AuthState::Authenticated(user),
                    Err(e) => {
                        warn!("restoring session failed: {}", e);
                        self.forget().await;
                        AuthState::Anonymous
                    }
                }
            }
        };
        *self.state.write().await = state.clone();
        state
    }

    async fn current_user(&self) -> ConsoleResult<User> {
        let value = self.backend.get(CURRENT_USER_PATH).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn forget(&self) {
        *self.tokens.write().await = None;
        self.backend.set_token(None).await;
    }

    pub async fn login(&self, username: &str, password: &str) -> ConsoleResult<User> {
        let credentials = Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        let value = self
            .backend
            .post(LOGIN_PATH, serde_json::to_value(credentials)?)
            .await?;
        let info: AuthInfo = serde_json::from_value(value)?;

        self.backend.set_token(Some(info.access.clone())).await;
        *self.tokens.write().await = Some(Tokens {
            access: info.access,
            refresh: info.refresh,
        });
        *self.state.write().await = AuthState::Authenticated(info.user.clone());
        info!("logged in as {} ({})", info.user.username, info.user.role);
        Ok(info.user)
    }

    /// Creates an account. The caller still has to log in.
    pub async fn register(&self, registration: Registration) -> ConsoleResult<()> {
        self.backend
            .post(REGISTER_PATH, serde_json::to_value(registration)?)
            .await?;
        Ok(())
    }

    pub async fn logout(&self) {
        self.forget().await;
        *self.state.write().await = AuthState::Anonymous;
    }

    pub async fn require_user(&self) -> ConsoleResult<User> {
        self.user().await.ok_or(ConsoleError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use api::memory::MemoryBackend;
    use chrono::Duration;
    use serde_json::json;
    use types::user::UserRole;

    use super::*;
    use crate::token::tests::jwt;

    fn admin() -> serde_json::Value {
        json!({"id": 1, "username": "admin", "email": "admin@kuku.test", "role": "admin"})
    }

    fn fresh() -> Tokens {
        Tokens {
            access: jwt(Utc::now() + Duration::hours(1)),
            refresh: None,
        }
    }

    #[tokio::test]
    async fn resolves_without_token_to_anonymous() {
        let backend = Arc::new(MemoryBackend::new());
        let session = Session::new(backend.clone(), None);
        assert_eq!(session.state().await, AuthState::Loading);

        assert_eq!(session.resolve().await, AuthState::Anonymous);
        assert!(backend.requests().await.is_empty());
        assert!(matches!(
            session.require_user().await,
            Err(ConsoleError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn resolves_live_token_to_user() {
        let backend = Arc::new(MemoryBackend::new());
        backend.respond("GET", CURRENT_USER_PATH, admin());
        let tokens = fresh();
        let session = Session::new(backend.clone(), Some(tokens.clone()));

        let state = session.resolve().await;
        assert_eq!(state.role(), Some(UserRole::Admin));
        assert_eq!(backend.token().await, Some(tokens.access));
    }

    #[tokio::test]
    async fn expired_token_is_dropped_without_a_request() {
        let backend = Arc::new(MemoryBackend::new());
        let session = Session::new(
            backend.clone(),
            Some(Tokens {
                access: jwt(Utc::now() - Duration::hours(1)),
                refresh: None,
            }),
        );

        assert_eq!(session.resolve().await, AuthState::Anonymous);
        assert_eq!(session.tokens().await, None);
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn rejected_token_is_dropped() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_once("GET", CURRENT_USER_PATH, 401, Some("Token is invalid or expired"));
        let session = Session::new(backend.clone(), Some(fresh()));

        assert_eq!(session.resolve().await, AuthState::Anonymous);
        assert_eq!(session.tokens().await, None);
        assert_eq!(backend.token().await, None);
    }

    #[tokio::test]
    async fn login_then_logout() {
        let backend = Arc::new(MemoryBackend::new());
        backend.respond(
            "POST",
            LOGIN_PATH,
            json!({"access": "acc", "refresh": "ref", "user": admin()}),
        );
        let session = Session::new(backend.clone(), None);
        session.resolve().await;

        let user = session.login("admin", "secret").await.unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(session.user().await.map(|u| u.id), Some(1));
        assert_eq!(backend.token().await.as_deref(), Some("acc"));
        assert_eq!(
            session.tokens().await.and_then(|t| t.refresh).as_deref(),
            Some("ref")
        );

        session.logout().await;
        assert_eq!(session.state().await, AuthState::Anonymous);
        assert_eq!(backend.token().await, None);
        assert_eq!(session.tokens().await, None);
    }

    #[tokio::test]
    async fn failed_login_keeps_anonymous() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_once("POST", LOGIN_PATH, 401, Some("Invalid credentials"));
        let session = Session::new(backend, None);
        session.resolve().await;

        let err = session.login("admin", "wrong").await.unwrap_err();
        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert_eq!(session.state().await, AuthState::Anonymous);
    }

    #[tokio::test]
    async fn register_does_not_log_in() {
        let backend = Arc::new(MemoryBackend::new());
        backend.respond("POST", REGISTER_PATH, json!({"id": 7, "username": "wanjiku"}));
        let session = Session::new(backend.clone(), None);
        session.resolve().await;

        session
            .register(Registration {
                username: "wanjiku".to_owned(),
                email: "grace@kuku.test".to_owned(),
                password: "secret".to_owned(),
                first_name: "Grace".to_owned(),
                last_name: "Wanjiku".to_owned(),
                role: UserRole::Farmer,
            })
            .await
            .unwrap();
        assert_eq!(session.state().await, AuthState::Anonymous);
        assert_eq!(backend.requests().await, vec!["POST auth/register/"]);
    }
}
