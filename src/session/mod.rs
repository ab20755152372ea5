//! Session token lifecycle.
//!
//! # Data Flow
//! ```text
//! ensure_token()
//!     → current session valid?  → cached token (no I/O)
//!     → else refresh lock (single flight)
//!         → re-check (another caller may have refreshed)
//!         → login() → Session { token, expires_at } swapped in whole
//! ```
//!
//! # Design Decisions
//! - Session is replaced atomically via `ArcSwapOption`, never partially updated
//! - At most one login is in flight; concurrent callers await it
//! - Login is never retried automatically

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::schema::SessionConfig;
use crate::error::CrsError;
use crate::observability::metrics;

/// An acquired token and its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Usable only if non-empty and not expiring within `skew`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        let skew = chrono::Duration::from_std(skew).unwrap_or(chrono::Duration::MAX);
        !self.token.is_empty()
            && now
                .checked_add_signed(skew)
                .map(|deadline| self.expires_at > deadline)
                .unwrap_or(false)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// What a successful login produced, before defaults are applied.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub token: Option<String>,
    pub expires: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct SessionManager {
    current: ArcSwapOption<Session>,
    refresh: Mutex<()>,
    refresh_skew: Duration,
    default_lifetime: Duration,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            refresh: Mutex::new(()),
            refresh_skew: Duration::from_secs(config.refresh_skew_secs),
            default_lifetime: Duration::from_secs(config.default_lifetime_secs),
        }
    }

    /// The cached session, if any, regardless of validity.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.load_full()
    }

    /// Drop the cached session; the next call logs in again.
    pub fn invalidate(&self) {
        self.current.store(None);
    }

    fn valid_token(&self) -> Option<String> {
        let guard = self.current.load();
        guard
            .as_ref()
            .filter(|s| s.is_valid_at(Utc::now(), self.refresh_skew))
            .map(|s| s.token.clone())
    }

    /// Return a valid token, performing `login` only if needed.
    pub async fn ensure_token<F, Fut>(&self, cancel: &CancellationToken, login: F) -> Result<String, CrsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<LoginGrant, CrsError>>,
    {
        if let Some(token) = self.valid_token() {
            return Ok(token);
        }

        let _refresh = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CrsError::Cancelled),
            guard = self.refresh.lock() => guard,
        };

        // Another caller may have completed a login while we waited.
        if let Some(token) = self.valid_token() {
            return Ok(token);
        }

        tracing::debug!("Session absent or expiring, logging in");
        let grant = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CrsError::Cancelled),
            grant = login() => grant,
        };

        let session = match grant.and_then(|g| self.session_from(g)) {
            Ok(session) => session,
            Err(err) => {
                metrics::record_login(err.label());
                tracing::warn!(error = %err, "Login failed");
                return Err(err);
            }
        };

        tracing::info!(expires_at = %session.expires_at, "Session token acquired");
        metrics::record_login("success");
        let token = session.token.clone();
        self.current.store(Some(Arc::new(session)));
        Ok(token)
    }

    fn session_from(&self, grant: LoginGrant) -> Result<Session, CrsError> {
        let token = grant
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CrsError::Authentication("login returned no token".to_string()))?;

        let expires_at = grant.expires.unwrap_or_else(|| {
            let lifetime = chrono::Duration::from_std(self.default_lifetime)
                .unwrap_or(chrono::Duration::hours(1));
            Utc::now() + lifetime
        });

        Ok(Session { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn manager() -> SessionManager {
        SessionManager::new(&SessionConfig::default())
    }

    fn grant(token: &str, expires_in: chrono::Duration) -> LoginGrant {
        LoginGrant {
            token: Some(token.to_string()),
            expires: Some(Utc::now() + expires_in),
        }
    }

    #[test]
    fn test_validity_respects_skew() {
        let now = Utc::now();
        let session = Session {
            token: "tok".into(),
            expires_at: now + chrono::Duration::seconds(90),
        };
        assert!(session.is_valid_at(now, Duration::from_secs(60)));
        assert!(!session.is_valid_at(now, Duration::from_secs(120)));

        let empty = Session {
            token: String::new(),
            expires_at: now + chrono::Duration::hours(1),
        };
        assert!(!empty.is_valid_at(now, Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_valid_session_is_reused() {
        let sessions = manager();
        let cancel = CancellationToken::new();
        let logins = AtomicU32::new(0);

        for _ in 0..3 {
            let token = sessions
                .ensure_token(&cancel, || async {
                    logins.fetch_add(1, Ordering::SeqCst);
                    Ok(grant("tok", chrono::Duration::minutes(10)))
                })
                .await
                .unwrap();
            assert_eq!(token, "tok");
        }
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expiring_session_triggers_login() {
        let sessions = manager();
        let cancel = CancellationToken::new();
        let logins = AtomicU32::new(0);

        for _ in 0..2 {
            sessions
                .ensure_token(&cancel, || async {
                    logins.fetch_add(1, Ordering::SeqCst);
                    // Inside the one-minute skew, so never considered valid.
                    Ok(grant("short", chrono::Duration::seconds(30)))
                })
                .await
                .unwrap();
        }
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blank_token_is_authentication_error() {
        let sessions = manager();
        let cancel = CancellationToken::new();
        let result = sessions
            .ensure_token(&cancel, || async {
                Ok(LoginGrant {
                    token: Some("  ".into()),
                    expires: None,
                })
            })
            .await;
        assert!(matches!(result, Err(CrsError::Authentication(_))));
        assert!(sessions.current().is_none());
    }

    #[tokio::test]
    async fn test_missing_expiry_defaults_to_one_hour() {
        let sessions = manager();
        let cancel = CancellationToken::new();
        sessions
            .ensure_token(&cancel, || async {
                Ok(LoginGrant {
                    token: Some("tok".into()),
                    expires: None,
                })
            })
            .await
            .unwrap();

        let session = sessions.current().unwrap();
        let remaining = session.expires_at - Utc::now();
        assert!(remaining > chrono::Duration::minutes(59));
        assert!(remaining <= chrono::Duration::hours(1));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_login() {
        let sessions = Arc::new(manager());
        let logins = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let sessions = sessions.clone();
            let logins = logins.clone();
            handles.push(tokio::spawn(async move {
                let cancel = CancellationToken::new();
                sessions
                    .ensure_token(&cancel, || async move {
                        logins.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(grant("shared", chrono::Duration::minutes(10)))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "shared");
        }
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_login() {
        let sessions = manager();
        let cancel = CancellationToken::new();
        let logins = AtomicU32::new(0);
        let login = || async {
            logins.fetch_add(1, Ordering::SeqCst);
            Ok(grant("tok", chrono::Duration::minutes(10)))
        };

        sessions.ensure_token(&cancel, login).await.unwrap();
        sessions.invalidate();
        sessions.ensure_token(&cancel, login).await.unwrap();
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_login_leaves_no_session() {
        let sessions = manager();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = sessions
            .ensure_token(&cancel, || async { Ok(grant("tok", chrono::Duration::minutes(10))) })
            .await;
        assert!(matches!(result, Err(CrsError::Cancelled)));
        assert!(sessions.current().is_none());
    }
}
