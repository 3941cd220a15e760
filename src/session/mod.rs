//! Session establishment and gating
//!
//! Every navigation runs through the [`SessionGate`]. The first request that
//! lands on the login boundary runs the configured [`LoginStrategy`] while
//! every other in-flight request blocks; once the session is established all
//! later fetches take the fast path and never re-authenticate.

mod strategy;

pub use strategy::{AssistedLogin, CredentialLogin, LoginStrategy, OperatorSignal};

use crate::config::{LoginConfig, SiteConfig};
use crate::page::{PageCapability, PageError, RenderedPage};
use scraper::{Html, Selector};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Session lifecycle errors; all of these are fatal to the run
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Timed out waiting for the post-login marker '{marker}'")]
    LoginTimeout { marker: String },

    #[error("Login strategy failed: {0}")]
    Strategy(String),

    #[error("Session previously failed; refusing further navigation")]
    Failed,
}

/// One process-wide session lifecycle value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No navigation has hit the login boundary yet
    Unestablished,

    /// A login strategy is running; all other crawl work is blocked
    Pending,

    /// Authenticated; fetches proceed without re-invoking login
    Established,

    /// Login failed or timed out; the run must abort
    Failed,
}

/// Wraps every navigation with session establishment
pub struct SessionGate {
    state: Mutex<SessionState>,
    // Held across the whole login flow so concurrent fetches queue up behind it
    boundary: tokio::sync::Mutex<()>,
    strategy: Box<dyn LoginStrategy>,
    login_path: String,
    entry_link: String,
    success_marker: String,
    login_timeout: Duration,
    fetch_timeout: Duration,
}

impl SessionGate {
    /// Creates a gate around the given login strategy
    pub fn new(
        strategy: Box<dyn LoginStrategy>,
        site: &SiteConfig,
        login: &LoginConfig,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            state: Mutex::new(SessionState::Unestablished),
            boundary: tokio::sync::Mutex::new(()),
            strategy,
            login_path: site.login_path.clone(),
            entry_link: login.entry_link.clone(),
            success_marker: site.success_marker.clone(),
            login_timeout: Duration::from_secs(login.login_timeout_secs),
            fetch_timeout,
        }
    }

    /// Returns the current session state
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock().unwrap() = next;
    }

    /// Fetches a URL, establishing the session first if necessary
    ///
    /// Fast path: once the session is established this is a plain bounded
    /// fetch. Until then all callers serialize on the boundary lock and the
    /// first one to hit the login page runs the strategy.
    pub async fn fetch(
        &self,
        page: &dyn PageCapability,
        url: &str,
    ) -> crate::Result<RenderedPage> {
        match self.state() {
            SessionState::Established => return Ok(self.timed_fetch(page, url).await?),
            SessionState::Failed => return Err(SessionError::Failed.into()),
            SessionState::Unestablished | SessionState::Pending => {}
        }

        let _guard = self.boundary.lock().await;

        // Another worker may have finished login while we waited
        match self.state() {
            SessionState::Established => return Ok(self.timed_fetch(page, url).await?),
            SessionState::Failed => return Err(SessionError::Failed.into()),
            SessionState::Unestablished | SessionState::Pending => {}
        }

        let doc = self.timed_fetch(page, url).await?;

        if !self.is_login_boundary(&doc) {
            // A persisted profile may already be authenticated
            info!("Session already established, no login required");
            self.set_state(SessionState::Established);
            return Ok(doc);
        }

        self.set_state(SessionState::Pending);
        info!("Session boundary hit at {}, running login strategy", doc.url);

        match self.establish(page).await {
            Ok(()) => {
                self.set_state(SessionState::Established);
                info!("Session established");
                // The original target was displaced by the login flow
                Ok(self.timed_fetch(page, url).await?)
            }
            Err(e) => {
                self.set_state(SessionState::Failed);
                warn!("Session establishment failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Runs the strategy and verifies the post-login marker
    async fn establish(&self, page: &dyn PageCapability) -> Result<(), SessionError> {
        let flow = async {
            self.strategy.attempt(page).await?;

            page.wait_for(&self.success_marker, self.login_timeout)
                .await
                .map_err(|_| SessionError::LoginTimeout {
                    marker: self.success_marker.clone(),
                })
        };

        match tokio::time::timeout(self.login_timeout, flow).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::LoginTimeout {
                marker: self.success_marker.clone(),
            }),
        }
    }

    /// A page is a login boundary if its URL is under the login path or it
    /// renders a credential form
    fn is_login_boundary(&self, doc: &RenderedPage) -> bool {
        if doc.url.contains(&self.login_path) {
            return true;
        }

        let html = Html::parse_document(&doc.html);

        if let Ok(selector) = Selector::parse(&self.entry_link) {
            if html.select(&selector).next().is_some() {
                return true;
            }
        }

        if let Ok(selector) = Selector::parse("input[type='password']") {
            if html.select(&selector).next().is_some() {
                return true;
            }
        }

        false
    }

    async fn timed_fetch(
        &self,
        page: &dyn PageCapability,
        url: &str,
    ) -> Result<RenderedPage, PageError> {
        match tokio::time::timeout(self.fetch_timeout, page.goto(url)).await {
            Ok(result) => result,
            Err(_) => Err(PageError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoginMode;
    use async_trait::async_trait;

    struct NoopStrategy;

    #[async_trait]
    impl LoginStrategy for NoopStrategy {
        async fn attempt(&self, _page: &dyn PageCapability) -> Result<(), SessionError> {
            Ok(())
        }
    }

    fn test_gate() -> SessionGate {
        let site = SiteConfig {
            root_url: "https://console.example.com/serial-course".to_string(),
            login_path: "/login".to_string(),
            success_marker: ".navbar".to_string(),
        };
        let login = LoginConfig {
            mode: LoginMode::Credentials,
            email: "user@example.com".to_string(),
            password: "pw".to_string(),
            login_timeout_secs: 5,
            entry_link: "a#googlelogin_check".to_string(),
            email_field: "input[type='email']".to_string(),
            email_next: "#identifierNext".to_string(),
            password_field: "input[type='password']".to_string(),
            password_next: "#passwordNext".to_string(),
        };
        SessionGate::new(Box::new(NoopStrategy), &site, &login, Duration::from_secs(5))
    }

    #[test]
    fn test_initial_state_unestablished() {
        let gate = test_gate();
        assert_eq!(gate.state(), SessionState::Unestablished);
    }

    #[test]
    fn test_login_boundary_by_url() {
        let gate = test_gate();
        let doc = RenderedPage {
            url: "https://console.example.com/login".to_string(),
            html: "<html><body>Welcome</body></html>".to_string(),
        };
        assert!(gate.is_login_boundary(&doc));
    }

    #[test]
    fn test_login_boundary_by_credential_form() {
        let gate = test_gate();
        let doc = RenderedPage {
            url: "https://accounts.example.com/signin".to_string(),
            html: r#"<html><body><input type="password" /></body></html>"#.to_string(),
        };
        assert!(gate.is_login_boundary(&doc));
    }

    #[test]
    fn test_login_boundary_by_entry_link() {
        let gate = test_gate();
        let doc = RenderedPage {
            url: "https://console.example.com/".to_string(),
            html: r##"<html><body><a id="googlelogin_check" href="#">Sign in</a></body></html>"##
                .to_string(),
        };
        assert!(gate.is_login_boundary(&doc));
    }

    #[test]
    fn test_content_page_is_not_boundary() {
        let gate = test_gate();
        let doc = RenderedPage {
            url: "https://console.example.com/serial-course".to_string(),
            html: "<html><body><div class='navbar'></div></body></html>".to_string(),
        };
        assert!(!gate.is_login_boundary(&doc));
    }
}
