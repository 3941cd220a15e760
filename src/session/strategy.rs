//! Pluggable login strategies
//!
//! A strategy gets the page capability at the login boundary and drives the
//! credential flow. The gate, not the strategy, verifies the post-login
//! marker afterwards.

use crate::config::LoginConfig;
use crate::page::PageCapability;
use crate::session::SessionError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info};

/// How long to wait for each individual form element during credential login
const FORM_STEP_TIMEOUT: Duration = Duration::from_secs(30);

/// Establishes an authenticated session at the login boundary
#[async_trait]
pub trait LoginStrategy: Send + Sync {
    /// Drives the login flow; returning Ok means the flow was submitted,
    /// not that the session is verified
    async fn attempt(&self, page: &dyn PageCapability) -> Result<(), SessionError>;
}

/// Automated strategy: fills stored credentials into the rendered form
pub struct CredentialLogin {
    login: LoginConfig,
}

impl CredentialLogin {
    pub fn new(login: LoginConfig) -> Self {
        Self { login }
    }
}

#[async_trait]
impl LoginStrategy for CredentialLogin {
    async fn attempt(&self, page: &dyn PageCapability) -> Result<(), SessionError> {
        // The console links out to the identity provider; follow that link
        // when it is present, otherwise assume we are already on the form.
        if page.click(&self.login.entry_link).await.is_ok() {
            debug!("Followed login entry link '{}'", self.login.entry_link);
        }

        page.wait_for(&self.login.email_field, FORM_STEP_TIMEOUT)
            .await
            .map_err(|e| SessionError::Strategy(e.to_string()))?;
        page.fill(&self.login.email_field, &self.login.email)
            .await
            .map_err(|e| SessionError::Strategy(e.to_string()))?;
        page.click(&self.login.email_next)
            .await
            .map_err(|e| SessionError::Strategy(e.to_string()))?;

        page.wait_for(&self.login.password_field, FORM_STEP_TIMEOUT)
            .await
            .map_err(|e| SessionError::Strategy(e.to_string()))?;
        page.fill(&self.login.password_field, &self.login.password)
            .await
            .map_err(|e| SessionError::Strategy(e.to_string()))?;
        page.click(&self.login.password_next)
            .await
            .map_err(|e| SessionError::Strategy(e.to_string()))?;

        debug!("Credential form submitted");
        Ok(())
    }
}

/// Resolvable acknowledgment handle for the assisted strategy
///
/// The operator-facing side (a console prompt, a signal handler) calls
/// [`OperatorSignal::acknowledge`] once login is finished by hand.
#[derive(Clone, Default)]
pub struct OperatorSignal {
    notify: Arc<Notify>,
}

impl OperatorSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes the suspended login flow
    pub fn acknowledge(&self) {
        self.notify.notify_one();
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Manual strategy: suspends until an operator acknowledges out of band
///
/// 2FA and OAuth consent screens cannot be automated; this strategy parks
/// the crawl at the boundary while a human finishes the flow in the browser
/// window. The gate's login timeout still bounds the wait.
pub struct AssistedLogin {
    signal: OperatorSignal,
}

impl AssistedLogin {
    pub fn new(signal: OperatorSignal) -> Self {
        Self { signal }
    }
}

#[async_trait]
impl LoginStrategy for AssistedLogin {
    async fn attempt(&self, _page: &dyn PageCapability) -> Result<(), SessionError> {
        info!("Operator action required: finish login in the browser window, then acknowledge");
        self.signal.wait().await;
        info!("Operator acknowledged, verifying session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_operator_signal_resumes_wait() {
        let signal = OperatorSignal::new();
        let waiter = signal.clone();

        let handle = tokio::spawn(async move {
            waiter.wait().await;
            true
        });

        signal.acknowledge();
        assert!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_assisted_login_waits_for_acknowledgment() {
        use crate::page::{PageError, PageResult, RenderedPage};

        struct DeadPage;

        #[async_trait]
        impl PageCapability for DeadPage {
            async fn goto(&self, url: &str) -> PageResult<RenderedPage> {
                Err(PageError::Timeout {
                    url: url.to_string(),
                })
            }
            async fn fill(&self, _: &str, _: &str) -> PageResult<()> {
                Ok(())
            }
            async fn click(&self, _: &str) -> PageResult<()> {
                Ok(())
            }
            async fn wait_for(&self, _: &str, _: Duration) -> PageResult<()> {
                Ok(())
            }
            async fn snapshot(&self) -> PageResult<RenderedPage> {
                Ok(RenderedPage {
                    url: String::new(),
                    html: String::new(),
                })
            }
        }

        let signal = OperatorSignal::new();
        let strategy = AssistedLogin::new(signal.clone());

        let handle = tokio::spawn(async move { strategy.attempt(&DeadPage).await });

        // The strategy should still be suspended
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        signal.acknowledge();
        assert!(handle.await.unwrap().is_ok());
    }
}
