// ── Credential context ──
//
// Process-scoped holder for the Jamf Pro credentials. Observers follow the
// connection state through a `watch` channel; the credentials themselves
// only leave through `require`, as a shared `Arc`.

use std::sync::Arc;

use proporter_api::{Credentials, ProporterClient};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::CoreError;

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected {
        /// Jamf Pro instance URL.
        url: String,
        username: String,
    },
}

/// Holds the current credentials, if any.
///
/// Never persisted. `disconnect` drops this context's reference; the
/// secret is zeroized once the last in-flight request holding an `Arc`
/// finishes.
pub struct CredentialContext {
    current: Option<Arc<Credentials>>,
    state: watch::Sender<ConnectionState>,
}

impl Default for CredentialContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialContext {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            current: None,
            state,
        }
    }

    /// Store credentials after a successful login, replacing any previous set.
    pub fn connect(&mut self, credentials: Credentials) {
        info!(url = credentials.url(), username = credentials.username(), "connected");
        let _ = self.state.send_replace(ConnectionState::Connected {
            url: credentials.url().to_owned(),
            username: credentials.username().to_owned(),
        });
        self.current = Some(Arc::new(credentials));
    }

    /// Verify credentials against the backend, then store them.
    pub async fn login(
        &mut self,
        client: &ProporterClient,
        credentials: Credentials,
    ) -> Result<(), CoreError> {
        client.verify_credentials(&credentials).await?;
        self.connect(credentials);
        Ok(())
    }

    /// The current credentials, if connected.
    pub fn current(&self) -> Option<Arc<Credentials>> {
        self.current.clone()
    }

    /// The current credentials, or [`CoreError::NotConnected`].
    pub fn require(&self) -> Result<Arc<Credentials>, CoreError> {
        self.current().ok_or(CoreError::NotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    /// Forget the credentials.
    pub fn disconnect(&mut self) {
        if self.current.take().is_some() {
            debug!("credentials cleared");
        }
        let _ = self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Subscribe to connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn creds() -> Credentials {
        Credentials::new(
            "https://acme.jamfcloud.com",
            "admin",
            SecretString::from("pw".to_owned()),
        )
    }

    #[test]
    fn require_fails_until_connected() {
        let mut ctx = CredentialContext::new();
        assert!(matches!(ctx.require(), Err(CoreError::NotConnected)));

        ctx.connect(creds());
        assert_eq!(ctx.require().unwrap().username(), "admin");
    }

    #[test]
    fn disconnect_clears_and_notifies() {
        let mut ctx = CredentialContext::new();
        let rx = ctx.subscribe();
        ctx.connect(creds());
        assert!(matches!(*rx.borrow(), ConnectionState::Connected { .. }));

        ctx.disconnect();
        assert!(ctx.current().is_none());
        assert_eq!(*rx.borrow(), ConnectionState::Disconnected);
    }
}
