// Jamf Pro connection credentials
//
// Held only in memory. The type has no `Serialize` impl and no path to
// disk; the JSON body sent to the backend is built per request from a
// borrowed `&Credentials` and dropped with the request.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use crate::error::Error;

/// Credentials for the remote Jamf Pro instance.
///
/// Sent in full with every backend call; there is no token exchange.
/// The password is a [`SecretString`]: redacted in `Debug` and zeroized
/// on drop.
pub struct Credentials {
    url: String,
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Build credentials from raw form input.
    ///
    /// URL and username are trimmed; the password is kept verbatim.
    /// Construction never fails, call [`validate`](Self::validate) (every
    /// client call does) to check the shape before anything goes on the wire.
    pub fn new(url: &str, username: &str, password: SecretString) -> Self {
        Self {
            url: url.trim().to_owned(),
            username: username.trim().to_owned(),
            password,
        }
    }

    /// The Jamf Pro instance URL as entered.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check that all fields are present and the URL is an absolute
    /// `http`/`https` URL.
    pub fn validate(&self) -> Result<(), Error> {
        if self.url.is_empty()
            || self.username.is_empty()
            || self.password.expose_secret().is_empty()
        {
            return Err(Error::InvalidCredentials {
                reason: "URL, username and password are all required".into(),
            });
        }

        let parsed = Url::parse(&self.url).map_err(|_| Error::InvalidCredentials {
            reason: "Invalid URL format. Must start with http:// or https://".into(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(Error::InvalidCredentials {
                reason: format!("unsupported URL scheme '{other}', expected http or https"),
            }),
        }
    }

    /// Validate and borrow the wire representation.
    pub(crate) fn body(&self) -> Result<CredentialsBody<'_>, Error> {
        self.validate()?;
        Ok(CredentialsBody {
            url: &self.url,
            username: &self.username,
            password: self.password.expose_secret(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// `{url, username, password}` as the backend expects it.
#[derive(Serialize)]
pub(crate) struct CredentialsBody<'a> {
    url: &'a str,
    username: &'a str,
    password: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn creds(url: &str) -> Credentials {
        Credentials::new(url, "admin", SecretString::from("hunter2".to_owned()))
    }

    #[test]
    fn accepts_https_url() {
        assert!(creds("https://acme.jamfcloud.com").validate().is_ok());
    }

    #[test]
    fn rejects_url_without_scheme() {
        let err = creds("acme.jamfcloud.com").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials { .. }));
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(creds("ftp://acme.jamfcloud.com").validate().is_err());
    }

    #[test]
    fn rejects_blank_fields() {
        let c = Credentials::new("https://x.example", "  ", SecretString::from("pw".to_owned()));
        assert!(c.validate().is_err());
    }

    #[test]
    fn trims_url_and_username() {
        let c = Credentials::new(
            "  https://acme.jamfcloud.com ",
            " admin ",
            SecretString::from("pw".to_owned()),
        );
        assert_eq!(c.url(), "https://acme.jamfcloud.com");
        assert_eq!(c.username(), "admin");
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", creds("https://acme.jamfcloud.com"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn body_serializes_wire_shape() {
        let c = creds("https://acme.jamfcloud.com");
        let json = serde_json::to_value(c.body().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "url": "https://acme.jamfcloud.com",
                "username": "admin",
                "password": "hunter2",
            })
        );
    }
}
