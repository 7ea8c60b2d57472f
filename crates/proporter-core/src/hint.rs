// ── Failure hints ──
//
// Best-effort classification of error text into a follow-up hint. String
// matching only: the backend gives no error codes, so nothing branches on
// this beyond the message shown.

use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    Authentication,
    NotFound,
    Network,
    Timeout,
    Other,
}

impl FailureKind {
    pub fn hint(self) -> &'static str {
        match self {
            Self::Authentication => {
                "Check the Jamf Pro username and password, and that the account has API access."
            }
            Self::NotFound => "Check the Jamf Pro URL; the instance or endpoint was not found.",
            Self::Network => {
                "Check your network connection and that the Jamf Pro URL is reachable."
            }
            Self::Timeout => "The request timed out. The instance may be slow; try again.",
            Self::Other => "Verify your credentials and try again.",
        }
    }
}

/// Classify error text, case-insensitively. First match wins.
pub fn classify(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["authentication", "401", "unauthorized"]) {
        FailureKind::Authentication
    } else if has(&["not found", "404"]) {
        FailureKind::NotFound
    } else if has(&["timeout", "timed out"]) {
        FailureKind::Timeout
    } else if has(&["network", "connection", "dns"]) {
        FailureKind::Network
    } else {
        FailureKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_patterns() {
        assert_eq!(classify("Authentication failed"), FailureKind::Authentication);
        assert_eq!(classify("HTTP error! status: 401 Unauthorized"), FailureKind::Authentication);
        assert_eq!(classify("Jamf Pro returned 404"), FailureKind::NotFound);
        assert_eq!(classify("Connection refused"), FailureKind::Network);
        assert_eq!(classify("DNS lookup failed"), FailureKind::Network);
        assert_eq!(classify("Request timed out"), FailureKind::Timeout);
        assert_eq!(classify("something odd"), FailureKind::Other);
    }

    #[test]
    fn every_kind_has_a_hint() {
        for kind in [
            FailureKind::Authentication,
            FailureKind::NotFound,
            FailureKind::Network,
            FailureKind::Timeout,
            FailureKind::Other,
        ] {
            assert!(!kind.hint().is_empty());
        }
    }
}
