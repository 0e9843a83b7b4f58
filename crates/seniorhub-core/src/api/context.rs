use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::models::{Session, UserContext};

/// Identity attached to a single API call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub token: Option<String>,
    pub user: Option<UserContext>,
}

impl RequestContext {
    /// Context for requests made without a session
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_session(session: &Session) -> Self {
        Self {
            token: Some(session.token.clone()),
            user: Some(session.user.context()),
        }
    }

    /// `Authorization` plus the non-empty `x-user-*` headers.
    /// Values that are not valid header text are skipped with a warning.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(ref user) = self.user {
            let fields = [
                ("x-user-id", &user.user_id),
                ("x-user-email", &user.email),
                ("x-user-first-name", &user.first_name),
                ("x-user-last-name", &user.last_name),
            ];
            for (name, value) in fields {
                if value.is_empty() {
                    continue;
                }
                match HeaderValue::from_str(value) {
                    Ok(v) => {
                        headers.insert(HeaderName::from_static(name), v);
                    }
                    Err(_) => warn!(header = name, "Skipping identity header with invalid characters"),
                }
            }
        }

        if let Some(ref token) = self.token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(v) => {
                    headers.insert(header::AUTHORIZATION, v);
                }
                Err(_) => warn!("Skipping bearer token with invalid characters"),
            }
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_no_headers() {
        assert!(RequestContext::anonymous().headers().is_empty());
    }

    #[test]
    fn test_session_headers() {
        let headers = RequestContext::from_session(&Session::demo()).headers();
        assert_eq!(headers["authorization"], "Bearer demo-token");
        assert_eq!(headers["x-user-id"], "demo-user");
        assert_eq!(headers["x-user-email"], "demo@seniorhub.com");
        assert_eq!(headers["x-user-first-name"], "Demo");
        assert_eq!(headers["x-user-last-name"], "User");
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let mut session = Session::demo();
        session.user.last_name.clear();
        let headers = RequestContext::from_session(&session).headers();
        assert!(!headers.contains_key("x-user-last-name"));
        assert!(headers.contains_key("x-user-first-name"));
    }

    #[test]
    fn test_invalid_header_text_is_skipped() {
        let mut session = Session::demo();
        session.user.first_name = "Bad\nName".to_string();
        let headers = RequestContext::from_session(&session).headers();
        assert!(!headers.contains_key("x-user-first-name"));
        assert!(headers.contains_key("authorization"));
    }
}
