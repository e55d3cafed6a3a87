//! Per-request session context.
//!
//! The engine never reads session state. Callers derive the viewer `Role` and
//! the read-only flag from a `SessionContext` and pass them to `FormBuilder`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

use crate::role::Role;

/// Account role as issued by the login backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AccountRole {
    Student,
    Instructor,
    Admin,
}

impl AccountRole {
    /// Form role for this account: instructors and admins author problems.
    pub fn form_role(self) -> Role {
        match self {
            AccountRole::Student => Role::Student,
            AccountRole::Instructor | AccountRole::Admin => Role::Creator,
        }
    }
}

/// Immutable snapshot of who is logged in and until when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    email: String,
    account_role: AccountRole,
    expires: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(email: impl Into<String>, account_role: AccountRole, expires: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            account_role,
            expires,
        }
    }

    /// Rebuild a session from the cookie values set at login (`email`, `role`,
    /// `expires` in Unix seconds). Returns `None` for a logged-out or expired
    /// session, or an unknown role.
    pub fn from_cookie_values(
        email: &str,
        role: &str,
        expires_unix: i64,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if email.is_empty() {
            return None;
        }
        let Ok(account_role) = role.parse::<AccountRole>() else {
            debug!(role, "unknown account role in session cookie");
            return None;
        };
        let expires = DateTime::<Utc>::from_timestamp(expires_unix, 0)?;
        let session = Self::new(email, account_role, expires);
        session.is_active(now).then_some(session)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn account_role(&self) -> AccountRole {
        self.account_role
    }

    /// Role the engine should build forms for.
    pub fn role(&self) -> Role {
        self.account_role.form_role()
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }

    /// Forms are read-only once the deadline has passed or the session has
    /// expired, since nothing could be submitted anymore.
    pub fn readonly_at(&self, deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        !self.is_active(now) || deadline.is_some_and(|deadline| now >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn cookie_session_maps_account_roles() {
        let expires = (now() + Duration::hours(1)).timestamp();
        let session =
            SessionContext::from_cookie_values("ann@example.edu", "instructor", expires, now())
                .unwrap();
        assert_eq!(session.email(), "ann@example.edu");
        assert_eq!(session.account_role(), AccountRole::Instructor);
        assert_eq!(session.role(), Role::Creator);

        let student =
            SessionContext::from_cookie_values("bo@example.edu", "student", expires, now()).unwrap();
        assert_eq!(student.role(), Role::Student);
    }

    #[test]
    fn expired_or_malformed_cookies_are_logged_out() {
        let past = (now() - Duration::seconds(1)).timestamp();
        assert!(SessionContext::from_cookie_values("a@b.c", "admin", past, now()).is_none());

        let future = (now() + Duration::days(1)).timestamp();
        assert!(SessionContext::from_cookie_values("", "admin", future, now()).is_none());
        assert!(SessionContext::from_cookie_values("a@b.c", "grader", future, now()).is_none());
    }

    #[test]
    fn readonly_after_the_deadline() {
        let session =
            SessionContext::new("a@b.c", AccountRole::Student, now() + Duration::hours(2));
        assert!(!session.readonly_at(None, now()));
        assert!(!session.readonly_at(Some(now() + Duration::minutes(5)), now()));
        assert!(session.readonly_at(Some(now()), now()));
    }

    #[test]
    fn readonly_once_the_session_expires() {
        let session = SessionContext::new("a@b.c", AccountRole::Student, now());
        assert!(!session.is_active(now()));
        assert!(session.readonly_at(None, now()));
        assert!(!session.readonly_at(None, now() - Duration::seconds(1)));
    }
}
