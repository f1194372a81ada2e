// SPDX-License-Identifier: GPL-3.0-only

//! Identity lookup
//!
//! Authentication lives outside this crate; the session only needs to know
//! who (if anyone) is signed in. Without a user, capture sessions refuse to
//! start.

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
}

/// Source of the current user
pub trait IdentityProvider: Send {
    /// The signed-in user, or `None` when nobody is
    fn current_user(&self) -> Option<UserInfo>;
}

/// Identity provider with a fixed answer
///
/// The CLI builds one from the invoking OS user; tests build signed-in and
/// signed-out variants directly.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Option<UserInfo>,
}

impl StaticIdentity {
    pub fn signed_in(id: impl Into<String>, username: impl Into<String>) -> Self {
        let id = id.into();
        let username = username.into();
        Self {
            user: Some(UserInfo { id, username }),
        }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }

    /// Identity derived from the invoking OS user, when available
    pub fn from_os_user() -> Self {
        match std::env::var("USER").or_else(|_| std::env::var("USERNAME")) {
            Ok(name) if !name.is_empty() => Self::signed_in(name.clone(), name),
            _ => Self::signed_out(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserInfo> {
        self.user.clone()
    }
}
