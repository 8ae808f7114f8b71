//! Credentials accepted by the Air login flow.

use secrecy::{ExposeSecret, SecretString};

/// How a client obtains its bearer token.
#[derive(Debug)]
pub enum Credentials {
    /// A ready-to-use bearer token.
    BearerToken(SecretString),
    /// Username and password exchanged for a token at the login endpoint.
    Password {
        /// Account username
        username: String,
        /// Account password
        password: SecretString,
    },
}

impl Credentials {
    /// Credentials from an existing bearer token.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::BearerToken(SecretString::from(token.into()))
    }

    /// Credentials from a username and password.
    #[must_use]
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Copy the credentials, re-wrapping the secret material.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        match self {
            Self::BearerToken(token) => Self::bearer(token.expose_secret()),
            Self::Password { username, password } => {
                Self::password(username.clone(), password.expose_secret())
            }
        }
    }

    /// Returns true if a new token can be requested with these credentials.
    #[must_use]
    pub const fn can_reauthenticate(&self) -> bool {
        matches!(self, Self::Password { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_credentials_can_reauthenticate() {
        assert!(Credentials::password("john", "secret").can_reauthenticate());
        assert!(!Credentials::bearer("abc").can_reauthenticate());
    }

    #[test]
    fn duplicate_keeps_secret() {
        let creds = Credentials::bearer("abc").duplicate();
        match creds {
            Credentials::BearerToken(token) => assert_eq!(token.expose_secret(), "abc"),
            Credentials::Password { .. } => panic!("expected bearer token"),
        }
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::password("john", "hunter2");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        if let Credentials::Password { password, .. } = creds {
            assert_eq!(password.expose_secret(), "hunter2");
        }
    }
}
