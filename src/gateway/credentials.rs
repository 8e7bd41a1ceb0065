use secrecy::SecretString;

// -----------------------------------------------------------------------------
// ----- Credentials -----------------------------------------------------------

/// Login identifier and secret for one login attempt. `Debug` redacts the
/// secret.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub login: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        let password: String = password.into();
        Self {
            login: login.into(),
            password: SecretString::new(password.into_boxed_str()),
        }
    }

    pub fn from_secret(login: impl Into<String>, password: SecretString) -> Self {
        Self {
            login: login.into(),
            password,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
