use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("No active bank accounts available")]
    NoActiveAccounts,

    #[error("No active devices available")]
    NoActiveDevices,

    #[error("Authentication method catalog incomplete, missing ids {missing:?}")]
    AuthCatalogIncomplete { missing: Vec<i16> },

    #[error("Could not draw a unique {kind} after {attempts} attempts")]
    IdentifierSpaceExhausted { kind: &'static str, attempts: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    /// Fatal preconditions require seeding reference data; retrying the
    /// run without remediation cannot succeed.
    pub fn is_fatal_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoActiveAccounts | Self::NoActiveDevices | Self::AuthCatalogIncomplete { .. }
        )
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
