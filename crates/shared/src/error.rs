use crate::order::OrderStatus;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validate(#[from] validator::ValidationErrors),

    #[error("invalid email or password")]
    AuthenticationFailed,

    #[error("access denied")]
    AccessDenied,

    #[error("no barrels remaining on your subscription")]
    InsufficientCredit,

    #[error("please add a delivery address to your profile before booking")]
    AddressMissing,

    #[error("subscription is inactive")]
    SubscriptionInactive,

    #[error("subscription has expired")]
    SubscriptionExpired,

    #[error("account not found")]
    AccountNotFound,

    #[error("{0} not found")]
    NotFound(String),

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("unknown order status '{0}'")]
    InvalidStatus(String),

    #[error("{0}")]
    User(String),

    #[error("{0}")]
    Persistence(#[from] sqlx::Error),

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable machine readable code, used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validate(_) => "validation_failed",
            Error::AuthenticationFailed => "authentication_failed",
            Error::AccessDenied => "access_denied",
            Error::InsufficientCredit => "insufficient_credit",
            Error::AddressMissing => "address_missing",
            Error::SubscriptionInactive => "subscription_inactive",
            Error::SubscriptionExpired => "subscription_expired",
            Error::AccountNotFound => "account_not_found",
            Error::NotFound(_) => "not_found",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::InvalidStatus(_) => "invalid_status",
            Error::User(_) => "bad_request",
            Error::Persistence(_) => "persistence_failure",
            Error::Unknown(_) => "internal",
        }
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::Unknown(anyhow::anyhow!(value))
    }
}

impl From<time::error::ComponentRange> for Error {
    fn from(value: time::error::ComponentRange) -> Self {
        Self::Unknown(value.into())
    }
}

#[macro_export]
macro_rules! user {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::User(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::User(format!($fmt, $($arg)*)))
    };
}

#[macro_export]
macro_rules! not_found {
    ($what:expr $(,)?) => {
        return Err($crate::Error::NotFound($what.to_string()))
    };
}
