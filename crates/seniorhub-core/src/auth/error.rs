use thiserror::Error;

/// Everything that can end a sign-in attempt without a session.
///
/// `Display` is the user-facing message shown on the sign-in view.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Google OAuth is not configured")]
    NotConfigured,

    #[error("Sign-in is already in progress")]
    InProgress,

    #[error("Failed to open authentication popup. Please allow popups for this site.")]
    PopupBlocked { reason: String },

    #[error("{0}")]
    Provider(String),

    #[error("Failed to fetch user profile (status {status})")]
    ProfileFetch { status: u16 },

    #[error("Invalid user profile: {0}")]
    InvalidProfile(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Authentication was cancelled")]
    Cancelled,

    #[error("Authentication timed out")]
    TimedOut,

    #[error("Authentication transport error: {0}")]
    Transport(String),
}
