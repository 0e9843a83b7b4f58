//! Popup-style OAuth sign-in.
//!
//! This module provides:
//! - `AuthSessionManager`: the `idle → authenticating → authenticated | failed | cancelled`
//!   state machine, holding the in-memory user and bearer token
//! - `SignInAttempt`: one owned sign-in round trip that can run on a background task
//! - `AuthTransport`: the popup capability, with `LoopbackTransport` (system browser plus a
//!   local redirect target) and `ChannelTransport` (in-process, driven by a controller)
//! - `ProfileSource`: the userinfo lookup, implemented by `GoogleProfileClient`
//!
//! The provider uses the implicit flow: the bearer token arrives in the redirect
//! fragment and is relayed to the opener as a same-origin message.

pub mod error;
pub mod loopback;
pub mod manager;
pub mod oauth;
pub mod profile;
pub mod transport;

pub use error::AuthError;
pub use loopback::LoopbackTransport;
pub use manager::{AuthSessionManager, AuthState, SignInAttempt};
pub use oauth::{OAuthConfig, PopupGeometry, ScreenSize};
pub use profile::{GoogleProfileClient, ProfileSource, ProviderProfile};
pub use transport::{
    AuthMessage, AuthTransport, ChannelTransport, CrossWindowMessage, PopupController,
    PopupEvent, PopupRequest, PopupSession, SignInCancel,
};
