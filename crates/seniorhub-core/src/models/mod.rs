//! Data models shared by the session store, the sign-in flow and the shell.

pub mod menu;
pub mod user;

pub use menu::{dashboard_tiles, MenuCategory, MenuItem};
pub use user::{AuthenticatedUser, HouseholdStatus, Session, UserContext};
