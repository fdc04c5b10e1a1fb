use types::user::{User, UserRole};

pub mod gate;
pub mod session;
pub mod token;

pub use gate::{resolve, settle, Navigation, Route};
pub use session::Session;
pub use token::Tokens;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// The stored token has not been checked yet.
    Loading,
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user().map(|user| user.role)
    }
}
