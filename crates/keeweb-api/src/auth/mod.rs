//! Authentication: Basic credential parsing and the session gate.

pub mod credentials;
pub mod gate;
pub mod session;

pub use credentials::Credentials;
pub use gate::{AuthenticationGate, Authenticator};
pub use session::SessionAuthenticator;
