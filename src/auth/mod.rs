//! Authorization
//!
//! Every file manager operation is gated by an [`Authorizer`] that sees who
//! is asking, for which operation, and on what target path.

pub mod context;
pub mod credentials;
pub mod policy;
pub mod validator;

pub use context::{AuthContext, Caller, Operation};
pub use credentials::CredentialStore;
pub use policy::{AllowAll, Authorizer, RequireLogin};
pub use validator::caller_from_authorization;
