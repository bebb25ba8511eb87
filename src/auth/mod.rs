//! Authorization Code flow controller.
//!
//! A browser moves `Anonymous -> PendingAuthorization -> Authenticated`, and
//! back to anonymous on logout. [`AuthFlow`] drives those transitions;
//! [`PendingAuthorizations`] holds the in-flight `state` values between the
//! login redirect and the callback.

mod flow;
mod pending;
mod return_to;

pub use flow::{AuthFlow, CallbackParams, CompletedLogin, FlowConfig, LoginRedirect};
pub use pending::{AuthorizationRequest, PendingAuthorizations};
pub use return_to::sanitize_return_to;
