//! A thin SPNEGO shim over the system GSSAPI library.
//!
//! The [`exports`] module is the flat C surface: fourteen `Gss*` functions
//! that each forward to exactly one GSSAPI call with the SPNEGO mechanism and
//! the fixed arguments filled in. Status codes come back unchanged.
//!
//! The rest of the crate is the same calls behind owned handles, for Rust
//! callers: names, credentials, and client/server contexts release themselves
//! on drop, and established contexts implement [`SecurityContext`].

mod buffer;
pub mod client;
mod context;
mod cred;
mod error;
pub mod exports;
pub mod mech;
mod name;
pub mod server;
mod settings;
mod shim;
mod sign_encrypt;
mod sys;
#[cfg(test)]
mod test_double;

pub use buffer::Buffer;
pub use client::{ClientContext, PendingClientContext};
pub use cred::{usage, Credentials, CredentialsUsage, Inbound, Outbound};
pub use error::{display_status, Error, GssErrorCode, MechanismErrorCode, Status, StatusError, StatusKind};
pub use name::NameHandle;
pub use server::{PendingServerContext, ServerContext};
pub use settings::{ClientSettings, ContextFlags};
pub use sign_encrypt::{Encrypted, Plaintext, SecurityContext, Signed};

/// The two non-error major statuses callers branch on.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GssStatus {
    Complete = 0,
    ContinueNeeded = 1,
}
const _: () = assert!(GssStatus::Complete as u32 == libgssapi_sys::GSS_S_COMPLETE);
const _: () = assert!(GssStatus::ContinueNeeded as u32 == libgssapi_sys::_GSS_S_CONTINUE_NEEDED);
