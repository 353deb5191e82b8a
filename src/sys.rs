//! The GSSAPI entry points the shim forwards to.
//!
//! Unit tests link the same types and constants but route the calls into
//! [`crate::test_double`].

#[cfg(not(test))]
pub(crate) use libgssapi_sys::*;

#[cfg(test)]
pub(crate) use crate::test_double::*;
