use std::{ffi::CString, marker::PhantomData, ptr::NonNull};

use libgssapi_sys::gss_cred_id_struct;

use crate::{error::Status, name::NameHandle, shim, Error};

pub mod usage {
    /// Credentials that can accept security contexts
    #[derive(Debug)]
    pub enum Inbound {}
    /// Credentials that can initiate security contexts
    #[derive(Debug)]
    pub enum Outbound {}
}
pub use usage::{Inbound, Outbound};

pub trait CredentialsUsage: usage_sealed::Sealed {
    const IS_INITIATE: bool;
}
impl CredentialsUsage for Inbound {
    const IS_INITIATE: bool = false;
}
impl CredentialsUsage for Outbound {
    const IS_INITIATE: bool = true;
}
mod usage_sealed {
    pub trait Sealed {}
    impl Sealed for super::Inbound {}
    impl Sealed for super::Outbound {}
}

/// A SPNEGO credential handle for one role.
pub struct Credentials<Usage = Outbound> {
    pub(crate) cred_handle: NonNull<gss_cred_id_struct>,
    _usage: PhantomData<Usage>,
}
// Valid, because Credentials does not expose any mutability and is the sole owner of the underlying memory
unsafe impl<Usage> Send for Credentials<Usage> {}
unsafe impl<Usage> Sync for Credentials<Usage> {}
impl<Usage: CredentialsUsage> Credentials<Usage> {
    /// Acquires the credential of `name`, or of the default identity when `None`.
    pub fn acquire(name: Option<&NameHandle>) -> Result<Self, Error> {
        let mut minor = 0;
        let mut cred_handle = std::ptr::null_mut();
        let major = unsafe {
            shim::acquire_cred_spnego(
                &mut minor,
                name.map_or(std::ptr::null_mut(), NameHandle::as_ptr),
                Usage::IS_INITIATE,
                &mut cred_handle,
            )
        };
        Self::from_outcome(Status::new(major, minor), cred_handle)
    }
    /// Acquires a credential for `name` by presenting `password` to the KDC.
    pub fn acquire_with_password(name: Option<&NameHandle>, password: &str) -> Result<Self, Error> {
        let password = CString::new(password).map_err(|_| Error::InteriorNul("password"))?;
        let mut minor = 0;
        let mut cred_handle = std::ptr::null_mut();
        let major = unsafe {
            shim::acquire_cred_with_password_spnego(
                &mut minor,
                name.map_or(std::ptr::null_mut(), NameHandle::as_ptr),
                password.as_ptr(),
                Usage::IS_INITIATE,
                &mut cred_handle,
            )
        };
        Self::from_outcome(Status::new(major, minor), cred_handle)
    }
    fn from_outcome(status: Status, cred_handle: *mut gss_cred_id_struct) -> Result<Self, Error> {
        if let Err(err) = status.check() {
            log::debug!("acquiring SPNEGO credentials failed: {err}");
            return Err(err.into());
        }
        let Some(cred_handle) = NonNull::new(cred_handle) else {
            return Err(Error::NullHandle("credential"));
        };
        Ok(Self {
            cred_handle,
            _usage: PhantomData,
        })
    }
    pub(crate) fn as_ptr(&self) -> *mut gss_cred_id_struct {
        self.cred_handle.as_ptr()
    }
}
impl Credentials<Outbound> {
    /// Client credentials for `user`.
    ///
    /// An absent or empty user means no explicit credential: the default
    /// identity (e.g. an existing ticket cache) is used and `Ok(None)` is returned.
    /// With a non-empty password the KDC is asked directly.
    pub fn for_user(user: Option<&str>, password: Option<&str>) -> Result<Option<Self>, Error> {
        let Some(user) = user.filter(|u| !u.is_empty()) else {
            return Ok(None);
        };
        let name = NameHandle::import_nt_user(user)?;
        let cred = match password.filter(|p| !p.is_empty()) {
            Some(password) => Self::acquire_with_password(Some(&name), password)?,
            None => Self::acquire(Some(&name))?,
        };
        Ok(Some(cred))
    }
}
impl<T> Drop for Credentials<T> {
    fn drop(&mut self) {
        let mut minor = 0;
        let mut handle = self.cred_handle.as_ptr();
        let major = unsafe { shim::release_cred(&mut minor, &mut handle) };
        if let Err(err) = Status::new(major, minor).check() {
            log::warn!("releasing a GSS credential failed: {err}");
        }
    }
}
impl<T> std::fmt::Debug for Credentials<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("handle", &self.cred_handle).finish()
    }
}
