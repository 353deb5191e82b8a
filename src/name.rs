use std::{ffi::CString, fmt::Display, ptr::NonNull};

use libgssapi_sys::gss_name_struct;

use crate::{buffer::Buffer, error::Status, shim, Error};

/// An opaque principal name owned by the library.
pub struct NameHandle {
    name: NonNull<gss_name_struct>,
}
unsafe impl Send for NameHandle {}
unsafe impl Sync for NameHandle {}
impl NameHandle {
    /// Imports `principal` with the NT user name type.
    pub fn import_nt_user(principal: &str) -> Result<Self, Error> {
        let principal = CString::new(principal).map_err(|_| Error::InteriorNul("principal"))?;
        let mut minor = 0;
        let mut name = std::ptr::null_mut();
        let major = unsafe { shim::import_nt_user_name(&mut minor, principal.as_ptr(), &mut name) };
        Status::new(major, minor).check()?;
        Self::from_raw(name).ok_or(Error::NullHandle("name"))
    }
    pub(crate) fn from_raw(name: *mut gss_name_struct) -> Option<Self> {
        NonNull::new(name).map(|name| Self { name })
    }
    pub(crate) fn as_ptr(&self) -> *mut gss_name_struct {
        self.name.as_ptr()
    }
    /// The library's textual rendering of the name.
    pub fn display(&self) -> Result<String, Error> {
        let mut minor = 0;
        let mut buffer = Buffer::empty();
        let major = unsafe { shim::display_name(&mut minor, self.as_ptr(), buffer.as_mut_ptr()) };
        Status::new(major, minor).check()?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
impl Drop for NameHandle {
    fn drop(&mut self) {
        let mut minor = 0;
        let mut name = self.name.as_ptr();
        let major = unsafe { shim::release_name(&mut minor, &mut name) };
        if let Err(err) = Status::new(major, minor).check() {
            log::warn!("releasing a GSS name failed: {err}");
        }
    }
}
impl Display for NameHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.display() {
            Ok(name) => f.write_str(&name),
            Err(_) => Ok(()),
        }
    }
}
impl std::fmt::Debug for NameHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NameHandle").field(&self.to_string()).finish()
    }
}
