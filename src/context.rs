use libgssapi_sys::gss_ctx_id_struct;

use crate::{error::Status, name::NameHandle, shim, Error};

/// Owns a security context. Null until the first negotiation call populates it.
pub struct ContextHandle(*mut gss_ctx_id_struct);
// Sole owner; the library does not tie contexts to a thread
unsafe impl Send for ContextHandle {}
impl ContextHandle {
    pub(crate) fn new() -> Self {
        Self(std::ptr::null_mut())
    }
    pub(crate) fn as_ptr(&self) -> *mut gss_ctx_id_struct {
        self.0
    }
    /// For the negotiation calls, which may replace the handle.
    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut gss_ctx_id_struct {
        &mut self.0
    }
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
    /// The authenticated initiator of this context.
    pub(crate) fn source_name(&self) -> Result<NameHandle, Error> {
        let mut minor = 0;
        let mut name = std::ptr::null_mut();
        let major = unsafe { shim::inquire_source_name(&mut minor, self.0, &mut name) };
        Status::new(major, minor).check()?;
        NameHandle::from_raw(name).ok_or(Error::NullHandle("name"))
    }
    /// Tears the context down locally and reports the library's status.
    pub fn delete(mut self) -> Result<(), Error> {
        self.delete_in_place().map(|_| ())
    }
    fn delete_in_place(&mut self) -> Result<Status, Error> {
        if self.0.is_null() {
            return Ok(Status::default());
        }
        let mut minor = 0;
        let major = unsafe { shim::delete_sec_context(&mut minor, &mut self.0) };
        Ok(Status::new(major, minor).check()?)
    }
}
impl Drop for ContextHandle {
    fn drop(&mut self) {
        if let Err(err) = self.delete_in_place() {
            log::warn!("deleting a GSS security context failed: {err}");
        }
    }
}
