use std::{
    ffi::{c_void, CStr},
    marker::PhantomData,
    ops::Deref,
};

use libgssapi_sys::{gss_buffer_desc, gss_buffer_t};

use crate::{error::Status, shim};

/// A buffer the library allocated, released through `gss_release_buffer`.
pub struct Buffer(gss_buffer_desc);
// Sole owner of the allocation
unsafe impl Send for Buffer {}
impl Buffer {
    pub(crate) fn empty() -> Self {
        Self(gss_buffer_desc {
            length: 0,
            value: std::ptr::null_mut(),
        })
    }
    pub(crate) fn as_mut_ptr(&mut self) -> gss_buffer_t {
        &mut self.0
    }
    pub fn as_slice(&self) -> &[u8] {
        if self.0.value.is_null() || self.0.length == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.0.value as *const u8, self.0.length) }
        }
    }
    pub fn into_vec(self) -> Vec<u8> {
        self.as_slice().to_vec()
    }
}
impl Deref for Buffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}
impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer").field("length", &self.0.length).finish()
    }
}
impl Drop for Buffer {
    fn drop(&mut self) {
        if self.0.value.is_null() {
            return;
        }
        let mut minor = 0;
        let major = unsafe { shim::release_buffer(&mut minor, &mut self.0) };
        if let Err(err) = Status::new(major, minor).check() {
            log::warn!("releasing a GSS buffer failed: {err}");
        }
    }
}

/// A borrowed length+pointer view over caller memory. Never released by the library.
pub struct BufferRef<'a> {
    desc: gss_buffer_desc,
    _lifetime: PhantomData<&'a [u8]>,
}
impl<'a> BufferRef<'a> {
    pub fn from_slice(slice: &'a [u8]) -> Self {
        Self {
            desc: gss_buffer_desc {
                length: slice.len(),
                value: slice.as_ptr() as *mut c_void,
            },
            _lifetime: PhantomData,
        }
    }
    /// View over the bytes before the terminating nul.
    pub fn from_c_str(s: &'a CStr) -> Self {
        Self::from_slice(s.to_bytes())
    }
    /// The library takes input buffers as mutable pointers but does not write through them.
    pub(crate) fn as_mut_ptr(&mut self) -> gss_buffer_t {
        &mut self.desc
    }
}
impl<'a> From<&'a [u8]> for BufferRef<'a> {
    fn from(slice: &'a [u8]) -> Self {
        Self::from_slice(slice)
    }
}
