use std::ffi::c_void;

use libgssapi_sys::{gss_OID, gss_OID_desc, gss_OID_set, gss_OID_set_desc};

/// DER body of 1.3.6.1.5.5.2
pub const SPNEGO_OID_BYTES: [u8; 6] = [0x2b, 0x06, 0x01, 0x05, 0x05, 0x02];

static SPNEGO_BYTES: [u8; 6] = SPNEGO_OID_BYTES;

struct StaticOid(gss_OID_desc);
// The descriptor only points at immutable statics and is never written through
unsafe impl Sync for StaticOid {}

struct StaticOidSet(gss_OID_set_desc);
unsafe impl Sync for StaticOidSet {}

static SPNEGO: StaticOid = StaticOid(gss_OID_desc {
    length: SPNEGO_OID_BYTES.len() as u32,
    elements: SPNEGO_BYTES.as_ptr().cast_mut().cast::<c_void>(),
});

static SPNEGO_SET: StaticOidSet = StaticOidSet(gss_OID_set_desc {
    count: 1,
    elements: std::ptr::addr_of!(SPNEGO.0).cast_mut(),
});

/// The SPNEGO mechanism, as the library's `gss_OID` parameters want it.
pub fn spnego() -> gss_OID {
    std::ptr::addr_of!(SPNEGO.0).cast_mut()
}

/// The one-element mechanism set `{ SPNEGO }`.
pub fn spnego_set() -> gss_OID_set {
    std::ptr::addr_of!(SPNEGO_SET.0).cast_mut()
}

/// Whether `oid` names the SPNEGO mechanism.
///
/// # Safety
/// `oid` must be null or point to a valid OID descriptor.
pub unsafe fn is_spnego(oid: gss_OID) -> bool {
    let Some(desc) = (unsafe { oid.as_ref() }) else {
        return false;
    };
    if desc.elements.is_null() || desc.length as usize != SPNEGO_OID_BYTES.len() {
        return false;
    }
    let bytes = unsafe { std::slice::from_raw_parts(desc.elements as *const u8, desc.length as usize) };
    bytes == SPNEGO_OID_BYTES
}
