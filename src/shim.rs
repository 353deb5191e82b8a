//! One forwarding call per operation.
//!
//! Each function wraps exactly one GSSAPI call. The only work done here is
//! picking the fixed arguments (SPNEGO mechanism, usage, status type, default
//! QOP, no channel bindings) and dropping outputs nobody asks for. Status
//! codes come back untouched.

use std::ffi::{c_char, c_void, CStr};

use crate::{
    mech,
    sys::{
        gss_OID, gss_accept_sec_context, gss_acquire_cred, gss_acquire_cred_with_password, gss_buffer_desc,
        gss_buffer_t, gss_cred_id_t, gss_cred_usage_t, gss_ctx_id_t, gss_delete_sec_context, gss_display_name,
        gss_display_status, gss_import_name, gss_init_sec_context, gss_inquire_context, gss_name_t,
        gss_release_buffer, gss_release_cred, gss_release_name, gss_unwrap, gss_wrap, GSS_C_ACCEPT, GSS_C_GSS_CODE,
        GSS_C_INITIATE, GSS_C_MECH_CODE, GSS_C_NT_USER_NAME, GSS_C_QOP_DEFAULT,
    },
    Status,
};

/// Lifetime request for credentials and contexts; 0 leaves it to the library.
const DEFAULT_LIFETIME: u32 = 0;

fn usage(is_initiate: bool) -> gss_cred_usage_t {
    if is_initiate {
        GSS_C_INITIATE as gss_cred_usage_t
    } else {
        GSS_C_ACCEPT as gss_cred_usage_t
    }
}

/// # Safety
/// `text` must point to a nul-terminated string that outlives the returned view.
unsafe fn c_str_buffer(text: *const c_char) -> gss_buffer_desc {
    let bytes = unsafe { CStr::from_ptr(text) }.to_bytes();
    gss_buffer_desc {
        length: bytes.len(),
        value: text as *mut c_void,
    }
}

pub(crate) unsafe fn release_buffer(minor_status: *mut u32, buffer: gss_buffer_t) -> u32 {
    unsafe { gss_release_buffer(minor_status, buffer) }
}

/// `message_context` must start at 0; the library sets it non-zero while more messages remain.
pub(crate) unsafe fn display_status(
    minor_status: *mut u32,
    status_value: u32,
    is_mech_code: bool,
    message_context: *mut u32,
    status_string: gss_buffer_t,
) -> u32 {
    let status_type = if is_mech_code { GSS_C_MECH_CODE } else { GSS_C_GSS_CODE };
    unsafe {
        gss_display_status(
            minor_status,
            status_value,
            status_type as i32,
            std::ptr::null_mut(),
            message_context,
            status_string,
        )
    }
}

pub(crate) unsafe fn display_name(minor_status: *mut u32, input_name: gss_name_t, output: gss_buffer_t) -> u32 {
    unsafe { gss_display_name(minor_status, input_name, output, std::ptr::null_mut()) }
}

pub(crate) unsafe fn import_nt_user_name(
    minor_status: *mut u32,
    input_name: *const c_char,
    output_name: *mut gss_name_t,
) -> u32 {
    let mut input = unsafe { c_str_buffer(input_name) };
    unsafe { gss_import_name(minor_status, &mut input, GSS_C_NT_USER_NAME, output_name) }
}

pub(crate) unsafe fn release_name(minor_status: *mut u32, input_name: *mut gss_name_t) -> u32 {
    unsafe { gss_release_name(minor_status, input_name) }
}

pub(crate) unsafe fn acquire_cred_spnego(
    minor_status: *mut u32,
    desired_name: gss_name_t,
    is_initiate: bool,
    output_cred: *mut gss_cred_id_t,
) -> u32 {
    unsafe {
        gss_acquire_cred(
            minor_status,
            desired_name,
            DEFAULT_LIFETIME,
            mech::spnego_set(),
            usage(is_initiate),
            output_cred,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    }
}

pub(crate) unsafe fn acquire_cred_with_password_spnego(
    minor_status: *mut u32,
    desired_name: gss_name_t,
    password: *const c_char,
    is_initiate: bool,
    output_cred: *mut gss_cred_id_t,
) -> u32 {
    let mut password = unsafe { c_str_buffer(password) };
    unsafe {
        gss_acquire_cred_with_password(
            minor_status,
            desired_name,
            &mut password,
            DEFAULT_LIFETIME,
            mech::spnego_set(),
            usage(is_initiate),
            output_cred,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    }
}

pub(crate) unsafe fn release_cred(minor_status: *mut u32, cred: *mut gss_cred_id_t) -> u32 {
    unsafe { gss_release_cred(minor_status, cred) }
}

#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn init_sec_context_spnego(
    minor_status: *mut u32,
    claimant_cred: gss_cred_id_t,
    context: *mut gss_ctx_id_t,
    target_name: gss_name_t,
    req_flags: u32,
    input_token: gss_buffer_t,
    output_token: gss_buffer_t,
    ret_flags: *mut u32,
) -> u32 {
    unsafe {
        gss_init_sec_context(
            minor_status,
            claimant_cred,
            context,
            target_name,
            mech::spnego(),
            req_flags,
            DEFAULT_LIFETIME,
            std::ptr::null_mut(),
            input_token,
            std::ptr::null_mut::<gss_OID>(),
            output_token,
            ret_flags,
            std::ptr::null_mut(),
        )
    }
}

pub(crate) unsafe fn accept_sec_context(
    minor_status: *mut u32,
    context: *mut gss_ctx_id_t,
    acceptor_cred: gss_cred_id_t,
    input_token: gss_buffer_t,
    output_token: gss_buffer_t,
    ret_flags: *mut u32,
) -> u32 {
    unsafe {
        gss_accept_sec_context(
            minor_status,
            context,
            acceptor_cred,
            input_token,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            output_token,
            ret_flags,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    }
}

/// Local teardown; no token is produced for the peer.
pub(crate) unsafe fn delete_sec_context(minor_status: *mut u32, context: *mut gss_ctx_id_t) -> u32 {
    unsafe { gss_delete_sec_context(minor_status, context, std::ptr::null_mut()) }
}

/// Panics if a successful call applied a different confidentiality than requested.
pub(crate) unsafe fn wrap(
    minor_status: *mut u32,
    context: gss_ctx_id_t,
    is_encrypt: bool,
    input: gss_buffer_t,
    output: gss_buffer_t,
) -> u32 {
    let mut conf_state = 0;
    let major = unsafe {
        gss_wrap(
            minor_status,
            context,
            i32::from(is_encrypt),
            GSS_C_QOP_DEFAULT,
            input,
            &mut conf_state,
            output,
        )
    };
    if !Status::new(major, 0).is_error() {
        assert_eq!(
            conf_state != 0,
            is_encrypt,
            "gss_wrap applied confidentiality that disagrees with the request"
        );
    }
    major
}

pub(crate) unsafe fn unwrap(
    minor_status: *mut u32,
    context: gss_ctx_id_t,
    input: gss_buffer_t,
    output: gss_buffer_t,
) -> u32 {
    unsafe {
        gss_unwrap(
            minor_status,
            context,
            input,
            output,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    }
}

pub(crate) unsafe fn inquire_source_name(minor_status: *mut u32, context: gss_ctx_id_t, src_name: *mut gss_name_t) -> u32 {
    unsafe {
        gss_inquire_context(
            minor_status,
            context,
            src_name,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    }
}
