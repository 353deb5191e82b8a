//! The flat C surface.
//!
//! Every function returns the major status unchanged and writes the minor
//! status through its first argument. Handles and buffers belong to the
//! GSSAPI library; callers release them with the matching release call.
//! Nothing is validated beyond what the library itself checks.
#![allow(non_snake_case)]
#![allow(clippy::missing_safety_doc)]

use std::ffi::c_char;

use libgssapi_sys::{gss_buffer_t, gss_cred_id_t, gss_ctx_id_t, gss_name_t};

use crate::shim;

#[no_mangle]
pub unsafe extern "C" fn GssReleaseBuffer(minor_status: *mut u32, buffer: gss_buffer_t) -> u32 {
    unsafe { shim::release_buffer(minor_status, buffer) }
}

/// Renders the first message the library has for `status_value`.
#[no_mangle]
pub unsafe extern "C" fn GssDisplayStatus(
    minor_status: *mut u32,
    status_value: u32,
    is_gss_mech_code: bool,
    status_string: gss_buffer_t,
) -> u32 {
    let mut message_context = 0;
    unsafe {
        shim::display_status(
            minor_status,
            status_value,
            is_gss_mech_code,
            &mut message_context,
            status_string,
        )
    }
}

#[no_mangle]
pub unsafe extern "C" fn GssDisplayName(
    minor_status: *mut u32,
    input_name: gss_name_t,
    output_name_buffer: gss_buffer_t,
) -> u32 {
    unsafe { shim::display_name(minor_status, input_name, output_name_buffer) }
}

/// Imports `input_name` as an NT user name.
#[no_mangle]
pub unsafe extern "C" fn GssImportNtUserName(
    minor_status: *mut u32,
    input_name: *const c_char,
    output_name: *mut gss_name_t,
) -> u32 {
    unsafe { shim::import_nt_user_name(minor_status, input_name, output_name) }
}

#[no_mangle]
pub unsafe extern "C" fn GssReleaseName(minor_status: *mut u32, input_name: *mut gss_name_t) -> u32 {
    unsafe { shim::release_name(minor_status, input_name) }
}

#[no_mangle]
pub unsafe extern "C" fn GssAcquireCredSpNego(
    minor_status: *mut u32,
    desired_name: gss_name_t,
    is_initiate: bool,
    output_cred_handle: *mut gss_cred_id_t,
) -> u32 {
    unsafe { shim::acquire_cred_spnego(minor_status, desired_name, is_initiate, output_cred_handle) }
}

#[no_mangle]
pub unsafe extern "C" fn GssAcquireCredWithPasswordSpNego(
    minor_status: *mut u32,
    desired_name: gss_name_t,
    password: *const c_char,
    is_initiate: bool,
    output_cred_handle: *mut gss_cred_id_t,
) -> u32 {
    unsafe {
        shim::acquire_cred_with_password_spnego(minor_status, desired_name, password, is_initiate, output_cred_handle)
    }
}

#[no_mangle]
pub unsafe extern "C" fn GssReleaseCred(minor_status: *mut u32, cred_handle: *mut gss_cred_id_t) -> u32 {
    unsafe { shim::release_cred(minor_status, cred_handle) }
}

#[no_mangle]
pub unsafe extern "C" fn GssInitSecContextSpNego(
    minor_status: *mut u32,
    claimant_cred_handle: gss_cred_id_t,
    context_handle: *mut gss_ctx_id_t,
    target_name: gss_name_t,
    req_flags: u32,
    input_token: gss_buffer_t,
    output_token: gss_buffer_t,
    ret_flags: *mut u32,
) -> u32 {
    unsafe {
        shim::init_sec_context_spnego(
            minor_status,
            claimant_cred_handle,
            context_handle,
            target_name,
            req_flags,
            input_token,
            output_token,
            ret_flags,
        )
    }
}

#[no_mangle]
pub unsafe extern "C" fn GssAcceptSecContext(
    minor_status: *mut u32,
    context_handle: *mut gss_ctx_id_t,
    acceptor_cred_handle: gss_cred_id_t,
    input_token: gss_buffer_t,
    output_token: gss_buffer_t,
    ret_flags: *mut u32,
) -> u32 {
    unsafe {
        shim::accept_sec_context(
            minor_status,
            context_handle,
            acceptor_cred_handle,
            input_token,
            output_token,
            ret_flags,
        )
    }
}

#[no_mangle]
pub unsafe extern "C" fn GssDeleteSecContext(minor_status: *mut u32, context_handle: *mut gss_ctx_id_t) -> u32 {
    unsafe { shim::delete_sec_context(minor_status, context_handle) }
}

/// Aborts the process if the mechanism applied a confidentiality other than the one requested.
#[no_mangle]
pub unsafe extern "C" fn GssWrap(
    minor_status: *mut u32,
    context_handle: gss_ctx_id_t,
    is_encrypt: bool,
    input_message_buffer: gss_buffer_t,
    output_message_buffer: gss_buffer_t,
) -> u32 {
    unsafe {
        shim::wrap(
            minor_status,
            context_handle,
            is_encrypt,
            input_message_buffer,
            output_message_buffer,
        )
    }
}

#[no_mangle]
pub unsafe extern "C" fn GssUnwrap(
    minor_status: *mut u32,
    context_handle: gss_ctx_id_t,
    input_message_buffer: gss_buffer_t,
    output_message_buffer: gss_buffer_t,
) -> u32 {
    unsafe { shim::unwrap(minor_status, context_handle, input_message_buffer, output_message_buffer) }
}

#[no_mangle]
pub unsafe extern "C" fn GssInquireSourceName(
    minor_status: *mut u32,
    context_handle: gss_ctx_id_t,
    src_name: *mut gss_name_t,
) -> u32 {
    unsafe { shim::inquire_source_name(minor_status, context_handle, src_name) }
}
