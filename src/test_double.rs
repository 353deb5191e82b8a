//! In-process stand-in for the GSSAPI library, used by unit tests.
//!
//! Handles are boxed Rust values behind the library's opaque pointer types.
//! Every live allocation is counted per thread so tests can assert that the
//! typed layer releases what it acquires. The mechanism completes in one round
//! trip: the initiator sends its principal and requested flags, the acceptor
//! answers with its own principal. Wrapped messages carry a confidentiality
//! marker, an XOR-scrambled body when confidential, and a checksum byte.
#![allow(non_upper_case_globals)]

use std::{cell::Cell, ffi::c_void, ptr};

pub(crate) use libgssapi_sys::*;

use crate::mech;

pub(crate) const BAD_MECH: u32 = 1 << 16;
pub(crate) const BAD_NAME: u32 = 2 << 16;
pub(crate) const BAD_SIG: u32 = 6 << 16;
pub(crate) const NO_CRED: u32 = 7 << 16;
pub(crate) const NO_CONTEXT: u32 = 8 << 16;
pub(crate) const DEFECTIVE_TOKEN: u32 = 9 << 16;
pub(crate) const DEFECTIVE_CREDENTIAL: u32 = 10 << 16;
pub(crate) const FAILURE: u32 = 13 << 16;
pub(crate) const CALL_INACCESSIBLE_READ: u32 = 1 << 24;
pub(crate) const CALL_INACCESSIBLE_WRITE: u32 = 2 << 24;
pub(crate) const CONTINUE_NEEDED: u32 = 1;
pub(crate) const DUPLICATE_TOKEN: u32 = 1 << 1;

pub(crate) const MINOR_NO_CONTEXT: u32 = 0x96c7_3a01;

pub(crate) const DEFAULT_PRINCIPAL: &str = "alice@EXAMPLE.COM";
pub(crate) const DEFAULT_SERVICE: &str = "HTTP/web.example.com@EXAMPLE.COM";

const INITIATOR_TOKEN: &[u8] = b"SPNEGO-INIT:";
const ACCEPTOR_TOKEN: &[u8] = b"SPNEGO-ACCEPT:";
const SCRAMBLE: u8 = 0x5a;
const GRANTED_FLAGS: u32 =
    GSS_C_MUTUAL_FLAG | GSS_C_REPLAY_FLAG | GSS_C_SEQUENCE_FLAG | GSS_C_CONF_FLAG | GSS_C_INTEG_FLAG;

/// Shadows the library's name type OID; the double does not look at name types.
pub(crate) static mut GSS_C_NT_USER_NAME: gss_OID = ptr::null_mut();

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Live {
    pub names: usize,
    pub creds: usize,
    pub contexts: usize,
    pub buffers: usize,
}

thread_local! {
    static LIVE: Cell<Live> = const {
        Cell::new(Live {
            names: 0,
            creds: 0,
            contexts: 0,
            buffers: 0,
        })
    };
    static DROPS_CONFIDENTIALITY: Cell<bool> = const { Cell::new(false) };
}

pub(crate) fn live() -> Live {
    LIVE.with(Cell::get)
}

fn track(change: impl FnOnce(&mut Live)) {
    LIVE.with(|cell| {
        let mut live = cell.get();
        change(&mut live);
        cell.set(live);
    })
}

/// Makes `gss_wrap` report success without confidentiality, like a broken mechanism would.
pub(crate) fn drop_confidentiality(broken: bool) {
    DROPS_CONFIDENTIALITY.with(|cell| cell.set(broken));
}

struct FakeName(String);

struct FakeCred {
    principal: String,
    usage: gss_cred_usage_t,
    password: Option<Vec<u8>>,
}

#[derive(PartialEq)]
enum Stage {
    AwaitingReply,
    Open,
}

struct FakeContext {
    initiator: bool,
    stage: Stage,
    local: String,
    peer: String,
    flags: u32,
}

pub(crate) fn cred_usage(cred: gss_cred_id_t) -> Option<gss_cred_usage_t> {
    unsafe { cred.cast::<FakeCred>().as_ref() }.map(|c| c.usage)
}

pub(crate) fn cred_password(cred: gss_cred_id_t) -> Option<Vec<u8>> {
    unsafe { cred.cast::<FakeCred>().as_ref() }.and_then(|c| c.password.clone())
}

unsafe fn set(out: *mut u32, value: u32) {
    if let Some(out) = unsafe { out.as_mut() } {
        *out = value;
    }
}

unsafe fn read(buffer: gss_buffer_t) -> Vec<u8> {
    match unsafe { buffer.as_ref() } {
        Some(desc) if !desc.value.is_null() => {
            unsafe { std::slice::from_raw_parts(desc.value as *const u8, desc.length) }.to_vec()
        }
        _ => Vec::new(),
    }
}

/// Hands `bytes` out the way the library hands out output buffers.
pub(crate) unsafe fn fill_buffer(buffer: gss_buffer_t, bytes: &[u8]) {
    let boxed: Box<[u8]> = bytes.into();
    let desc = unsafe { &mut *buffer };
    desc.length = boxed.len();
    desc.value = Box::into_raw(boxed).cast::<c_void>();
    track(|l| l.buffers += 1);
}

unsafe fn new_name(out: *mut gss_name_t, text: &str) {
    unsafe { *out = Box::into_raw(Box::new(FakeName(text.to_owned()))).cast() };
    track(|l| l.names += 1);
}

unsafe fn name_text(name: gss_name_t) -> Option<String> {
    unsafe { name.cast::<FakeName>().as_ref() }.map(|n| n.0.clone())
}

unsafe fn context<'a>(ctx: gss_ctx_id_t) -> Option<&'a mut FakeContext> {
    unsafe { ctx.cast::<FakeContext>().as_mut() }
}

fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

pub(crate) unsafe fn gss_release_buffer(minor: *mut OM_uint32, buffer: gss_buffer_t) -> OM_uint32 {
    unsafe { set(minor, 0) };
    let Some(desc) = (unsafe { buffer.as_mut() }) else {
        return GSS_S_COMPLETE;
    };
    if !desc.value.is_null() {
        drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(desc.value as *mut u8, desc.length)) });
        track(|l| l.buffers -= 1);
    }
    desc.length = 0;
    desc.value = ptr::null_mut();
    GSS_S_COMPLETE
}

pub(crate) unsafe fn gss_display_status(
    minor: *mut OM_uint32,
    status_value: OM_uint32,
    status_type: i32,
    _mech_type: gss_OID,
    message_context: *mut OM_uint32,
    status_string: gss_buffer_t,
) -> OM_uint32 {
    unsafe { set(minor, 0) };
    if message_context.is_null() {
        return CALL_INACCESSIBLE_WRITE;
    }
    let text = if status_type == GSS_C_MECH_CODE as i32 {
        format!("Mechanism error {status_value:#x}")
    } else {
        match (status_value >> 16) & 0xff {
            0 => "The routine completed successfully",
            1 => "An unsupported mechanism was requested",
            2 => "An invalid name was supplied",
            6 => "A token had an invalid signature",
            7 => "No credentials were supplied",
            8 => "No context has been established",
            9 => "A token was invalid",
            10 => "The supplied credentials were invalid",
            _ => "Unspecified GSS failure",
        }
        .to_owned()
    };
    unsafe {
        *message_context = 0;
        fill_buffer(status_string, text.as_bytes());
    }
    GSS_S_COMPLETE
}

pub(crate) unsafe fn gss_display_name(
    minor: *mut OM_uint32,
    name: gss_name_t,
    output: gss_buffer_t,
    output_type: *mut gss_OID,
) -> OM_uint32 {
    unsafe { set(minor, 0) };
    let Some(text) = (unsafe { name_text(name) }) else {
        return BAD_NAME;
    };
    unsafe {
        fill_buffer(output, text.as_bytes());
        if let Some(out) = output_type.as_mut() {
            *out = ptr::null_mut();
        }
    }
    GSS_S_COMPLETE
}

pub(crate) unsafe fn gss_import_name(
    minor: *mut OM_uint32,
    input: gss_buffer_t,
    _name_type: gss_OID,
    output: *mut gss_name_t,
) -> OM_uint32 {
    unsafe { set(minor, 0) };
    if output.is_null() {
        return CALL_INACCESSIBLE_WRITE;
    }
    match String::from_utf8(unsafe { read(input) }) {
        Ok(text) if !text.is_empty() => {
            unsafe { new_name(output, &text) };
            GSS_S_COMPLETE
        }
        _ => BAD_NAME,
    }
}

pub(crate) unsafe fn gss_release_name(minor: *mut OM_uint32, name: *mut gss_name_t) -> OM_uint32 {
    unsafe { set(minor, 0) };
    let Some(name) = (unsafe { name.as_mut() }) else {
        return CALL_INACCESSIBLE_WRITE;
    };
    if !name.is_null() {
        drop(unsafe { Box::from_raw(name.cast::<FakeName>()) });
        track(|l| l.names -= 1);
        *name = ptr::null_mut();
    }
    GSS_S_COMPLETE
}

unsafe fn new_cred(
    desired_name: gss_name_t,
    desired_mechs: gss_OID_set,
    usage: gss_cred_usage_t,
    password: Option<Vec<u8>>,
    output: *mut gss_cred_id_t,
    actual_mechs: *mut gss_OID_set,
    time_rec: *mut OM_uint32,
) -> OM_uint32 {
    let spnego_only = unsafe { desired_mechs.as_ref() }
        .is_some_and(|set| set.count == 1 && unsafe { mech::is_spnego(set.elements) });
    if !spnego_only {
        return BAD_MECH;
    }
    if output.is_null() {
        return CALL_INACCESSIBLE_WRITE;
    }
    let principal = unsafe { name_text(desired_name) }.unwrap_or_else(|| DEFAULT_PRINCIPAL.to_owned());
    let cred = FakeCred {
        principal,
        usage,
        password,
    };
    unsafe {
        *output = Box::into_raw(Box::new(cred)).cast();
        if let Some(out) = actual_mechs.as_mut() {
            *out = ptr::null_mut();
        }
        set(time_rec, 0);
    }
    track(|l| l.creds += 1);
    GSS_S_COMPLETE
}

#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn gss_acquire_cred(
    minor: *mut OM_uint32,
    desired_name: gss_name_t,
    _time_req: OM_uint32,
    desired_mechs: gss_OID_set,
    usage: gss_cred_usage_t,
    output: *mut gss_cred_id_t,
    actual_mechs: *mut gss_OID_set,
    time_rec: *mut OM_uint32,
) -> OM_uint32 {
    unsafe {
        set(minor, 0);
        new_cred(desired_name, desired_mechs, usage, None, output, actual_mechs, time_rec)
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn gss_acquire_cred_with_password(
    minor: *mut OM_uint32,
    desired_name: gss_name_t,
    password: gss_buffer_t,
    _time_req: OM_uint32,
    desired_mechs: gss_OID_set,
    usage: gss_cred_usage_t,
    output: *mut gss_cred_id_t,
    actual_mechs: *mut gss_OID_set,
    time_rec: *mut OM_uint32,
) -> OM_uint32 {
    unsafe { set(minor, 0) };
    let password = unsafe { read(password) };
    if password.is_empty() {
        return DEFECTIVE_CREDENTIAL;
    }
    unsafe { new_cred(desired_name, desired_mechs, usage, Some(password), output, actual_mechs, time_rec) }
}

pub(crate) unsafe fn gss_release_cred(minor: *mut OM_uint32, cred: *mut gss_cred_id_t) -> OM_uint32 {
    unsafe { set(minor, 0) };
    let Some(cred) = (unsafe { cred.as_mut() }) else {
        return CALL_INACCESSIBLE_WRITE;
    };
    if !cred.is_null() {
        drop(unsafe { Box::from_raw(cred.cast::<FakeCred>()) });
        track(|l| l.creds -= 1);
        *cred = ptr::null_mut();
    }
    GSS_S_COMPLETE
}

unsafe fn principal_for(cred: gss_cred_id_t, usage: u32, default: &str) -> Result<String, OM_uint32> {
    match unsafe { cred.cast::<FakeCred>().as_ref() } {
        None => Ok(default.to_owned()),
        Some(cred) if cred.usage == usage as gss_cred_usage_t => Ok(cred.principal.clone()),
        Some(_) => Err(NO_CRED),
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn gss_init_sec_context(
    minor: *mut OM_uint32,
    claimant_cred: gss_cred_id_t,
    context_handle: *mut gss_ctx_id_t,
    target_name: gss_name_t,
    mech_type: gss_OID,
    req_flags: OM_uint32,
    _time_req: OM_uint32,
    _bindings: gss_channel_bindings_t,
    input_token: gss_buffer_t,
    _actual_mech_type: *mut gss_OID,
    output_token: gss_buffer_t,
    ret_flags: *mut OM_uint32,
    time_rec: *mut OM_uint32,
) -> OM_uint32 {
    unsafe {
        set(minor, 0);
        set(time_rec, 0);
    }
    if !unsafe { mech::is_spnego(mech_type) } {
        return BAD_MECH;
    }
    let Some(handle) = (unsafe { context_handle.as_mut() }) else {
        return CALL_INACCESSIBLE_WRITE;
    };
    let input = unsafe { read(input_token) };
    if let Some(ctx) = unsafe { context(*handle) } {
        if !ctx.initiator || ctx.stage != Stage::AwaitingReply {
            return FAILURE;
        }
        if !input.starts_with(ACCEPTOR_TOKEN) {
            return DEFECTIVE_TOKEN;
        }
        ctx.stage = Stage::Open;
        unsafe { set(ret_flags, ctx.flags) };
        return GSS_S_COMPLETE;
    }
    if !input.is_empty() {
        return DEFECTIVE_TOKEN;
    }
    let local = match unsafe { principal_for(claimant_cred, GSS_C_INITIATE, DEFAULT_PRINCIPAL) } {
        Ok(local) => local,
        Err(major) => return major,
    };
    let Some(peer) = (unsafe { name_text(target_name) }) else {
        return BAD_NAME;
    };
    let flags = req_flags & GRANTED_FLAGS;
    let token = [INITIATOR_TOKEN, &flags.to_be_bytes(), local.as_bytes()].concat();
    let ctx = FakeContext {
        initiator: true,
        stage: Stage::AwaitingReply,
        local,
        peer,
        flags,
    };
    unsafe {
        *handle = Box::into_raw(Box::new(ctx)).cast();
        fill_buffer(output_token, &token);
        set(ret_flags, flags);
    }
    track(|l| l.contexts += 1);
    CONTINUE_NEEDED
}

#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn gss_accept_sec_context(
    minor: *mut OM_uint32,
    context_handle: *mut gss_ctx_id_t,
    acceptor_cred: gss_cred_id_t,
    input_token: gss_buffer_t,
    _bindings: gss_channel_bindings_t,
    _src_name: *mut gss_name_t,
    _mech_type: *mut gss_OID,
    output_token: gss_buffer_t,
    ret_flags: *mut OM_uint32,
    time_rec: *mut OM_uint32,
    _delegated_cred: *mut gss_cred_id_t,
) -> OM_uint32 {
    unsafe {
        set(minor, 0);
        set(time_rec, 0);
    }
    let Some(handle) = (unsafe { context_handle.as_mut() }) else {
        return CALL_INACCESSIBLE_WRITE;
    };
    if !handle.is_null() {
        return FAILURE;
    }
    let local = match unsafe { principal_for(acceptor_cred, GSS_C_ACCEPT, DEFAULT_SERVICE) } {
        Ok(local) => local,
        Err(major) => return major,
    };
    let input = unsafe { read(input_token) };
    let Some(rest) = input.strip_prefix(INITIATOR_TOKEN).filter(|rest| rest.len() > 4) else {
        return DEFECTIVE_TOKEN;
    };
    let (flags, peer) = rest.split_at(4);
    let Ok(peer) = String::from_utf8(peer.to_vec()) else {
        return DEFECTIVE_TOKEN;
    };
    let flags = u32::from_be_bytes([flags[0], flags[1], flags[2], flags[3]]);
    let token = [ACCEPTOR_TOKEN, local.as_bytes()].concat();
    let ctx = FakeContext {
        initiator: false,
        stage: Stage::Open,
        local,
        peer,
        flags,
    };
    unsafe {
        *handle = Box::into_raw(Box::new(ctx)).cast();
        fill_buffer(output_token, &token);
        set(ret_flags, flags);
    }
    track(|l| l.contexts += 1);
    GSS_S_COMPLETE
}

pub(crate) unsafe fn gss_delete_sec_context(
    minor: *mut OM_uint32,
    context_handle: *mut gss_ctx_id_t,
    _output_token: gss_buffer_t,
) -> OM_uint32 {
    unsafe { set(minor, 0) };
    let Some(handle) = (unsafe { context_handle.as_mut() }).filter(|h| !h.is_null()) else {
        unsafe { set(minor, MINOR_NO_CONTEXT) };
        return NO_CONTEXT;
    };
    drop(unsafe { Box::from_raw(handle.cast::<FakeContext>()) });
    track(|l| l.contexts -= 1);
    *handle = ptr::null_mut();
    GSS_S_COMPLETE
}

unsafe fn open_context<'a>(minor: *mut OM_uint32, ctx: gss_ctx_id_t) -> Option<&'a mut FakeContext> {
    let ctx = unsafe { context(ctx) }.filter(|c| c.stage == Stage::Open);
    if ctx.is_none() {
        unsafe { set(minor, MINOR_NO_CONTEXT) };
    }
    ctx
}

pub(crate) unsafe fn gss_wrap(
    minor: *mut OM_uint32,
    context_handle: gss_ctx_id_t,
    conf_req_flag: i32,
    _qop_req: gss_qop_t,
    input: gss_buffer_t,
    conf_state: *mut i32,
    output: gss_buffer_t,
) -> OM_uint32 {
    unsafe { set(minor, 0) };
    if unsafe { open_context(minor, context_handle) }.is_none() {
        return NO_CONTEXT;
    }
    let confidential = conf_req_flag != 0 && !DROPS_CONFIDENTIALITY.with(Cell::get);
    let message = unsafe { read(input) };
    let mut sealed = Vec::with_capacity(message.len() + 2);
    sealed.push(u8::from(confidential));
    if confidential {
        sealed.extend(message.iter().map(|b| b ^ SCRAMBLE));
    } else {
        sealed.extend_from_slice(&message);
    }
    sealed.push(checksum(&message));
    unsafe {
        if let Some(state) = conf_state.as_mut() {
            *state = i32::from(confidential);
        }
        fill_buffer(output, &sealed);
    }
    GSS_S_COMPLETE
}

pub(crate) unsafe fn gss_unwrap(
    minor: *mut OM_uint32,
    context_handle: gss_ctx_id_t,
    input: gss_buffer_t,
    output: gss_buffer_t,
    conf_state: *mut i32,
    qop_state: *mut gss_qop_t,
) -> OM_uint32 {
    unsafe { set(minor, 0) };
    if unsafe { open_context(minor, context_handle) }.is_none() {
        return NO_CONTEXT;
    }
    let sealed = unsafe { read(input) };
    let [marker, body @ .., sum] = sealed.as_slice() else {
        return DEFECTIVE_TOKEN;
    };
    let confidential = *marker == 1;
    let message: Vec<u8> = if confidential {
        body.iter().map(|b| b ^ SCRAMBLE).collect()
    } else {
        body.to_vec()
    };
    if checksum(&message) != *sum {
        return BAD_SIG;
    }
    unsafe {
        if let Some(state) = conf_state.as_mut() {
            *state = i32::from(confidential);
        }
        set(qop_state, GSS_C_QOP_DEFAULT);
        fill_buffer(output, &message);
    }
    GSS_S_COMPLETE
}

#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn gss_inquire_context(
    minor: *mut OM_uint32,
    context_handle: gss_ctx_id_t,
    src_name: *mut gss_name_t,
    _targ_name: *mut gss_name_t,
    _lifetime_rec: *mut OM_uint32,
    _mech_type: *mut gss_OID,
    _ctx_flags: *mut OM_uint32,
    _locally_initiated: *mut i32,
    _open: *mut i32,
) -> OM_uint32 {
    unsafe { set(minor, 0) };
    let Some(ctx) = (unsafe { context(context_handle) }) else {
        unsafe { set(minor, MINOR_NO_CONTEXT) };
        return NO_CONTEXT;
    };
    if !src_name.is_null() {
        let source = if ctx.initiator { &ctx.local } else { &ctx.peer };
        unsafe { new_name(src_name, source) };
    }
    GSS_S_COMPLETE
}
