use crate::{
    buffer::{Buffer, BufferRef},
    context::ContextHandle,
    cred::{Credentials, Inbound},
    error::Status,
    settings::ContextFlags,
    shim, Error,
};

/// An established acceptor-side context.
pub struct ServerContext {
    cred: Option<Credentials<Inbound>>,
    pub(crate) context: ContextHandle,
    flags: ContextFlags,
    token_buffer: Buffer,
}
impl ServerContext {
    /// Accepts the initiator's first token with whatever mechanism it offers.
    ///
    /// Without credentials the library uses its default acceptor identity (keytab).
    pub fn initialize(cred: Option<Credentials<Inbound>>, first_token: &[u8]) -> Result<StepOut, Error> {
        step(cred, ContextHandle::new(), first_token)
    }
    pub fn flags(&self) -> ContextFlags {
        self.flags
    }
    /// The token that completes mutual authentication on the initiator, if any.
    pub fn last_token(&self) -> Option<&[u8]> {
        (!self.token_buffer.is_empty()).then_some(self.token_buffer.as_slice())
    }
    pub fn credentials(&self) -> Option<&Credentials<Inbound>> {
        self.cred.as_ref()
    }
}

pub struct PendingServerContext {
    cred: Option<Credentials<Inbound>>,
    context: ContextHandle,
    token_buffer: Buffer,
}
impl PendingServerContext {
    pub fn next_token(&self) -> &[u8] {
        self.token_buffer.as_slice()
    }
    pub fn step(self, token: &[u8]) -> Result<StepOut, Error> {
        step(self.cred, self.context, token)
    }
}

pub enum StepOut {
    Pending(PendingServerContext),
    Finished(ServerContext),
}

fn step(cred: Option<Credentials<Inbound>>, mut context: ContextHandle, in_token: &[u8]) -> Result<StepOut, Error> {
    let mut minor = 0;
    let mut ret_flags = 0;
    let mut input = BufferRef::from_slice(in_token);
    let mut token_buffer = Buffer::empty();
    let major = unsafe {
        shim::accept_sec_context(
            &mut minor,
            context.as_mut_ptr(),
            cred.as_ref().map_or(std::ptr::null_mut(), Credentials::as_ptr),
            input.as_mut_ptr(),
            token_buffer.as_mut_ptr(),
            &mut ret_flags,
        )
    };
    let status = match Status::new(major, minor).check() {
        Ok(status) => status,
        Err(err) => {
            log::debug!("accepting a SPNEGO context failed: {err}");
            return Err(err.into());
        }
    };
    if context.is_null() {
        return Err(Error::NullHandle("context"));
    }
    let flags = ContextFlags::from_bits_retain(ret_flags);
    if status.is_continue_needed() {
        log::debug!("accepted context needs another round trip");
        Ok(StepOut::Pending(PendingServerContext {
            cred,
            context,
            token_buffer,
        }))
    } else {
        log::debug!("accepted context established ({flags:?})");
        Ok(StepOut::Finished(ServerContext {
            cred,
            context,
            flags,
            token_buffer,
        }))
    }
}
