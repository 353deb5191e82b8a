use crate::{
    buffer::{Buffer, BufferRef},
    context::ContextHandle,
    cred::{Credentials, Outbound},
    error::Status,
    name::NameHandle,
    settings::{ClientSettings, ContextFlags},
    shim, Error,
};

/// An established initiator-side context.
pub struct ClientContext {
    cred: Option<Credentials<Outbound>>,
    pub(crate) context: ContextHandle,
    flags: ContextFlags,
    last_token: Buffer,
}
impl ClientContext {
    /// Starts SPNEGO negotiation towards `target_principal`.
    ///
    /// Without credentials the library picks the default identity.
    pub fn initialize(
        cred: Option<Credentials<Outbound>>,
        target_principal: &str,
        settings: ClientSettings,
    ) -> Result<StepOut, Error> {
        let target = NameHandle::import_nt_user(target_principal)?;
        step(ContextHandle::new(), cred, target, settings, None)
    }
    pub fn flags(&self) -> ContextFlags {
        self.flags
    }
    pub fn is_mutually_authenticated(&self) -> bool {
        self.flags.contains(ContextFlags::MUTUAL)
    }
    /// A final token the acceptor still needs, if the mechanism produced one.
    pub fn last_token(&self) -> Option<&[u8]> {
        (!self.last_token.is_empty()).then_some(self.last_token.as_slice())
    }
    pub fn credentials(&self) -> Option<&Credentials<Outbound>> {
        self.cred.as_ref()
    }
}

/// A context waiting for the acceptor's answer to [`PendingClientContext::next_token`].
pub struct PendingClientContext {
    cred: Option<Credentials<Outbound>>,
    context: ContextHandle,
    target: NameHandle,
    settings: ClientSettings,
    next_token: Buffer,
}
impl PendingClientContext {
    pub fn next_token(&self) -> &[u8] {
        self.next_token.as_slice()
    }
    pub fn step(self, token: &[u8]) -> Result<StepOut, Error> {
        let PendingClientContext {
            cred,
            context,
            target,
            settings,
            ..
        } = self;
        step(context, cred, target, settings, Some(token))
    }
}

pub enum StepOut {
    Pending(PendingClientContext),
    Finished(ClientContext),
}

fn step(
    mut context: ContextHandle,
    cred: Option<Credentials<Outbound>>,
    target: NameHandle,
    settings: ClientSettings,
    token: Option<&[u8]>,
) -> Result<StepOut, Error> {
    let mut minor = 0;
    let mut ret_flags = 0;
    let mut input = BufferRef::from_slice(token.unwrap_or_default());
    let mut output = Buffer::empty();
    let major = unsafe {
        shim::init_sec_context_spnego(
            &mut minor,
            cred.as_ref().map_or(std::ptr::null_mut(), Credentials::as_ptr),
            context.as_mut_ptr(),
            target.as_ptr(),
            settings.flags.bits(),
            input.as_mut_ptr(),
            output.as_mut_ptr(),
            &mut ret_flags,
        )
    };
    let status = match Status::new(major, minor).check() {
        Ok(status) => status,
        Err(err) => {
            log::debug!("initiating a SPNEGO context with {target} failed: {err}");
            return Err(err.into());
        }
    };
    if context.is_null() {
        return Err(Error::NullHandle("context"));
    }
    let flags = ContextFlags::from_bits_retain(ret_flags);
    if status.is_continue_needed() {
        log::debug!("SPNEGO context with {target} needs another round trip");
        Ok(StepOut::Pending(PendingClientContext {
            cred,
            context,
            target,
            settings,
            next_token: output,
        }))
    } else {
        log::debug!("SPNEGO context with {target} established ({flags:?})");
        Ok(StepOut::Finished(ClientContext {
            cred,
            context,
            flags,
            last_token: output,
        }))
    }
}
