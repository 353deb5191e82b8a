use std::ops::Deref;

use crate::{
    buffer::{Buffer, BufferRef},
    client::ClientContext,
    context::ContextHandle,
    error::Status,
    name::NameHandle,
    server::ServerContext,
    settings::ContextFlags,
    shim, Error,
};

/// Per-message protection over an established context.
pub trait SecurityContext {
    fn handle(&self) -> &ContextHandle;
    fn flags(&self) -> ContextFlags;

    /// Wraps `message` with confidentiality. Refused without calling the library
    /// when negotiation did not grant confidentiality.
    fn encrypt(&self, message: &[u8]) -> Result<Encrypted, Error> {
        if !self.flags().contains(ContextFlags::CONFIDENTIALITY) {
            return Err(Error::ConfidentialityUnavailable);
        }
        wrap(self.handle(), true, message).map(Encrypted)
    }
    /// Wraps `message` with integrity protection only.
    fn sign(&self, message: &[u8]) -> Result<Signed, Error> {
        wrap(self.handle(), false, message).map(Signed)
    }
    /// Verifies a wrapped message from the peer and recovers its payload.
    fn unwrap(&self, message: &[u8]) -> Result<Plaintext, Error> {
        let mut minor = 0;
        let mut input = BufferRef::from_slice(message);
        let mut buffer = Buffer::empty();
        let major = unsafe { shim::unwrap(&mut minor, self.handle().as_ptr(), input.as_mut_ptr(), buffer.as_mut_ptr()) };
        Status::new(major, minor).check()?;
        Ok(Plaintext(buffer))
    }
    /// The authenticated initiator of the context.
    fn source_name(&self) -> Result<NameHandle, Error> {
        self.handle().source_name()
    }
}

fn wrap(context: &ContextHandle, encrypt: bool, message: &[u8]) -> Result<Buffer, Error> {
    let mut minor = 0;
    let mut input = BufferRef::from_slice(message);
    let mut buffer = Buffer::empty();
    let major = unsafe { shim::wrap(&mut minor, context.as_ptr(), encrypt, input.as_mut_ptr(), buffer.as_mut_ptr()) };
    if let Err(err) = Status::new(major, minor).check() {
        log::debug!("wrapping a message failed: {err}");
        return Err(err.into());
    }
    Ok(buffer)
}

impl SecurityContext for ClientContext {
    fn handle(&self) -> &ContextHandle {
        &self.context
    }
    fn flags(&self) -> ContextFlags {
        ClientContext::flags(self)
    }
}
impl SecurityContext for ServerContext {
    fn handle(&self) -> &ContextHandle {
        &self.context
    }
    fn flags(&self) -> ContextFlags {
        ServerContext::flags(self)
    }
}

pub struct Plaintext(Buffer);
impl Plaintext {
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}
impl Deref for Plaintext {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

pub struct Encrypted(Buffer);
impl Encrypted {
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}
impl Deref for Encrypted {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}
impl AsRef<[u8]> for Encrypted {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

pub struct Signed(Buffer);
impl Signed {
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}
impl Deref for Signed {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}
impl AsRef<[u8]> for Signed {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
