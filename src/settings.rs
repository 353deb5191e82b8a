use bitflags::bitflags;
use libgssapi_sys::{
    GSS_C_ANON_FLAG, GSS_C_CONF_FLAG, GSS_C_DELEG_FLAG, GSS_C_INTEG_FLAG, GSS_C_MUTUAL_FLAG, GSS_C_REPLAY_FLAG,
    GSS_C_SEQUENCE_FLAG,
};

bitflags! {
    /// Context flags, as requested from and returned by the negotiation calls.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u32 {
        const DELEGATION = GSS_C_DELEG_FLAG;
        const MUTUAL = GSS_C_MUTUAL_FLAG;
        const REPLAY_DETECT = GSS_C_REPLAY_FLAG;
        const SEQUENCE_DETECT = GSS_C_SEQUENCE_FLAG;
        const CONFIDENTIALITY = GSS_C_CONF_FLAG;
        const INTEGRITY = GSS_C_INTEG_FLAG;
        const ANONYMOUS = GSS_C_ANON_FLAG;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientSettings {
    pub flags: ContextFlags,
}
impl ClientSettings {
    /// Asks the acceptor for an unconstrained delegation permission.
    ///
    /// Only honoured by Kerberos, and not needed for constrained delegation.
    #[must_use]
    pub fn request_delegation(self) -> Self {
        Self {
            flags: self.flags | ContextFlags::DELEGATION,
        }
    }
    #[must_use]
    pub fn without_mutual_auth(self) -> Self {
        Self {
            flags: self.flags - ContextFlags::MUTUAL,
        }
    }
    /// Integrity only; `encrypt` will be refused on the resulting context
    #[must_use]
    pub fn without_confidentiality(self) -> Self {
        Self {
            flags: self.flags - ContextFlags::CONFIDENTIALITY,
        }
    }
    #[must_use]
    pub fn request_anonymity(self) -> Self {
        Self {
            flags: self.flags | ContextFlags::ANONYMOUS,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            flags: ContextFlags::MUTUAL
                | ContextFlags::REPLAY_DETECT
                | ContextFlags::SEQUENCE_DETECT
                | ContextFlags::CONFIDENTIALITY
                | ContextFlags::INTEGRITY,
        }
    }
}
