use std::{fmt::Display, num::NonZero};

use crate::{buffer::Buffer, shim, GssStatus};

/// Calling-error and routine-error fields of a major status.
const ERROR_FIELDS: u32 = 0xffff_0000;

/// `gss_display_status` hands out one message per call; this bounds the walk.
const MAX_STATUS_MESSAGES: usize = 16;

/// The raw `(major, minor)` pair every GSSAPI call reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Status {
    pub major: u32,
    pub minor: u32,
}
impl Status {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
    pub const fn is_error(self) -> bool {
        self.major & ERROR_FIELDS != 0
    }
    pub const fn is_continue_needed(self) -> bool {
        !self.is_error() && self.major & GssStatus::ContinueNeeded as u32 != 0
    }
    pub const fn is_complete(self) -> bool {
        !self.is_error() && !self.is_continue_needed()
    }
    /// Splits off the failing statuses; supplementary bits on a successful call pass through.
    pub fn check(self) -> Result<Self, StatusError> {
        match GssErrorCode::new(self.major) {
            Some(major) if self.is_error() => Err(StatusError {
                major,
                minor: MechanismErrorCode::new(self.minor),
            }),
            _ => Ok(self),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    /// A generic GSS major status
    Gss,
    /// A mechanism-specific minor status
    Mechanism,
}
impl StatusKind {
    pub(crate) fn is_mech_code(self) -> bool {
        matches!(self, Self::Mechanism)
    }
}
impl Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gss => f.write_str("GSS"),
            Self::Mechanism => f.write_str("mechanism"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MechanismErrorCode(NonZero<u32>);
impl MechanismErrorCode {
    pub fn new(val: u32) -> Option<Self> {
        NonZero::new(val).map(Self)
    }
    pub fn get(self) -> u32 {
        self.0.get()
    }
}
impl Display for MechanismErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_status(self.get(), StatusKind::Mechanism, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GssErrorCode(NonZero<u32>);
impl GssErrorCode {
    pub fn new(val: u32) -> Option<Self> {
        NonZero::new(val).map(Self)
    }
    pub fn get(self) -> u32 {
        self.0.get()
    }
}
impl Display for GssErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_status(self.get(), StatusKind::Gss, f)
    }
}

fn write_status(val: u32, kind: StatusKind, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match display_status(val, kind) {
        Ok(text) if !text.is_empty() => f.write_str(&text),
        _ => write!(f, "{kind} status {val:#010x}"),
    }
}

/// Renders a status code as the library's human-readable text.
///
/// Every message the library has for `code` is collected and joined with `"; "`.
pub fn display_status(code: u32, kind: StatusKind) -> Result<String, Error> {
    let mut messages = Vec::new();
    let mut message_context = 0;
    for _ in 0..MAX_STATUS_MESSAGES {
        let mut minor = 0;
        let mut buffer = Buffer::empty();
        let major = unsafe {
            shim::display_status(
                &mut minor,
                code,
                kind.is_mech_code(),
                &mut message_context,
                buffer.as_mut_ptr(),
            )
        };
        Status::new(major, minor).check()?;
        if !buffer.is_empty() {
            messages.push(String::from_utf8_lossy(&buffer).into_owned());
        }
        if message_context == 0 {
            break;
        }
    }
    Ok(messages.join("; "))
}

/// A failed GSSAPI call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusError {
    major: GssErrorCode,
    minor: Option<MechanismErrorCode>,
}
impl StatusError {
    pub fn status(&self) -> Status {
        Status::new(self.major.get(), self.minor.map_or(0, MechanismErrorCode::get))
    }
    pub fn major(&self) -> GssErrorCode {
        self.major
    }
    pub fn minor(&self) -> Option<MechanismErrorCode> {
        self.minor
    }
}
impl std::error::Error for StatusError {}
impl Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.minor {
            Some(minor) => write!(f, "{} ({minor})", self.major),
            None => self.major.fmt(f),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error("{0} contains an interior nul byte")]
    InteriorNul(&'static str),
    #[error("the library reported success but returned no {0} handle")]
    NullHandle(&'static str),
    #[error("the security context was established without confidentiality")]
    ConfidentialityUnavailable,
}
impl Error {
    /// The raw status pair, if the error came from the library.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Status(err) => Some(err.status()),
            _ => None,
        }
    }
}
