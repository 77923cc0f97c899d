use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Convenient result alias for viewcycle_core.
pub type Result<T> = std::result::Result<T, CoreError>;

/// How loudly a host should report the error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    /// Bad input the caller can correct (configuration).
    Warn,
    /// A host call that broke the lifecycle contract.
    Error,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
    Lifecycle,
    Config,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidTransition,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Payload {
    None,

    /// Host call rejected by a delegate: compact ids of the call and the state it hit.
    HostCall { call: u8, from_state: u8 },
}

/// The one error type that crosses module boundaries in viewcycle_core.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{severity:?}: {message}")]
pub struct CoreError {
    pub domain: Domain,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: Cow<'static, str>,
    pub payload: Payload,
}

impl CoreError {
    pub fn warn(domain: Domain, kind: ErrorKind) -> ErrB {
        ErrB::new(Severity::Warn, domain, kind)
    }

    pub fn error(domain: Domain, kind: ErrorKind) -> ErrB {
        ErrB::new(Severity::Error, domain, kind)
    }

    /// A host call arrived in a state that does not accept it.
    ///
    /// `call` and `state` are `(id, label)` pairs; `expected` lists the accepted states.
    pub fn invalid_host_call(
        call: (u8, &'static str),
        state: (u8, &'static str),
        expected: &'static str,
    ) -> Self {
        CoreError::error(Domain::Lifecycle, ErrorKind::InvalidTransition)
            .msgf(format_args!(
                "{}() was called in state {}, expected {}",
                call.1, state.1, expected
            ))
            .payload(Payload::HostCall {
                call: call.0,
                from_state: state.0,
            })
            .build()
    }

    pub fn is_invalid_transition(&self) -> bool {
        self.kind == ErrorKind::InvalidTransition
    }
}

/// Builder returned by [`CoreError::warn`] / [`CoreError::error`].
#[derive(Debug, Clone)]
pub struct ErrB {
    error: CoreError,
}

impl ErrB {
    fn new(severity: Severity, domain: Domain, kind: ErrorKind) -> Self {
        Self {
            error: CoreError {
                domain,
                kind,
                severity,
                message: Cow::Borrowed(""),
                payload: Payload::None,
            },
        }
    }

    pub fn msg(mut self, m: impl Into<Cow<'static, str>>) -> Self {
        self.error.message = m.into();
        self
    }

    pub fn msgf(mut self, args: fmt::Arguments<'_>) -> Self {
        self.error.message = Cow::Owned(args.to_string());
        self
    }

    pub fn payload(mut self, p: Payload) -> Self {
        self.error.payload = p;
        self
    }

    pub fn build(self) -> CoreError {
        self.error
    }
}
