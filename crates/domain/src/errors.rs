use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("unknown handler tag: {0}")]
    UnknownHandlerTag(String),

    #[error("invalid address literal: {0}")]
    InvalidAddressLiteral(String),

    #[error("address family mismatch: expected {expected}, got {literal}")]
    AddressFamilyMismatch {
        expected: &'static str,
        literal: String,
    },

    #[error("value '{0}' was not consumed by its handler")]
    UnconsumedValue(String),

    #[error("empty value for handler '{0}'")]
    EmptyValue(&'static str),

    #[error("invalid notification channel: {0}")]
    InvalidChannel(String),

    #[error("name is outside of served zones: {0}")]
    NotAuthoritative(String),

    #[error("cannot determine remote address for {0} peer")]
    UnsupportedPeer(&'static str),

    #[error("proxy mode is disabled")]
    ProxyDisabled,

    #[error("upstream transport error: {0}")]
    UpstreamTransport(String),

    #[error("upstream query timeout")]
    UpstreamTimeout,

    #[error("invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),

    #[error("upstream returned no answers for {0}")]
    EmptyUpstreamAnswer(String),

    #[error("invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("unsupported record type: {0}")]
    UnsupportedRecordType(String),
}

impl DomainError {
    /// Errors raised while turning labels into a pipeline.
    pub fn is_grammar_error(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEndOfInput
                | Self::UnknownHandlerTag(_)
                | Self::InvalidAddressLiteral(_)
                | Self::AddressFamilyMismatch { .. }
                | Self::UnconsumedValue(_)
                | Self::EmptyValue(_)
                | Self::InvalidChannel(_)
        )
    }

    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTransport(_)
                | Self::UpstreamTimeout
                | Self::InvalidUpstreamResponse(_)
                | Self::EmptyUpstreamAnswer(_)
        )
    }
}
