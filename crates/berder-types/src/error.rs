/// Coarse classification shared by every error in the workspace.
///
/// Callers that only care about the failure category match on this
/// instead of on the layer-specific enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The byte stream violates BER/DER TLV structure.
    MalformedEncoding,
    /// A well-formed tree does not match the expected schema.
    SchemaViolation,
    /// Tagged-object resolution asked for an incompatible type.
    TypeMismatch,
    /// A domain invariant failed while constructing a value.
    ConstraintViolation,
    /// An algorithm identifier is unknown to the injected registry.
    UnsupportedAlgorithm,
    /// An external capability failed without producing a verdict.
    Engine,
}

/// ASN.1 codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Asn1Error {
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
}

impl Asn1Error {
    /// Shorthand for a `MalformedEncoding` with the given reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Asn1Error::MalformedEncoding(reason.into())
    }

    /// Shorthand for a `TypeMismatch`.
    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Asn1Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Asn1Error::MalformedEncoding(_) => ErrorKind::MalformedEncoding,
            Asn1Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        }
    }
}

/// Errors raised by the typed structure layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PkiError {
    #[error("schema violation: {0}")]
    SchemaViolation(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("engine failure: {0}")]
    Engine(String),
    #[error("asn1 error: {0}")]
    Asn1(#[from] Asn1Error),
}

impl PkiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PkiError::SchemaViolation(_) => ErrorKind::SchemaViolation,
            PkiError::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            PkiError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            PkiError::Engine(_) => ErrorKind::Engine,
            PkiError::Asn1(e) => e.kind(),
        }
    }
}
