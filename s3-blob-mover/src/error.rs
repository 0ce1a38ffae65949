/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// The kind of failure that ended a transfer or the construction of a [`Mover`](crate::Mover).
///
/// Variants without a `Source`/`Destination` prefix come from configuration loading, request
/// validation or the role assumption that happens before either store is contacted.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required configuration was missing or malformed.
    Configuration,
    /// The transfer request could not be built from the given values.
    InvalidRequest,
    /// The calling identity is not allowed to assume the role.
    Authorization,
    /// The role to assume does not exist.
    NotFound,
    /// The identity service could not be reached or failed on its side.
    Transient,
    /// The source bucket or object does not exist.
    SourceNotFound,
    /// Access to the source object was denied.
    SourceAuthorization,
    /// The source store could not be reached or failed on its side.
    SourceTransient,
    /// The destination container does not exist.
    DestinationNotFound,
    /// A blob already exists at the destination and overwriting was not allowed.
    DestinationConflict,
    /// Access to the destination was denied.
    DestinationAuthorization,
    /// The destination store could not be reached or failed on its side.
    DestinationTransient,
    /// A failure that does not fit any of the other kinds.
    Unhandled,
}

impl ErrorKind {
    fn description(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "invalid configuration",
            ErrorKind::InvalidRequest => "invalid transfer request",
            ErrorKind::Authorization => "not authorized to assume role",
            ErrorKind::NotFound => "role not found",
            ErrorKind::Transient => "identity service unavailable",
            ErrorKind::SourceNotFound => "source object not found",
            ErrorKind::SourceAuthorization => "access to source object denied",
            ErrorKind::SourceTransient => "source store unavailable",
            ErrorKind::DestinationNotFound => "destination container not found",
            ErrorKind::DestinationConflict => "destination blob already exists",
            ErrorKind::DestinationAuthorization => "access to destination denied",
            ErrorKind::DestinationTransient => "destination store unavailable",
            ErrorKind::Unhandled => "unhandled error",
        }
    }
}

/// Error returned when loading configuration, assuming the role, or moving an object fails.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
    message: Option<Cow<'static, str>>,
}

impl Error {
    pub(crate) fn new(
        kind: ErrorKind,
        source: Option<BoxError>,
        message: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            source,
            message,
        }
    }

    pub(crate) fn with_source(kind: ErrorKind, source: impl Into<BoxError>) -> Self {
        Self::new(kind, Some(source.into()), None)
    }

    pub(crate) fn with_message(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(kind, None, Some(message.into()))
    }

    pub(crate) fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_message(ErrorKind::Configuration, message)
    }

    pub(crate) fn invalid_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_message(ErrorKind::InvalidRequest, message)
    }

    /// Classifies a failed AWS SDK call made on behalf of `stage`.
    pub(crate) fn from_sdk<E>(stage: Stage, err: SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    {
        let kind = stage.kind(classify_sdk_error(&err));
        Self::with_source(kind, err)
    }

    /// Classifies a failed Azure call made on behalf of `stage`.
    pub(crate) fn from_azure(stage: Stage, err: azure_core::Error) -> Self {
        let kind = stage.kind(classify_azure_error(&err));
        Self::with_source(kind, err)
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.description())?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, None, None)
    }
}

/// Which collaborator a failed call was made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Identity,
    Source,
    Destination,
}

/// Store-independent classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    NotFound,
    Conflict,
    Authorization,
    Transient,
    Unhandled,
}

impl Stage {
    pub(crate) fn kind(self, failure: Failure) -> ErrorKind {
        use Failure::*;
        match (self, failure) {
            (Stage::Identity, NotFound) => ErrorKind::NotFound,
            (Stage::Identity, Authorization) => ErrorKind::Authorization,
            (Stage::Identity, Transient) => ErrorKind::Transient,
            (Stage::Source, NotFound) => ErrorKind::SourceNotFound,
            (Stage::Source, Authorization) => ErrorKind::SourceAuthorization,
            (Stage::Source, Transient) => ErrorKind::SourceTransient,
            (Stage::Destination, NotFound) => ErrorKind::DestinationNotFound,
            (Stage::Destination, Conflict) => ErrorKind::DestinationConflict,
            (Stage::Destination, Authorization) => ErrorKind::DestinationAuthorization,
            (Stage::Destination, Transient) => ErrorKind::DestinationTransient,
            (_, Conflict) | (_, Unhandled) => ErrorKind::Unhandled,
        }
    }
}

fn classify_sdk_error<E: ProvideErrorMetadata>(err: &SdkError<E, HttpResponse>) -> Failure {
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) | SdkError::ResponseError(_) => {
            Failure::Transient
        }
        SdkError::ServiceError(context) => context
            .err()
            .code()
            .and_then(aws_failure_for_code)
            .unwrap_or_else(|| failure_for_status(context.raw().status().as_u16())),
        _ => Failure::Unhandled,
    }
}

fn aws_failure_for_code(code: &str) -> Option<Failure> {
    let failure = match code {
        "NoSuchKey" | "NoSuchBucket" | "NoSuchEntity" | "NotFound" => Failure::NotFound,
        "AccessDenied"
        | "AllAccessDisabled"
        | "ExpiredToken"
        | "ExpiredTokenException"
        | "InvalidAccessKeyId"
        | "InvalidClientTokenId"
        | "InvalidToken"
        | "RegionDisabledException"
        | "SignatureDoesNotMatch" => Failure::Authorization,
        "IDPCommunicationError"
        | "InternalError"
        | "RequestTimeout"
        | "ServiceUnavailable"
        | "SlowDown"
        | "Throttling"
        | "ThrottlingException" => Failure::Transient,
        _ => return None,
    };
    Some(failure)
}

fn classify_azure_error(err: &azure_core::Error) -> Failure {
    match err.kind() {
        azure_core::error::ErrorKind::HttpResponse { status, error_code } => error_code
            .as_deref()
            .and_then(azure_failure_for_code)
            .unwrap_or_else(|| failure_for_status(u16::from(*status))),
        azure_core::error::ErrorKind::Io => Failure::Transient,
        _ => Failure::Unhandled,
    }
}

fn azure_failure_for_code(code: &str) -> Option<Failure> {
    let failure = match code {
        "BlobAlreadyExists" | "ConditionNotMet" => Failure::Conflict,
        "ContainerNotFound" | "ResourceNotFound" => Failure::NotFound,
        "AccountIsDisabled"
        | "AuthenticationFailed"
        | "AuthorizationFailure"
        | "AuthorizationPermissionMismatch"
        | "InsufficientAccountPermissions" => Failure::Authorization,
        "InternalError" | "OperationTimedOut" | "ServerBusy" => Failure::Transient,
        _ => return None,
    };
    Some(failure)
}

fn failure_for_status(status: u16) -> Failure {
    match status {
        401 | 403 => Failure::Authorization,
        404 => Failure::NotFound,
        409 | 412 => Failure::Conflict,
        408 | 429 | 500..=599 => Failure::Transient,
        _ => Failure::Unhandled,
    }
}
