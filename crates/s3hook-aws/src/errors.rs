//! Mapping of AWS SDK errors onto `s3hook_core::Error`

use aws_sdk_sqs::error::{ProvideErrorMetadata, SdkError};
use aws_smithy_types::error::display::DisplayErrorContext;
use s3hook_core::Error;

/// Error codes reporting an authorization or authentication failure
const DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "AuthFailure",
    "ExpiredToken",
    "InvalidAccessKeyId",
    "InvalidClientTokenId",
    "InvalidSecurity",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

/// Error codes reporting a missing queue or bucket
const NOT_FOUND_CODES: &[&str] = &[
    "AWS.SimpleQueueService.NonExistentQueue",
    "NonExistentQueue",
    "QueueDoesNotExist",
    "NoSuchBucket",
];

/// Classify an error code returned by an AWS API
pub(crate) fn classify_code(provider: &str, operation: &str, code: &str, message: &str) -> Error {
    let detail = format!("{} ({}): {}", operation, code, message);

    if DENIED_CODES.contains(&code) {
        Error::denied(detail)
    } else if NOT_FOUND_CODES.contains(&code) {
        Error::not_found(detail)
    } else {
        Error::provider(provider, detail)
    }
}

/// Convert an SDK error into the crate error taxonomy
pub(crate) fn from_sdk_error<E, R>(provider: &str, operation: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::TimeoutError(_) => Error::timeout(format!("{} did not complete in time", operation)),
        SdkError::ServiceError(service_err) => {
            let inner = service_err.err();
            classify_code(
                provider,
                operation,
                inner.code().unwrap_or("Unknown"),
                inner.message().unwrap_or_default(),
            )
        }
        _ => Error::provider(
            provider,
            format!("{}: {}", operation, DisplayErrorContext(&err)),
        ),
    }
}
