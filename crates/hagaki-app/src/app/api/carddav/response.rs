//! Shared response-writing helpers for the `CardDAV` handlers.

use salvo::Response;
use salvo::http::StatusCode;

use hagaki_rfc::dav::build::serialize_multistatus;
use hagaki_rfc::dav::core::Multistatus;
use hagaki_service::error::ServiceError;

/// ## Summary
/// Serializes a multistatus and writes it as a 207 response.
pub fn write_multistatus(res: &mut Response, multistatus: &Multistatus) {
    let xml = match serialize_multistatus(multistatus) {
        Ok(xml) => xml,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize multistatus");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    res.status_code(StatusCode::MULTI_STATUS);
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header(
        "Content-Type",
        salvo::http::HeaderValue::from_static("application/xml; charset=utf-8"),
        true,
    );
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Write body failure is non-fatal"
    )]
    let _ = res.write_body(xml);
}

/// ## Summary
/// Maps a service error to its protocol status code.
#[must_use]
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden(_) | ServiceError::UnsupportedMutation(_) => StatusCode::FORBIDDEN,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Malformed(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ServiceError::UidProbeExhausted(_)
        | ServiceError::InvalidConfiguration(_)
        | ServiceError::Db(_)
        | ServiceError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// ## Summary
/// Logs a service error and writes its status code.
pub fn write_service_error(res: &mut Response, err: &ServiceError) {
    let status = status_for(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, status = %status, "Request rejected");
    }
    res.status_code(status);
}
