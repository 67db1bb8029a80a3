//! OPTIONS method handler: DAV capability advertisement.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

/// ## Summary
/// Advertises the DAV compliance classes and allowed methods.
#[handler]
pub async fn options(_req: &mut Request, res: &mut Response, _depot: &Depot) {
    res.status_code(StatusCode::OK);

    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header("DAV", "1, 3, addressbook", true);
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header(
        "Allow",
        "OPTIONS, GET, PUT, DELETE, PROPFIND, PROPPATCH, MKCOL, REPORT",
        true,
    );
}
