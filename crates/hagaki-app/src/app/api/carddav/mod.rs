// CardDAV API handlers.

use salvo::{Router, http::Method, routing::MethodFilter};

pub mod method;
pub mod props;
pub mod report;
pub mod response;

pub fn routes() -> anyhow::Result<Router> {
    Ok(Router::with_path("{**rest}")
        .options(method::options::options)
        .get(method::get::get)
        .put(method::put::put)
        .delete(method::delete::delete)
        .push(
            Router::new()
                .filter(MethodFilter(Method::from_bytes(b"PROPFIND")?))
                .goal(method::propfind::propfind),
        )
        .push(
            Router::new()
                .filter(MethodFilter(Method::from_bytes(b"PROPPATCH")?))
                .goal(method::proppatch::proppatch),
        )
        .push(
            Router::new()
                .filter(MethodFilter(Method::from_bytes(b"MKCOL")?))
                .goal(method::mkcol::mkcol),
        )
        .push(
            Router::new()
                .filter(MethodFilter(Method::from_bytes(b"REPORT")?))
                .goal(method::report::report),
        ))
}
