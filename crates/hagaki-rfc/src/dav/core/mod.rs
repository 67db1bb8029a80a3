//! Core DAV request/response types.

mod depth;
mod mkcol;
mod multistatus;
mod namespace;
mod propfind;
mod property;
mod proppatch;
mod report;

pub use depth::Depth;
pub use mkcol::MkcolRequest;
pub use multistatus::{Multistatus, Propstat, PropstatResponse, Status};
pub use namespace::{CARDDAV_NS, CS_NS, DAV_NS, Namespace, QName, carddav_props, dav_props};
pub use propfind::{PropfindRequest, PropfindType};
pub use property::{DavProperty, PropertyName, PropertyValue};
pub use proppatch::{PropertyUpdate, ProppatchRequest, SetOrRemove};
pub use report::{MultigetRequest, ReportRequest, SyncCollectionRequest};
