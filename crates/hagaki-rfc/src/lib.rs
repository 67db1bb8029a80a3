//! Wire-format support for hagaki.
//!
//! - [`vcard`] — vCard parsing and serialization (RFC 2426 / RFC 6350).
//! - [`dav`] — WebDAV/CardDAV XML request parsing and multistatus building
//!   (RFC 4918 / RFC 6352).

pub mod dav;
pub mod vcard;
