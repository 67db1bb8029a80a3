//! Multistatus response types (RFC 4918 §13).

use super::property::DavProperty;

/// An HTTP status carried inside a multistatus body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub u16);

impl Status {
    pub const OK: Self = Self(200);
    pub const NOT_FOUND: Self = Self(404);
    pub const FORBIDDEN: Self = Self(403);
    pub const FAILED_DEPENDENCY: Self = Self(424);

    /// Returns the status line as it appears in the XML body.
    #[must_use]
    pub fn as_line(self) -> String {
        let reason = match self.0 {
            200 => "OK",
            403 => "Forbidden",
            404 => "Not Found",
            424 => "Failed Dependency",
            507 => "Insufficient Storage",
            _ => "Status",
        };
        format!("HTTP/1.1 {} {reason}", self.0)
    }
}

/// One propstat group: properties sharing a status.
#[derive(Debug, Clone)]
pub struct Propstat {
    pub status: Status,
    pub props: Vec<DavProperty>,
}

/// One `<D:response>` element.
#[derive(Debug, Clone)]
pub struct PropstatResponse {
    /// The resource href.
    pub href: String,
    /// Propstat groups; empty when `status` is set instead.
    pub propstats: Vec<Propstat>,
    /// Bare response status (used for deleted members in sync reports).
    pub status: Option<Status>,
}

impl PropstatResponse {
    /// Creates a response with found/not-found propstat groups.
    ///
    /// Properties with a value land in a 200 propstat, properties without
    /// one in a 404 propstat. Empty groups are omitted.
    #[must_use]
    pub fn from_properties(href: impl Into<String>, props: Vec<DavProperty>) -> Self {
        let (found, missing): (Vec<_>, Vec<_>) =
            props.into_iter().partition(|p| p.value.is_some());

        let mut propstats = Vec::new();
        if !found.is_empty() {
            propstats.push(Propstat {
                status: Status::OK,
                props: found,
            });
        }
        if !missing.is_empty() {
            propstats.push(Propstat {
                status: Status::NOT_FOUND,
                props: missing,
            });
        }

        Self {
            href: href.into(),
            propstats,
            status: None,
        }
    }

    /// Creates a bare-status response (no propstat).
    #[must_use]
    pub fn with_status(href: impl Into<String>, status: Status) -> Self {
        Self {
            href: href.into(),
            propstats: Vec::new(),
            status: Some(status),
        }
    }
}

/// A complete `<D:multistatus>` response body.
#[derive(Debug, Clone, Default)]
pub struct Multistatus {
    pub responses: Vec<PropstatResponse>,
    /// `<D:sync-token>` for sync-collection reports.
    pub sync_token: Option<String>,
}

impl Multistatus {
    #[must_use]
    pub fn new(responses: Vec<PropstatResponse>) -> Self {
        Self {
            responses,
            sync_token: None,
        }
    }

    #[must_use]
    pub fn with_sync_token(mut self, token: impl Into<String>) -> Self {
        self.sync_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dav::core::QName;

    #[test]
    fn status_line() {
        assert_eq!(Status::OK.as_line(), "HTTP/1.1 200 OK");
        assert_eq!(Status::NOT_FOUND.as_line(), "HTTP/1.1 404 Not Found");
    }

    #[test]
    fn partitions_found_and_missing() {
        let response = PropstatResponse::from_properties(
            "/carddav/addressbooks/u/work/",
            vec![
                DavProperty::text(QName::dav("displayname"), "Work"),
                DavProperty::not_found(QName::dav("quota-used-bytes")),
            ],
        );

        assert_eq!(response.propstats.len(), 2);
        assert_eq!(response.propstats[0].status, Status::OK);
        assert_eq!(response.propstats[1].status, Status::NOT_FOUND);
    }

    #[test]
    fn all_found_has_single_propstat() {
        let response = PropstatResponse::from_properties(
            "/x",
            vec![DavProperty::text(QName::dav("displayname"), "Work")],
        );
        assert_eq!(response.propstats.len(), 1);
    }
}
