//! Typed parsing of `CardDAV` request paths.
//!
//! The server exposes a fixed layout:
//! `/carddav/addressbooks/{owner}/{addressbook-uri}/{card-uri}`.

use salvo::Depot;

use hagaki_core::constants::{ADDRESSBOOKS_ROUTE_COMPONENT, CARDDAV_ROUTE_PREFIX};

/// Depot key under which the parsed path is stored.
pub const CARDDAV_PATH_DEPOT_KEY: &str = "carddav_path";

/// A parsed `CardDAV` resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardDavPath {
    /// `/carddav` or `/carddav/addressbooks`.
    Root,
    /// `/carddav/addressbooks/{owner}`: the owner's addressbook home.
    AddressbookHome { owner: String },
    /// `/carddav/addressbooks/{owner}/{uri}`: one addressbook collection.
    Addressbook { owner: String, uri: String },
    /// `/carddav/addressbooks/{owner}/{uri}/{card}`: one card resource.
    Card {
        owner: String,
        addressbook_uri: String,
        card_uri: String,
    },
}

/// ## Summary
/// Parses a request path into a [`CardDavPath`]; `None` for paths outside
/// the `CardDAV` layout.
#[must_use]
pub fn parse_carddav_path(path: &str) -> Option<CardDavPath> {
    let rest = path.strip_prefix(CARDDAV_ROUTE_PREFIX)?;
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => Some(CardDavPath::Root),
        [root] if *root == ADDRESSBOOKS_ROUTE_COMPONENT => Some(CardDavPath::Root),
        [root, owner] if *root == ADDRESSBOOKS_ROUTE_COMPONENT => {
            Some(CardDavPath::AddressbookHome {
                owner: (*owner).to_string(),
            })
        }
        [root, owner, uri] if *root == ADDRESSBOOKS_ROUTE_COMPONENT => {
            Some(CardDavPath::Addressbook {
                owner: (*owner).to_string(),
                uri: (*uri).to_string(),
            })
        }
        [root, owner, uri, card] if *root == ADDRESSBOOKS_ROUTE_COMPONENT => {
            Some(CardDavPath::Card {
                owner: (*owner).to_string(),
                addressbook_uri: (*uri).to_string(),
                card_uri: (*card).to_string(),
            })
        }
        _ => None,
    }
}

/// ## Summary
/// Middleware that parses the request path into a [`CardDavPath`] and
/// stores it in the depot. Unparseable paths are rejected with 404 before
/// any handler runs.
pub struct CardDavPathMiddleware;

#[salvo::async_trait]
impl salvo::Handler for CardDavPathMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(path = %req.uri().path()))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        match parse_carddav_path(req.uri().path()) {
            Some(path) => {
                depot.insert(CARDDAV_PATH_DEPOT_KEY, path);
            }
            None => {
                tracing::debug!("Path outside the CardDAV layout");
                res.status_code(salvo::http::StatusCode::NOT_FOUND);
                ctrl.skip_rest();
            }
        }
    }
}

/// ## Summary
/// Retrieves the parsed path from the depot; `None` if the path middleware
/// did not run.
#[must_use]
pub fn get_carddav_path_from_depot(depot: &Depot) -> Option<&CardDavPath> {
    depot.get::<CardDavPath>(CARDDAV_PATH_DEPOT_KEY).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn parse_root() {
        assert_eq!(parse_carddav_path("/carddav"), Some(CardDavPath::Root));
        assert_eq!(parse_carddav_path("/carddav/"), Some(CardDavPath::Root));
        assert_eq!(
            parse_carddav_path("/carddav/addressbooks"),
            Some(CardDavPath::Root)
        );
    }

    #[test_log::test]
    fn parse_home() {
        assert_eq!(
            parse_carddav_path("/carddav/addressbooks/alice/"),
            Some(CardDavPath::AddressbookHome {
                owner: "alice".to_string()
            })
        );
    }

    #[test_log::test]
    fn parse_addressbook() {
        assert_eq!(
            parse_carddav_path("/carddav/addressbooks/alice/work/"),
            Some(CardDavPath::Addressbook {
                owner: "alice".to_string(),
                uri: "work".to_string()
            })
        );
    }

    #[test_log::test]
    fn parse_card() {
        assert_eq!(
            parse_carddav_path("/carddav/addressbooks/alice/work/abc.vcf"),
            Some(CardDavPath::Card {
                owner: "alice".to_string(),
                addressbook_uri: "work".to_string(),
                card_uri: "abc.vcf".to_string()
            })
        );
    }

    #[test_log::test]
    fn parse_rejects_deep_paths() {
        assert!(parse_carddav_path("/carddav/addressbooks/a/b/c/d").is_none());
        assert!(parse_carddav_path("/calendars/alice").is_none());
    }
}
