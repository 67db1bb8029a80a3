//! Centralized ownership checks.
//!
//! Every mutating service entry point passes through [`require_owner`]; the
//! query layer itself never authorizes. Handlers therefore cannot forget an
//! ownership check without also skipping the service layer.

use hagaki_db::model::addressbook::Addressbook;

use super::Principal;
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Requires that the principal owns the addressbook.
///
/// ## Errors
/// Returns `Forbidden` on ownership mismatch.
pub fn require_owner(principal: &Principal, addressbook: &Addressbook) -> ServiceResult<()> {
    if addressbook.userid == principal.name {
        Ok(())
    } else {
        tracing::warn!(
            owner = %addressbook.userid,
            caller = %principal.name,
            addressbook_id = addressbook.id,
            "Ownership check failed"
        );
        Err(ServiceError::Forbidden(format!(
            "addressbook {} is not owned by {}",
            addressbook.id, principal.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addressbook(owner: &str) -> Addressbook {
        Addressbook {
            id: 1,
            userid: owner.to_string(),
            displayname: "Work".to_string(),
            uri: "work".to_string(),
            description: None,
            ctag: 1,
        }
    }

    #[test]
    fn owner_passes() {
        let principal = Principal::new("alice");
        assert!(require_owner(&principal, &addressbook("alice")).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let principal = Principal::new("mallory");
        let err = require_owner(&principal, &addressbook("alice")).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
