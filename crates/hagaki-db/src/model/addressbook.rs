use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A `CardDAV` addressbook collection.
///
/// `ctag` is the change tag: a monotonically increasing counter bumped on
/// every contained-card mutation, letting sync clients detect a changed
/// collection in O(1) instead of enumerating cards.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::addressbooks)]
#[diesel(check_for_backend(Pg))]
pub struct Addressbook {
    pub id: i64,
    pub userid: String,
    pub displayname: String,
    pub uri: String,
    pub description: Option<String>,
    pub ctag: i64,
}

/// Insert struct for creating new addressbooks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::addressbooks)]
pub struct NewAddressbook<'a> {
    pub userid: &'a str,
    pub displayname: &'a str,
    pub uri: &'a str,
    pub description: Option<&'a str>,
}

/// Partial update for an addressbook; `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::addressbooks)]
pub struct AddressbookUpdate<'a> {
    pub displayname: Option<&'a str>,
    pub description: Option<&'a str>,
}
