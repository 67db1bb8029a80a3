//! Diesel schema for the contacts tables.
//!
//! Matches `migrations/2025-06-01-000000_create_contacts/up.sql`.

diesel::table! {
    addressbooks (id) {
        id -> Int8,
        userid -> Varchar,
        displayname -> Varchar,
        uri -> Varchar,
        description -> Nullable<Varchar>,
        ctag -> Int8,
    }
}

diesel::table! {
    cards (id) {
        id -> Int8,
        addressbookid -> Int8,
        fullname -> Varchar,
        carddata -> Text,
        uri -> Varchar,
        lastmodified -> Timestamptz,
    }
}

diesel::table! {
    card_changes (id) {
        id -> Int8,
        addressbookid -> Int8,
        uri -> Varchar,
        ctag -> Int8,
        operation -> Varchar,
    }
}

diesel::joinable!(cards -> addressbooks (addressbookid));
diesel::joinable!(card_changes -> addressbooks (addressbookid));

diesel::allow_tables_to_appear_in_same_query!(addressbooks, cards, card_changes);
