//! Addressbook URI generation.
//!
//! ## Summary
//! Generates stable, URL-safe collection URIs from display names. URIs are
//! lowercase, alphanumeric with hyphens, and don't change even if the
//! display name changes later.

/// Generate a URL-safe base URI from a display name.
///
/// Converts to lowercase, replaces spaces and special characters with hyphens,
/// collapses multiple hyphens, and trims edge hyphens.
///
/// Examples:
/// - "Work" -> "work"
/// - "John Doe's Contacts" -> "john-doe-s-contacts"
/// - "Email & Tasks" -> "email-tasks"
#[must_use]
pub fn base_uri(name: &str) -> String {
    let uri = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if uri.is_empty() {
        "addressbook".to_string()
    } else {
        uri
    }
}

/// ## Summary
/// Makes a base URI unique among a set of taken URIs by appending an
/// incrementing numeric suffix: `work`, `work1`, `work2`, ...
///
/// `is_taken` is called once per candidate, so the probe terminates after at
/// most `taken + 1` iterations.
pub fn unique_uri<F>(base: &str, mut is_taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    if !is_taken(base) {
        return base.to_string();
    }

    let mut suffix: u32 = 1;
    loop {
        let candidate = format!("{base}{suffix}");
        if !is_taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_simple_name() {
        assert_eq!(base_uri("Work"), "work");
    }

    #[test]
    fn test_with_spaces() {
        assert_eq!(base_uri("My Contacts"), "my-contacts");
    }

    #[test]
    fn test_with_special_chars() {
        assert_eq!(base_uri("John's Friends"), "john-s-friends");
    }

    #[test]
    fn test_empty_name_falls_back() {
        assert_eq!(base_uri("!!!"), "addressbook");
    }

    #[test]
    fn test_unique_uri_no_collision() {
        let taken: HashSet<&str> = HashSet::new();
        assert_eq!(unique_uri("work", |u| taken.contains(u)), "work");
    }

    #[test]
    fn test_unique_uri_suffixes() {
        let taken: HashSet<&str> = ["work"].into_iter().collect();
        assert_eq!(unique_uri("work", |u| taken.contains(u)), "work1");

        let taken: HashSet<&str> = ["work", "work1"].into_iter().collect();
        assert_eq!(unique_uri("work", |u| taken.contains(u)), "work2");
    }
}
