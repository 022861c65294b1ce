//! Username derivation for staff-created accounts.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{DEFAULT_USERNAME_BASE, MAX_USERNAME_CANDIDATES, MAX_USERNAME_LENGTH};

static STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("valid slug regex"));

static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid slug regex"));

/// Lowercase ASCII slug: unsupported characters dropped, runs of spaces and
/// dashes collapsed to one dash, leading/trailing dashes and underscores trimmed.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let stripped = STRIP.replace_all(&lowered, "");
    let dashed = DASHES.replace_all(stripped.trim(), "-");
    dashed.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Base username from the local part of an email address.
pub fn username_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let slug = slugify(local);
    let slug = if slug.is_empty() {
        DEFAULT_USERNAME_BASE.to_string()
    } else {
        slug
    };
    // Leave room for a numeric suffix.
    slug.chars().take(MAX_USERNAME_LENGTH as usize - 10).collect()
}

/// `base`, then `base2`, `base3`, ... up to [`MAX_USERNAME_CANDIDATES`] names.
pub fn username_candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string())
        .chain((2..=MAX_USERNAME_CANDIDATES).map(move |n| format!("{}{}", base, n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_drops_punctuation() {
        assert_eq!(slugify("Budi.Santoso"), "budisantoso");
        assert_eq!(slugify("  siti  nur "), "siti-nur");
        assert_eq!(slugify("__a--b__"), "a-b");
        assert_eq!(slugify("ÄÖ"), "");
    }

    #[test]
    fn username_base_uses_local_part() {
        assert_eq!(username_base("Budi.Santoso@example.com"), "budisantoso");
        assert_eq!(username_base("ahmad_r@example.com"), "ahmad_r");
        assert_eq!(username_base("...@example.com"), "user");
    }

    #[test]
    fn candidates_start_at_two() {
        let names: Vec<_> = username_candidates("budi").take(3).collect();
        assert_eq!(names, ["budi", "budi2", "budi3"]);
    }

    #[test]
    fn candidates_are_bounded() {
        let names: Vec<_> = username_candidates("budi").collect();
        assert_eq!(names.len(), MAX_USERNAME_CANDIDATES as usize);
        assert_eq!(names.last().map(String::as_str), Some("budi1000"));
    }

    #[test]
    fn long_bases_are_truncated() {
        let email = format!("{}@example.com", "a".repeat(300));
        assert_eq!(username_base(&email).len(), MAX_USERNAME_LENGTH as usize - 10);
    }
}
