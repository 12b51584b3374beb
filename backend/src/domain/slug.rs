//! Slug derivation and validation.
//!
//! Slugs are trimmed, non-empty strings of lowercase ASCII letters, digits,
//! and hyphens. They are display aids, not identifiers, so two companies may
//! share one.

/// Derive a slug from a display name.
///
/// The name is lowercased, each run of whitespace becomes one hyphen, then
/// anything outside `[a-z0-9-]` is dropped. The result may be empty when the
/// name has no usable characters.
///
/// # Examples
/// ```
/// use tenantry::domain::slugify;
///
/// assert_eq!(slugify("Acme Corp"), "acme-corp");
/// assert_eq!(slugify("Ünïcode  & Co."), "ncode--co");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if is_slug_char(ch) {
            slug.push(ch);
        }
    }
    slug
}

/// Return `true` when `value` is a valid slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty() && value.trim() == value && value.chars().all(is_slug_char)
}

fn is_slug_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Acme", "acme")]
    #[case("Acme Corp", "acme-corp")]
    #[case("Acme   Corp", "acme-corp")]
    #[case("Acme\t\nCorp", "acme-corp")]
    #[case("Acme & Sons, Ltd.", "acme--sons-ltd")]
    #[case("R2-D2 Robotics", "r2-d2-robotics")]
    #[case("Café", "caf")]
    #[case("!!!", "")]
    fn derives_slugs(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(slugify(name), expected);
    }

    #[rstest]
    #[case("Acme Corp")]
    #[case("x  y")]
    fn derivation_is_deterministic(#[case] name: &str) {
        assert_eq!(slugify(name), slugify(name));
    }

    #[rstest]
    #[case("acme", true)]
    #[case("acme-corp-2", true)]
    #[case("", false)]
    #[case("Acme", false)]
    #[case("acme corp", false)]
    fn validates_slugs(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_valid_slug(value), expected);
    }
}
