//! Email and domain normalization for allow-lists.

/// Trim and lower-case an email address.
///
/// Returns `None` unless the result has exactly one `@` with a non-empty
/// local part and a dotted domain.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.contains('@') || !is_valid_domain(domain) {
        return None;
    }
    Some(email)
}

/// Trim, strip a leading `@`, and lower-case a domain.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let domain = raw.trim().trim_start_matches('@').to_lowercase();
    is_valid_domain(&domain).then_some(domain)
}

/// The substring after `@` of an already-normalized email.
pub fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Alice@Acme.COM "),
            Some("alice@acme.com".to_string())
        );
        assert_eq!(normalize_email("alice"), None);
        assert_eq!(normalize_email("@acme.com"), None);
        assert_eq!(normalize_email("a@b@acme.com"), None);
        assert_eq!(normalize_email("alice@localhost"), None);
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("@Acme.com"), Some("acme.com".to_string()));
        assert_eq!(normalize_domain("sub.acme.com"), Some("sub.acme.com".to_string()));
        assert_eq!(normalize_domain(""), None);
        assert_eq!(normalize_domain("acme..com"), None);
        assert_eq!(normalize_domain("ac me.com"), None);
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("bob@acme.com"), Some("acme.com"));
        assert_eq!(email_domain("bob"), None);
    }
}
