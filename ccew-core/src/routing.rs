//! Routing resolver — decides which mailboxes receive the certificate.
//!
//! Total function, never fails. Only Ausgrid currently operates its own
//! certificate mailbox; every other recognised provider is reached through
//! the shared network-services address. Optional stakeholder emails are
//! copied in only when they look like deliverable addresses — malformed
//! values are dropped, not errored, since they are not required fields.

use crate::types::{RecipientSet, SubmissionRecord};

/// Ausgrid's dedicated CCEW intake mailbox.
pub const AUSGRID_MAILBOX: &str = "ccew@ausgrid.com.au";

/// Shared intake mailbox covering all other network operators.
pub const SHARED_MAILBOX: &str = "certificates@energyconnections.net.au";

/// Minimal deliverability check: exactly one `@`, non-empty local part,
/// and a dotted non-empty domain.
fn plausible_email(addr: &str) -> bool {
    let mut parts = addr.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

/// Resolve primary and secondary recipients for a submission.
pub fn resolve_recipients(submission: &SubmissionRecord) -> RecipientSet {
    let primary = if submission.energy_provider.trim().eq_ignore_ascii_case("ausgrid") {
        AUSGRID_MAILBOX
    } else {
        SHARED_MAILBOX
    };

    let secondary = [&submission.meter_provider_email, &submission.owner_email]
        .into_iter()
        .flatten()
        .map(|addr| addr.trim())
        .filter(|addr| plausible_email(addr))
        .map(str::to_string)
        .collect();

    RecipientSet {
        primary: primary.to_string(),
        secondary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(provider: &str) -> SubmissionRecord {
        SubmissionRecord {
            energy_provider: provider.to_string(),
            ..SubmissionRecord::default()
        }
    }

    #[test]
    fn ausgrid_routes_to_its_own_mailbox() {
        let recipients = resolve_recipients(&submission("Ausgrid"));
        assert_eq!(recipients.primary, AUSGRID_MAILBOX);
    }

    #[test]
    fn ausgrid_match_is_case_insensitive() {
        let recipients = resolve_recipients(&submission("ausgrid"));
        assert_eq!(recipients.primary, AUSGRID_MAILBOX);
    }

    #[test]
    fn other_providers_route_to_the_shared_mailbox() {
        for provider in ["Endeavour Energy", "Essential Energy", "Evoenergy"] {
            let recipients = resolve_recipients(&submission(provider));
            assert_eq!(recipients.primary, SHARED_MAILBOX, "provider {provider}");
        }
    }

    #[test]
    fn valid_stakeholder_emails_are_copied_in() {
        let mut sub = submission("Ausgrid");
        sub.meter_provider_email = Some("metering@plusgrid.com.au".to_string());
        sub.owner_email = Some("owner@example.com".to_string());

        let recipients = resolve_recipients(&sub);
        assert_eq!(
            recipients.secondary,
            vec!["metering@plusgrid.com.au", "owner@example.com"]
        );
        assert_eq!(recipients.all().count(), 3);
    }

    #[test]
    fn malformed_stakeholder_emails_are_dropped_without_error() {
        let mut sub = submission("Endeavour Energy");
        sub.meter_provider_email = Some("not-an-address".to_string());
        sub.owner_email = Some("@nolocal.com".to_string());

        let recipients = resolve_recipients(&sub);
        assert!(recipients.secondary.is_empty());
    }

    #[test]
    fn empty_stakeholder_emails_are_ignored() {
        let mut sub = submission("Endeavour Energy");
        sub.owner_email = Some("  ".to_string());

        let recipients = resolve_recipients(&sub);
        assert!(recipients.secondary.is_empty());
    }

    #[test]
    fn dotless_or_dangling_domains_are_rejected() {
        for bad in ["a@b", "a@b.", "a@.b", "a@b@c.com"] {
            assert!(!plausible_email(bad), "{bad} should be rejected");
        }
        assert!(plausible_email("tech@metering.example.com.au"));
    }
}
