//! Account redaction.

/// Placeholder written in place of the account identifier.
pub const REDACTED_ACCOUNT: &str = "nobody@no.name";

/// Replaces every literal occurrence of `account` with [`REDACTED_ACCOUNT`].
///
/// An empty `account` leaves the content untouched.
///
/// # Example
///
/// ```
/// use czds_report::scrub;
///
/// let report = scrub("Email,TLD\nme@example.com,com\n", "me@example.com");
/// assert_eq!(report, "Email,TLD\nnobody@no.name,com\n");
/// ```
#[must_use]
pub fn scrub(content: &str, account: &str) -> String {
    if account.is_empty() {
        return content.to_string();
    }
    content.replace(account, REDACTED_ACCOUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_occurrence_is_replaced() {
        let account = "analyst@example.org";
        let content = format!(
            "Email,TLD,Status,Reviewer\n{account},com,approved,{account}\n{account},net,pending,\n"
        );

        let scrubbed = scrub(&content, account);

        assert_eq!(scrubbed.matches(account).count(), 0);
        assert_eq!(scrubbed.matches(REDACTED_ACCOUNT).count(), 3);
    }

    #[test]
    fn test_empty_account_is_ignored() {
        assert_eq!(scrub("a,b\n1,2", ""), "a,b\n1,2");
    }

    #[test]
    fn test_absent_account_is_noop() {
        assert_eq!(scrub("a,b\n1,2", "x@y.z"), "a,b\n1,2");
    }
}
