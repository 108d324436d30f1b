//! CLI output formatting tests.
//!
//! These tests verify that poll states render correctly for both text and
//! JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use chrono::{Local, TimeZone};
    use claimwatch_core::{ClaimError, ClaimLinks, ClaimRecord, ClaimStatus, PollOutcome, PollState};
    use claimwatch_store::Config;

    fn formatter() -> TextFormatter {
        TextFormatter::new(false, ClaimLinks::new("https://consumer.test").unwrap())
    }

    fn at() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 15).unwrap()
    }

    #[test]
    fn test_loading_shows_one_based_attempt() {
        let line = formatter().format_state(&PollState::Loading { attempt: 0 }, 10, at());
        assert_eq!(line, "[09:30:15] Checking for reward (attempt 1/10)");
    }

    #[test]
    fn test_found_shows_amount_and_status() {
        let record = ClaimRecord::new("abc", ClaimStatus::NotClaim, 550);
        let line = formatter().format_state(&PollState::Found(record), 10, at());
        assert_eq!(line, "[09:30:15] Reward found: 5.5 miles (not claimed)");
    }

    #[test]
    fn test_exhausted_and_cancelled() {
        let f = formatter();
        assert!(f
            .format_state(&PollState::Exhausted { attempts: 3 }, 3, at())
            .ends_with("No reward yet after 3 attempts"));
        assert!(f.format_state(&PollState::Cancelled, 3, at()).ends_with("Cancelled"));
    }

    #[test]
    fn test_failure_is_tagged() {
        let f = formatter();
        let network = f.format_state(
            &PollState::Failed(ClaimError::Transport("refused".into())),
            3,
            at(),
        );
        assert!(network.contains("Lookup failed: Transport error: refused (network)"));

        let service = f.format_outcome(&PollOutcome::Failed(ClaimError::Status {
            status: 500,
            body: String::new(),
        }));
        assert!(service.ends_with("(service)"));
    }

    #[test]
    fn test_link_for_unclaimed_record() {
        let record = ClaimRecord::new("tok-1", ClaimStatus::NotClaim, 500);
        assert_eq!(
            formatter().format_link(&record),
            "Click here to claim your divit miles: https://consumer.test/miles/claim/tok-1"
        );
    }

    #[test]
    fn test_found_outcome_includes_link() {
        let record = ClaimRecord::new("tok-1", ClaimStatus::Claimed, 500);
        let summary = formatter().format_outcome(&PollOutcome::Found(record));
        assert_eq!(
            summary,
            "5 miles (claimed)\nClick here to view your divit miles: https://consumer.test/profile/miles"
        );
    }

    #[test]
    fn test_colors_applied() {
        let f = TextFormatter::new(true, ClaimLinks::default());
        let line = f.format_state(&PollState::Cancelled, 1, at());
        assert!(line.contains("\x1b["));
    }

    #[test]
    fn test_config_listing() {
        let listing = formatter().format_config(&Config::default());
        assert!(listing.starts_with("ClaimWatch Configuration"));
        assert!(listing.contains("Max attempts:  10"));
        assert!(listing.contains("Shop header:   x-shop-domain"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use chrono::{TimeZone, Utc};
    use claimwatch_core::{ClaimError, ClaimLinks, ClaimRecord, ClaimStatus, PollOutcome, PollState};
    use serde_json::Value;

    fn formatter() -> JsonFormatter {
        JsonFormatter::with_links(false, ClaimLinks::new("https://consumer.test").unwrap())
    }

    fn parse(output: &str) -> Value {
        serde_json::from_str(output).unwrap()
    }

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let output = formatter.format(&serde_json::json!({"key": "value"})).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let output = formatter()
            .format_state(&PollState::Loading { attempt: 2 }, Utc::now())
            .unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_loading_state() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 15).unwrap();
        let value = parse(
            &formatter()
                .format_state(&PollState::Loading { attempt: 2 }, at)
                .unwrap(),
        );
        assert_eq!(value["state"], "loading");
        assert_eq!(value["attempt"], 2);
        assert_eq!(value["at"], "2024-05-01T09:30:15+00:00");
        assert!(value.get("record").is_none());
    }

    #[test]
    fn test_found_state_carries_link() {
        let record = ClaimRecord::new("abc", ClaimStatus::NotClaim, 505);
        let value = parse(
            &formatter()
                .format_state(&PollState::Found(record), Utc::now())
                .unwrap(),
        );
        assert_eq!(value["state"], "found");
        assert_eq!(value["record"]["claimedStatus"], "notClaim");
        assert_eq!(value["record"]["amountMinor"], 505);
        assert_eq!(value["record"]["amount"], "5.05");
        assert_eq!(value["record"]["url"], "https://consumer.test/miles/claim/abc");
        assert_eq!(value["record"]["callToAction"], "Click here to claim your divit miles");
    }

    #[test]
    fn test_failed_outcome_has_error_kind() {
        let outcome = PollOutcome::Failed(ClaimError::Status {
            status: 503,
            body: "down".into(),
        });
        let value = parse(&formatter().format_outcome(&outcome, Utc::now()).unwrap());
        assert_eq!(value["state"], "failed");
        assert_eq!(value["error"]["kind"], "status");
        assert_eq!(value["error"]["status"], 503);
    }

    #[test]
    fn test_exhausted_outcome() {
        let value = parse(
            &formatter()
                .format_outcome(&PollOutcome::Exhausted { attempts: 4 }, Utc::now())
                .unwrap(),
        );
        assert_eq!(value["state"], "exhausted");
        assert_eq!(value["attempts"], 4);
    }

    #[test]
    fn test_record_alone() {
        let record = ClaimRecord::new("abc", ClaimStatus::Claimed, 100);
        let value = parse(&formatter().format_record(&record).unwrap());
        assert_eq!(value["url"], "https://consumer.test/profile/miles");
        assert_eq!(value["amount"], "1");
    }
}
