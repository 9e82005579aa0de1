//! Verify pattern matching engine
//!
//! For any output and check, literal patterns match as substrings, regex
//! patterns match per line, and present/absent expectations are evaluated
//! correctly.

use fixture_test::manifest::{CheckExpectation, OutputCheck};
use fixture_test::verify::{evaluate_check, pattern_matches};
use proptest::prelude::*;

fn arb_lines() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-zA-Z0-9 _]{0,40}", 1..20)
}

fn check(pattern: &str, expect: CheckExpectation) -> OutputCheck {
    OutputCheck {
        pattern: pattern.to_string(),
        label: "test".to_string(),
        regex: false,
        expect,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn literal_match_iff_substring_present(lines in arb_lines(), needle in "[a-zA-Z]{1,5}") {
        let content = lines.join("\n");
        let result = pattern_matches(&content, &needle, false).unwrap();
        prop_assert_eq!(result, lines.iter().any(|l| l.contains(&needle)));
    }

    #[test]
    fn regex_match_iff_some_line_matches(lines in arb_lines(), needle in "[a-zA-Z]{1,4}") {
        let content = lines.join("\n");
        let pattern = format!("^{needle}");
        let result = pattern_matches(&content, &pattern, true).unwrap();
        prop_assert_eq!(result, lines.iter().any(|l| l.starts_with(&needle)));
    }

    #[test]
    fn present_and_absent_are_complementary(lines in arb_lines(), needle in "[a-zA-Z]{1,5}") {
        let content = lines.join("\n");
        let present = evaluate_check(&check(&needle, CheckExpectation::Present), &content).unwrap();
        let absent = evaluate_check(&check(&needle, CheckExpectation::Absent), &content).unwrap();
        prop_assert_ne!(present.passed(), absent.passed());
        prop_assert_eq!(present.passed(), lines.iter().any(|l| l.contains(&needle)));
    }
}
