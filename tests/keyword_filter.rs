// tests/keyword_filter.rs
use jobwatch::{matches, KeywordFilter};

#[test]
fn substring_match_any_keyword() {
    assert!(matches("Senior Network Engineer", &["network"]));
    assert!(matches("Finance OFFICER", &["Manager", "officer"]));
    assert!(!matches("Cashier", &["network", "officer"]));
}

#[test]
fn filter_and_free_function_agree() {
    let keywords = vec!["Manager".to_string(), "Officer".to_string()];
    let filter = KeywordFilter::new(&keywords);
    for title in ["Project Manager", "Loans officer", "Cashier", "Driver", "MANAGERIAL ROLE"] {
        assert_eq!(filter.matches(title), matches(title, &keywords), "{title}");
    }
}
