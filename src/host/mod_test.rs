use super::*;

// =============================================================
// is_loading_state
// =============================================================

#[test]
fn only_parsing_state_counts_as_loading() {
    assert!(is_loading_state("loading"));
    assert!(!is_loading_state("interactive"));
    assert!(!is_loading_state("complete"));
}

#[test]
fn unknown_ready_state_is_not_loading() {
    assert!(!is_loading_state(""));
    assert!(!is_loading_state("Loading"));
}

// =============================================================
// ClickVerdict
// =============================================================

#[test]
fn only_pass_through_keeps_default() {
    assert!(!ClickVerdict::PassThrough(PassReason::Modifier).prevents_default());
    assert!(ClickVerdict::AlreadyNavigating.prevents_default());
    assert!(ClickVerdict::Intercepted { href: "/p/".to_owned() }.prevents_default());
}
