use gatepass_api::models::transaction::{PaymentOutcome, TransactionStatus};

#[test]
fn legal_transitions() {
    assert!(TransactionStatus::Pending.can_transition_to(TransactionStatus::Paid));
    assert!(TransactionStatus::Pending.can_transition_to(TransactionStatus::Failed));
    assert!(TransactionStatus::Paid.can_transition_to(TransactionStatus::Used));
}

#[test]
fn used_is_reachable_only_via_paid() {
    assert!(!TransactionStatus::Pending.can_transition_to(TransactionStatus::Used));
    assert!(!TransactionStatus::Failed.can_transition_to(TransactionStatus::Used));
    assert!(TransactionStatus::Paid.can_transition_to(TransactionStatus::Used));
}

#[test]
fn terminal_statuses_have_no_outgoing_transitions() {
    let all = [
        TransactionStatus::Pending,
        TransactionStatus::Paid,
        TransactionStatus::Used,
        TransactionStatus::Failed,
    ];

    for next in all {
        assert!(!TransactionStatus::Used.can_transition_to(next));
        assert!(!TransactionStatus::Failed.can_transition_to(next));
    }

    assert!(TransactionStatus::Used.is_terminal());
    assert!(TransactionStatus::Failed.is_terminal());
    assert!(!TransactionStatus::Pending.is_terminal());
    assert!(!TransactionStatus::Paid.is_terminal());
}

#[test]
fn paid_cannot_fail_or_settle_again() {
    assert!(!TransactionStatus::Paid.can_transition_to(TransactionStatus::Failed));
    assert!(!TransactionStatus::Paid.can_transition_to(TransactionStatus::Paid));
    assert!(!TransactionStatus::Paid.can_transition_to(TransactionStatus::Pending));
}

#[test]
fn gateway_status_mapping() {
    assert_eq!(
        PaymentOutcome::from_gateway_status("settlement"),
        Some(PaymentOutcome::Settled)
    );
    assert_eq!(
        PaymentOutcome::from_gateway_status("success"),
        Some(PaymentOutcome::Settled)
    );
    assert_eq!(
        PaymentOutcome::from_gateway_status("expire"),
        Some(PaymentOutcome::Failed)
    );
    assert_eq!(
        PaymentOutcome::from_gateway_status("cancel"),
        Some(PaymentOutcome::Failed)
    );
    assert_eq!(
        PaymentOutcome::from_gateway_status("deny"),
        Some(PaymentOutcome::Failed)
    );
}

#[test]
fn unknown_gateway_statuses_are_ignored() {
    assert_eq!(PaymentOutcome::from_gateway_status("challenge"), None);
    assert_eq!(PaymentOutcome::from_gateway_status("SETTLEMENT"), None);
    assert_eq!(PaymentOutcome::from_gateway_status(""), None);
}

#[test]
fn status_serializes_to_lowercase_strings() {
    assert_eq!(
        serde_json::to_value(TransactionStatus::Pending).unwrap(),
        serde_json::json!("pending")
    );
    assert_eq!(
        serde_json::to_value(TransactionStatus::Paid).unwrap(),
        serde_json::json!("paid")
    );
    assert_eq!(
        serde_json::to_value(TransactionStatus::Used).unwrap(),
        serde_json::json!("used")
    );
    assert_eq!(
        serde_json::to_value(TransactionStatus::Failed).unwrap(),
        serde_json::json!("failed")
    );
}
