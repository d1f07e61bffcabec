use super::*;

#[test]
fn latest_ticket_is_accepted() {
    let mut slot = PreviewSlot::new();
    let ticket = slot.issue();
    assert!(slot.complete(ticket, "bench"));
    assert_eq!(slot.current(), Some(&"bench"));
}

#[test]
fn superseded_ticket_is_discarded() {
    let mut slot = PreviewSlot::new();
    let first = slot.issue();
    let second = slot.issue();
    assert!(!slot.complete(first, "old"));
    assert!(slot.current().is_none());
    assert!(slot.complete(second, "new"));
    assert_eq!(slot.current(), Some(&"new"));
}

#[test]
fn issue_clears_previous_result() {
    let mut slot = PreviewSlot::new();
    let ticket = slot.issue();
    slot.complete(ticket, 1);
    slot.issue();
    assert!(slot.current().is_none());
}

#[test]
fn cancel_invalidates_outstanding_ticket() {
    let mut slot = PreviewSlot::new();
    let ticket = slot.issue();
    slot.cancel();
    assert!(!slot.is_latest(ticket));
    assert!(!slot.complete(ticket, 1));
}
