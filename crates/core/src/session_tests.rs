use super::*;
use chrono::TimeZone;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn fresh_session_is_idle_with_no_active_node() {
    let s = Session::new(SessionId::new("s1"), PathBuf::from("/tmp/ws"), now());
    assert_eq!(s.status, SessionStatus::Idle);
    assert!(s.active_node.is_none());
    assert!(s.check_invariants().is_ok());
}

#[test]
fn running_without_active_node_violates_invariant() {
    let mut s = Session::new(SessionId::new("s1"), PathBuf::from("/tmp/ws"), now());
    s.status = SessionStatus::Running;
    assert!(s.check_invariants().is_err());
}

#[test]
fn running_with_active_node_satisfies_invariant() {
    let mut s = Session::new(SessionId::new("s1"), PathBuf::from("/tmp/ws"), now());
    s.status = SessionStatus::Running;
    s.active_node = Some("start".to_string());
    assert!(s.check_invariants().is_ok());
}

#[test]
fn yolo_detection() {
    assert!(ApprovalMode::Yolo.is_yolo());
    assert!(!ApprovalMode::Plan.is_yolo());
}
