use super::*;

#[test]
fn cancel_on_unregistered_session_is_a_no_op() {
    let registry = CancelRegistry::new();
    assert!(!registry.cancel(&SessionId::new("missing")));
}

#[test]
fn registered_token_observes_cancel() {
    let registry = CancelRegistry::new();
    let id = SessionId::new("s1");
    let token = registry.register(&id);
    assert!(!token.is_cancelled());
    assert!(registry.cancel(&id));
    assert!(token.is_cancelled());
}

#[test]
fn unregister_makes_cancel_return_false() {
    let registry = CancelRegistry::new();
    let id = SessionId::new("s1");
    registry.register(&id);
    registry.unregister(&id);
    assert!(!registry.cancel(&id));
}

#[test]
fn registering_again_replaces_the_stale_token() {
    let registry = CancelRegistry::new();
    let id = SessionId::new("s1");
    let first = registry.register(&id);
    let second = registry.register(&id);
    assert!(registry.cancel(&id));
    assert!(!first.is_cancelled());
    assert!(second.is_cancelled());
}
