use super::*;

fn opt(id: &str, kind: PermissionOptionKind) -> PermissionOption {
    PermissionOption {
        id: id.to_string(),
        kind,
    }
}

#[test]
fn auto_approve_prefers_allow_always() {
    let req = PermissionRequest {
        tool_call: "edit_file".to_string(),
        options: vec![
            opt("once", PermissionOptionKind::AllowOnce),
            opt("always", PermissionOptionKind::AllowAlways),
        ],
    };
    assert_eq!(
        auto_approve(&req),
        PermissionResponse::Selected("always".to_string())
    );
}

#[test]
fn auto_approve_falls_back_to_allow_once() {
    let req = PermissionRequest {
        tool_call: "edit_file".to_string(),
        options: vec![
            opt("reject", PermissionOptionKind::RejectOnce),
            opt("once", PermissionOptionKind::AllowOnce),
        ],
    };
    assert_eq!(
        auto_approve(&req),
        PermissionResponse::Selected("once".to_string())
    );
}

#[test]
fn auto_approve_falls_back_to_first_option_absent_any_allow() {
    let req = PermissionRequest {
        tool_call: "edit_file".to_string(),
        options: vec![opt("reject", PermissionOptionKind::RejectOnce)],
    };
    assert_eq!(
        auto_approve(&req),
        PermissionResponse::Selected("reject".to_string())
    );
}

#[test]
fn auto_approve_cancels_with_no_options() {
    let req = PermissionRequest {
        tool_call: "edit_file".to_string(),
        options: vec![],
    };
    assert_eq!(auto_approve(&req), PermissionResponse::Cancelled);
}

#[test]
fn registry_returns_unknown_agent_error() {
    let registry = AgentClientRegistry::new();
    let err = registry.get("nonexistent").unwrap_err();
    assert!(matches!(err, AgentClientError::UnknownAgent(name) if name == "nonexistent"));
}
