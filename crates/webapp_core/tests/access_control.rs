mod support;

use serde_json::json;
use support::{write_archive, Harness};
use webapp_core::db::open_db_in_memory;
use webapp_core::{
    AppExtensionBridge, ApplicationId, ExtensionAccessDelegate, HostEvent, HostProcessId,
    LaunchTarget, RuntimePermission, ServiceError, SessionPermission, StoredPermission,
};

const CONTACTS_TABLE: &str =
    r#"{"permissions":[{"permission_name":"contacts","apis":["find","save"]}]}"#;

fn contacts_manifest(decision: &str) -> serde_json::Value {
    json!({
        "name": "Phonebook",
        "version": "1.0",
        "launch_path": "index.html",
        "permissions": {"contacts": decision},
    })
}

/// Installs, launches and attaches the `contacts` extension.
fn running_with_extension(
    harness: &Harness,
    service: &mut webapp_core::ApplicationService<webapp_core::SqliteApplicationStore<'_>>,
    decision: &str,
) -> (ApplicationId, HostProcessId) {
    let (archive, id) = write_archive(&harness.inputs(), "phonebook", contacts_manifest(decision));
    service.install(&archive).unwrap();
    let pid = service
        .launch(LaunchTarget::Id(id.clone()))
        .and_then(|app| app.host_process_id())
        .unwrap();
    service.handle_host_event(HostEvent::ExtensionLoaded {
        host_process_id: pid,
        extension_name: "contacts".to_string(),
    });
    (id, pid)
}

#[test]
fn persistent_decisions_resolve_to_forever() {
    for (decision, expected) in [
        ("ALLOW", RuntimePermission::AllowForever),
        ("DENY", RuntimePermission::DenyForever),
        ("PROMPT", RuntimePermission::InvalidRuntimePerm),
    ] {
        let harness = Harness::new();
        let conn = open_db_in_memory().unwrap();
        let mut service = harness.service(&conn);
        let (id, _) = running_with_extension(&harness, &mut service, decision);
        assert!(service.register_permissions(&id, "contacts", CONTACTS_TABLE));

        let mut reply = service.check_api_access_control(&id, "contacts", "find");
        assert_eq!(reply.try_take(), Some(expected), "decision {decision}");
    }
}

#[test]
fn session_decision_overrides_persistent() {
    let harness = Harness::new();
    let conn = open_db_in_memory().unwrap();
    let mut service = harness.service(&conn);
    let (id, _) = running_with_extension(&harness, &mut service, "DENY");
    assert!(service.register_permissions(&id, "contacts", CONTACTS_TABLE));

    assert!(service.set_session_permission(&id, "contacts", SessionPermission::Allow));
    assert_eq!(
        service
            .check_api_access_control(&id, "contacts", "save")
            .blocking_wait(),
        RuntimePermission::AllowSession
    );

    assert!(service.set_session_permission(&id, "contacts", SessionPermission::Deny));
    assert_eq!(
        service
            .check_api_access_control(&id, "contacts", "save")
            .blocking_wait(),
        RuntimePermission::DenySession
    );
}

#[test]
fn unattached_extension_is_invalid_even_if_api_name_matches() {
    let harness = Harness::new();
    let conn = open_db_in_memory().unwrap();
    let mut service = harness.service(&conn);
    let (id, _) = running_with_extension(&harness, &mut service, "ALLOW");
    assert!(service.register_permissions(&id, "contacts", CONTACTS_TABLE));

    assert!(!service.register_permissions(&id, "calendar", CONTACTS_TABLE));
    assert_eq!(
        service
            .check_api_access_control(&id, "calendar", "find")
            .try_take(),
        Some(RuntimePermission::InvalidRuntimePerm)
    );
}

#[test]
fn unregistered_api_and_unknown_application_are_invalid() {
    let harness = Harness::new();
    let conn = open_db_in_memory().unwrap();
    let mut service = harness.service(&conn);
    let (id, _) = running_with_extension(&harness, &mut service, "ALLOW");

    assert_eq!(
        service
            .check_api_access_control(&id, "contacts", "find")
            .try_take(),
        Some(RuntimePermission::InvalidRuntimePerm)
    );

    assert!(service.register_permissions(&id, "contacts", CONTACTS_TABLE));
    assert_eq!(
        service
            .check_api_access_control(&id, "contacts", "delete")
            .try_take(),
        Some(RuntimePermission::InvalidRuntimePerm)
    );

    let stranger = ApplicationId::generate("stranger");
    assert_eq!(
        service
            .check_api_access_control(&stranger, "contacts", "find")
            .try_take(),
        Some(RuntimePermission::InvalidRuntimePerm)
    );
    assert!(!service.register_permissions(&stranger, "contacts", CONTACTS_TABLE));
}

#[test]
fn malformed_table_is_rejected_and_keeps_previous() {
    let harness = Harness::new();
    let conn = open_db_in_memory().unwrap();
    let mut service = harness.service(&conn);
    let (id, _) = running_with_extension(&harness, &mut service, "ALLOW");
    assert!(service.register_permissions(&id, "contacts", CONTACTS_TABLE));

    assert!(!service.register_permissions(&id, "contacts", "{not json"));
    assert_eq!(
        service
            .check_api_access_control(&id, "contacts", "find")
            .try_take(),
        Some(RuntimePermission::AllowForever)
    );
}

#[test]
fn reregistration_replaces_table() {
    let harness = Harness::new();
    let conn = open_db_in_memory().unwrap();
    let mut service = harness.service(&conn);
    let (id, _) = running_with_extension(&harness, &mut service, "ALLOW");
    assert!(service.register_permissions(&id, "contacts", CONTACTS_TABLE));

    let narrowed = r#"{"permissions":[{"permission_name":"contacts","apis":["save"]}]}"#;
    assert!(service.register_permissions(&id, "contacts", narrowed));

    assert_eq!(
        service
            .check_api_access_control(&id, "contacts", "find")
            .try_take(),
        Some(RuntimePermission::InvalidRuntimePerm)
    );
}

#[test]
fn persistent_update_reaches_store_and_running_instance() {
    let harness = Harness::new();
    let conn = open_db_in_memory().unwrap();
    let mut service = harness.service(&conn);
    let (id, _) = running_with_extension(&harness, &mut service, "PROMPT");
    assert!(service.register_permissions(&id, "contacts", CONTACTS_TABLE));

    service
        .set_persistent_permission(&id, "contacts", StoredPermission::Allow)
        .unwrap();

    assert_eq!(
        service
            .check_api_access_control(&id, "contacts", "find")
            .try_take(),
        Some(RuntimePermission::AllowForever)
    );
    let stored = service.application(&id).unwrap().unwrap();
    assert_eq!(
        stored.persistent_permission("contacts"),
        Some(StoredPermission::Allow)
    );

    let stranger = ApplicationId::generate("stranger");
    assert_eq!(
        service
            .set_persistent_permission(&stranger, "contacts", StoredPermission::Deny)
            .unwrap_err(),
        ServiceError::NotInstalled(stranger)
    );
}

#[test]
fn persistent_update_of_undeclared_permission_is_rejected() {
    let harness = Harness::new();
    let conn = open_db_in_memory().unwrap();
    let mut service = harness.service(&conn);
    let (id, _) = running_with_extension(&harness, &mut service, "ALLOW");
    let table = r#"{"permissions":[{"permission_name":"undeclared","apis":["find"]}]}"#;
    assert!(service.register_permissions(&id, "contacts", table));

    let err = service
        .set_persistent_permission(&id, "undeclared", StoredPermission::Allow)
        .unwrap_err();

    assert!(matches!(err, ServiceError::PermissionDataInvalid(_)));
    assert_eq!(
        service
            .check_api_access_control(&id, "contacts", "find")
            .try_take(),
        Some(RuntimePermission::InvalidRuntimePerm)
    );
    let stored = service.application(&id).unwrap().unwrap();
    assert_eq!(stored.persistent_permission("undeclared"), None);
    assert_eq!(
        stored.persistent_permission("contacts"),
        Some(StoredPermission::Allow)
    );
}

#[test]
fn session_permissions_end_with_the_session() {
    let harness = Harness::new();
    let conn = open_db_in_memory().unwrap();
    let mut service = harness.service(&conn);
    let (id, pid) = running_with_extension(&harness, &mut service, "DENY");
    service.set_session_permission(&id, "contacts", SessionPermission::Allow);
    service.handle_host_event(HostEvent::SessionTerminated {
        host_process_id: pid,
    });

    assert!(!service.set_session_permission(&id, "contacts", SessionPermission::Allow));
    assert_eq!(
        service
            .check_api_access_control(&id, "contacts", "find")
            .try_take(),
        Some(RuntimePermission::InvalidRuntimePerm)
    );
}

#[test]
fn bridge_targets_first_running_application() {
    let harness = Harness::new();
    let conn = open_db_in_memory().unwrap();
    let mut service = harness.service(&conn);

    {
        let mut bridge = AppExtensionBridge::new(&mut service);
        assert!(!bridge.register_permissions("contacts", CONTACTS_TABLE));
        assert_eq!(
            bridge.check_api_access_control("contacts", "find").try_take(),
            Some(RuntimePermission::InvalidRuntimePerm)
        );
    }

    running_with_extension(&harness, &mut service, "ALLOW");
    let mut bridge = AppExtensionBridge::new(&mut service);
    assert!(bridge.register_permissions("contacts", CONTACTS_TABLE));
    assert_eq!(
        bridge.check_api_access_control("contacts", "save").try_take(),
        Some(RuntimePermission::AllowForever)
    );
}
