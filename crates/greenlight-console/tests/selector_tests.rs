//! Entity selector tests over static directories: pre-selection
//! materialization and stale-search discarding.

use greenlight_console::selector::{
    resolve_preselected_roles, resolve_preselected_users, sequenced_role_search, SearchSequencer,
};
use greenlight_model::{RoleAudience, RoleSummary, UserSummary};
use greenlight_test_utils::{StaticRoleDirectory, StaticUserDirectory};

fn role(id: &str, name: &str) -> RoleSummary {
    RoleSummary {
        id: id.to_string(),
        display_name: name.to_string(),
        audience: Some(RoleAudience::Organization),
    }
}

fn user(id: &str, name: &str) -> UserSummary {
    UserSummary {
        id: id.to_string(),
        user_name: name.to_string(),
    }
}

#[tokio::test]
async fn preselected_roles_resolve_from_loaded_page_first() {
    let directory = StaticRoleDirectory::new(vec![role("r-1", "approvers"), role("r-2", "auditors")]);
    let loaded = vec![role("r-1", "approvers")];

    let resolved = resolve_preselected_roles(
        &["r-1".to_string(), "r-2".to_string()],
        &loaded,
        &directory,
    )
    .await;

    assert_eq!(resolved.resolved.len(), 2);
    assert!(resolved.unresolved.is_empty());
    assert_eq!(resolved.resolved[1].display_name, "auditors");
}

#[tokio::test]
async fn unresolvable_ids_are_reported_not_dropped() {
    let directory = StaticRoleDirectory::new(vec![role("r-1", "approvers")]);

    let resolved =
        resolve_preselected_roles(&["r-1".to_string(), "r-gone".to_string()], &[], &directory)
            .await;

    assert_eq!(resolved.resolved.len(), 1);
    assert_eq!(resolved.unresolved, vec!["r-gone".to_string()]);
}

#[tokio::test]
async fn preselected_users_use_fetch_by_id_fallback() {
    let directory = StaticUserDirectory::new(vec![user("u-1", "alice"), user("u-2", "LDAP/bob")]);

    let resolved = resolve_preselected_users(
        &["u-2".to_string()],
        &[], // nothing loaded yet
        &directory,
    )
    .await;

    assert_eq!(resolved.resolved.len(), 1);
    assert_eq!(resolved.resolved[0].user_name, "LDAP/bob");
}

#[tokio::test]
async fn superseded_search_results_are_discarded() {
    let directory = StaticRoleDirectory::new(vec![role("r-1", "approvers")]);
    let sequencer = SearchSequencer::new();

    // A newer request is issued while the first is conceptually in flight:
    // begin a request, then start a second search before accepting the
    // first result.
    let first_token = sequencer.begin();
    let second = sequenced_role_search(&sequencer, &directory, "approvers", None)
        .await
        .unwrap();

    assert!(second.is_some(), "latest search applies its results");
    assert!(
        !sequencer.accept(first_token),
        "stale first response must be discarded"
    );
}
