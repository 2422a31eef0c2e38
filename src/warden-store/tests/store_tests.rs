//! Behaviour tests for warden-store against the in-memory backend.

use std::io::Write;

use pretty_assertions::assert_eq;
use warden_policy::{Access, Authority, CommandName, ExternalId, PermissionRule, Unresolvable};
use warden_store::{
    DisplayHints, MemoryStore, PermissionStore, Seed, SeedError, check_access, compare_users,
    load_snapshot, resolve_for,
};

const SEED: &str = r#"
[settings]
access_mode = "strict"
terms_text = "Rules of use."

[[roles]]
name = "admin"
priority = 100

[[roles]]
name = "lecturer"
priority = 40

[[roles]]
name = "student"
priority = 10

[[users]]
external_id = 100
username = "root"
roles = ["admin"]
registered = true
terms_accepted = true

[[users]]
external_id = 200
roles = ["student", "lecturer"]
registered = true

[[users]]
external_id = 300
roles = ["student"]

[[permissions]]
for_role = "admin"
allow_command = "all"

[[permissions]]
for_role = "lecturer"
allow_command = "mailing"

[[permissions]]
for_role = "student"
allow_command = "start"

[[permissions]]
for_role = "student"
deny_command = "mailing"

[[permissions]]
for_user = 3
deny_command = "start"
"#;

async fn seeded() -> MemoryStore {
    MemoryStore::from_seed(Seed::parse(SEED).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_seed_file_roundtrip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SEED.as_bytes()).unwrap();

    let seed = Seed::load(file.path()).await.unwrap();
    let store = MemoryStore::from_seed(seed).await.unwrap();

    let user = store.get_user(ExternalId(100)).await.unwrap().unwrap();
    assert!(user.is_registered);
    assert!(user.terms_accepted);
    assert_eq!(
        store.get_setting("terms_text").await.unwrap().as_deref(),
        Some("Rules of use.")
    );
}

#[tokio::test]
async fn test_missing_seed_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Seed::load(dir.path().join("absent.toml")).await;
    assert!(matches!(result, Err(SeedError::Io { .. })));
}

#[tokio::test]
async fn test_seed_rejects_unknown_role() {
    let seed = Seed::parse(
        r#"
[[users]]
external_id = 1
roles = ["ghost"]
"#,
    )
    .unwrap();
    let result = MemoryStore::from_seed(seed).await;
    assert!(matches!(result, Err(SeedError::UnknownRole(1, _))));
}

#[tokio::test]
async fn test_seed_rejects_duplicate_role() {
    let seed = Seed::parse(
        r#"
[[roles]]
name = "admin"
priority = 1

[[roles]]
name = "admin"
priority = 2
"#,
    )
    .unwrap();
    let result = MemoryStore::from_seed(seed).await;
    assert!(matches!(result, Err(SeedError::DuplicateRole(_))));
}

#[tokio::test]
async fn test_check_access_through_store() {
    let store = seeded().await;

    // admin holds the wildcard
    assert_eq!(check_access(&store, ExternalId(100), "anything").await.unwrap(), Access::Allowed);

    // lecturer (40) allow beats student (10) deny
    assert_eq!(check_access(&store, ExternalId(200), "mailing").await.unwrap(), Access::Allowed);
    assert_eq!(check_access(&store, ExternalId(200), "ban").await.unwrap(), Access::Denied);

    // user 300 has surrogate id 3 and a personal deny on start
    assert_eq!(check_access(&store, ExternalId(300), "start").await.unwrap(), Access::Denied);

    // unknown user
    assert_eq!(
        check_access(&store, ExternalId(999), "start").await.unwrap(),
        Access::Unresolvable
    );
    assert_eq!(check_access(&store, ExternalId(100), "").await.unwrap(), Access::Unresolvable);
}

#[tokio::test]
async fn test_new_user_without_roles_is_unresolvable() {
    let store = seeded().await;
    store
        .create_user(ExternalId(400), &DisplayHints::default())
        .await
        .unwrap();

    let resolved = resolve_for(&store, ExternalId(400)).await.unwrap();
    assert_eq!(resolved, Err(Unresolvable::NoRoles));
}

#[tokio::test]
async fn test_resolution_reads_latest_state() {
    let store = seeded().await;
    assert_eq!(check_access(&store, ExternalId(300), "schedule").await.unwrap(), Access::Denied);

    store
        .add_rule(PermissionRule::allow_role("student", "schedule"))
        .await;

    assert_eq!(check_access(&store, ExternalId(300), "schedule").await.unwrap(), Access::Allowed);
}

#[tokio::test]
async fn test_resolve_twice_is_identical() {
    let store = seeded().await;
    let first = resolve_for(&store, ExternalId(200)).await.unwrap().unwrap();
    let second = resolve_for(&store, ExternalId(200)).await.unwrap().unwrap();
    assert_eq!(first, second);

    let names: Vec<&str> = first.iter().map(CommandName::as_str).collect();
    assert_eq!(names, vec!["mailing", "start"]);
}

#[tokio::test]
async fn test_snapshot_of_unknown_user_is_empty() {
    let store = seeded().await;
    let snapshot = load_snapshot(&store, ExternalId(12345)).await.unwrap();
    assert_eq!(snapshot.user_id, None);
    assert!(snapshot.rules.is_empty());
}

#[tokio::test]
async fn test_compare_users() {
    let store = seeded().await;

    assert_eq!(
        compare_users(&store, ExternalId(100), ExternalId(200)).await.unwrap(),
        Ok(Authority::First)
    );
    assert_eq!(
        compare_users(&store, ExternalId(300), ExternalId(200)).await.unwrap(),
        Ok(Authority::Second)
    );
    assert_eq!(
        compare_users(&store, ExternalId(300), ExternalId(300)).await.unwrap(),
        Ok(Authority::Equal)
    );
    assert_eq!(
        compare_users(&store, ExternalId(300), ExternalId(999)).await.unwrap(),
        Err(Unresolvable::NoRoles)
    );
}
