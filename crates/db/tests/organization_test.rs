//! Integration tests for organizations and memberships.

mod common;

use kontor_db::{
    OrganizationRepository, RepoError, UserRepository, entities::sea_orm_active_enums::UserRole,
};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_membership_roles() {
    let Some(t) = common::setup().await else {
        return;
    };
    let orgs = OrganizationRepository::new(t.db.clone());
    let users = UserRepository::new(t.db.clone());

    assert!(orgs.is_member(t.org_id, t.user_id).await.unwrap());
    assert!(
        orgs.has_role(t.org_id, t.user_id, UserRole::Admin)
            .await
            .unwrap()
    );

    let viewer = users
        .create(&format!("Viewer-{}@Example.com", Uuid::new_v4()), "Viewer")
        .await
        .unwrap();
    assert_eq!(viewer.email, viewer.email.to_lowercase());

    orgs.add_user(t.org_id, viewer.id, UserRole::Viewer)
        .await
        .unwrap();
    assert!(orgs.is_member(t.org_id, viewer.id).await.unwrap());
    assert!(
        !orgs
            .has_role(t.org_id, viewer.id, UserRole::Accountant)
            .await
            .unwrap()
    );

    let memberships = users.get_user_organizations(viewer.id).await.unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].0.id, t.org_id);
    assert_eq!(memberships[0].1.role, UserRole::Viewer);

    let found = users.find_by_email(&viewer.email.to_uppercase()).await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(viewer.id));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_slug_lookup_and_invalid_start_month() {
    let Some(t) = common::setup().await else {
        return;
    };
    let orgs = OrganizationRepository::new(t.db.clone());

    let org = orgs.get(t.org_id).await.unwrap();
    assert_eq!(org.base_currency, "USD");
    assert!(orgs.slug_exists(&org.slug).await.unwrap());
    let by_slug = orgs.find_by_slug(&org.slug).await.unwrap();
    assert_eq!(by_slug.map(|o| o.id), Some(t.org_id));

    let err = orgs
        .create_with_owner("Bad", &format!("bad-{}", Uuid::new_v4()), "usd", 13, t.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "unexpected error: {err}");

    let missing = orgs.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(missing, RepoError::NotFound { .. }));
}
