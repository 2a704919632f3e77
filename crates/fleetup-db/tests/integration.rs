//! Integration tests for fleetup-db
//!
//! Tests database operations with a real SQLite in-memory database

use chrono::Utc;
use fleetup_db::{
    connect,
    entities::{
        impersonation_log, invitation, organization, organization_member,
        organization_member::OrgRole, user, vehicle,
    },
    migrate,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// Helper to create a test database
async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

async fn insert_user(db: &sea_orm::DatabaseConnection, email: &str) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("$argon2id$test".to_string()),
        full_name: Set(None),
        is_super_admin: Set(false),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

async fn insert_organization(db: &sea_orm::DatabaseConnection, slug: &str) -> organization::Model {
    organization::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("{} Inc", slug)),
        slug: Set(slug.to_string()),
        logo_url: Set(None),
        settings: Set(serde_json::json!({})),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert organization")
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_organization_slug_is_unique() {
    let db = setup_test_db().await;

    insert_organization(&db, "acme").await;

    let duplicate = organization::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Acme Clone".to_string()),
        slug: Set("acme".to_string()),
        logo_url: Set(None),
        settings: Set(serde_json::json!({})),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&db)
    .await;

    assert!(duplicate.is_err(), "Duplicate slug should be rejected");
}

#[tokio::test]
async fn test_membership_role_round_trip() {
    let db = setup_test_db().await;

    let org = insert_organization(&db, "roundtrip").await;
    let alice = insert_user(&db, "alice@example.com").await;

    organization_member::ActiveModel {
        organization_id: Set(org.id),
        user_id: Set(alice.id),
        role: Set(OrgRole::Owner),
        invited_by: Set(None),
        joined_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .expect("Failed to insert membership");

    let found = organization_member::Entity::find_by_id((org.id, alice.id))
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Membership not found");

    assert_eq!(found.role, OrgRole::Owner);
}

#[tokio::test]
async fn test_one_membership_per_user_per_org() {
    let db = setup_test_db().await;

    let org = insert_organization(&db, "unique-membership").await;
    let bob = insert_user(&db, "bob@example.com").await;

    organization_member::ActiveModel {
        organization_id: Set(org.id),
        user_id: Set(bob.id),
        role: Set(OrgRole::Viewer),
        invited_by: Set(None),
        joined_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .expect("Failed to insert membership");

    // Same (organization, user) pair with a different role must violate
    // the composite primary key
    let second = organization_member::ActiveModel {
        organization_id: Set(org.id),
        user_id: Set(bob.id),
        role: Set(OrgRole::Admin),
        invited_by: Set(None),
        joined_at: Set(Utc::now()),
    }
    .insert(&db)
    .await;

    assert!(second.is_err(), "Second membership row should be rejected");
}

#[tokio::test]
async fn test_count_owners_by_role() {
    let db = setup_test_db().await;

    let org = insert_organization(&db, "owner-count").await;
    let alice = insert_user(&db, "alice@owners.test").await;
    let carol = insert_user(&db, "carol@owners.test").await;
    let bob = insert_user(&db, "bob@owners.test").await;

    for (user, role) in [
        (&alice, OrgRole::Owner),
        (&carol, OrgRole::Owner),
        (&bob, OrgRole::Viewer),
    ] {
        organization_member::ActiveModel {
            organization_id: Set(org.id),
            user_id: Set(user.id),
            role: Set(role),
            invited_by: Set(None),
            joined_at: Set(Utc::now()),
        }
        .insert(&db)
        .await
        .expect("Failed to insert membership");
    }

    let owners = organization_member::Entity::find()
        .filter(organization_member::Column::OrganizationId.eq(org.id))
        .filter(organization_member::Column::Role.eq(OrgRole::Owner))
        .count(&db)
        .await
        .expect("Failed to count");

    assert_eq!(owners, 2);
}

#[tokio::test]
async fn test_invitation_token_is_unique() {
    let db = setup_test_db().await;

    let org = insert_organization(&db, "invites").await;
    let inviter = insert_user(&db, "owner@invites.test").await;

    let token = Uuid::new_v4().to_string();

    let make_invitation = |email: &str| invitation::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(org.id),
        email: Set(email.to_string()),
        role: Set(OrgRole::Viewer),
        token: Set(token.clone()),
        invited_by: Set(inviter.id),
        status: Set(invitation::InvitationStatus::Pending),
        expires_at: Set(Utc::now() + chrono::Duration::days(7)),
        accepted_at: Set(None),
        created_at: Set(Utc::now()),
    };

    make_invitation("first@example.com")
        .insert(&db)
        .await
        .expect("Failed to insert invitation");

    let duplicate = make_invitation("second@example.com").insert(&db).await;
    assert!(duplicate.is_err(), "Duplicate token should be rejected");
}

#[tokio::test]
async fn test_open_impersonation_log_query() {
    let db = setup_test_db().await;

    let org = insert_organization(&db, "audited").await;
    let admin = insert_user(&db, "root@fleetup.test").await;

    // One closed session, then one open session
    impersonation_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        super_admin_id: Set(admin.id),
        organization_id: Set(org.id),
        started_at: Set(Utc::now() - chrono::Duration::hours(8)),
        ended_at: Set(Some(Utc::now() - chrono::Duration::hours(7))),
        ip_address: Set(None),
        user_agent: Set(None),
    }
    .insert(&db)
    .await
    .expect("Failed to insert closed log row");

    let open = impersonation_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        super_admin_id: Set(admin.id),
        organization_id: Set(org.id),
        started_at: Set(Utc::now()),
        ended_at: Set(None),
        ip_address: Set(Some("203.0.113.9".to_string())),
        user_agent: Set(Some("fleetup-test".to_string())),
    }
    .insert(&db)
    .await
    .expect("Failed to insert open log row");

    // The most recent open row is the one `stopImpersonation` must close
    let found = impersonation_log::Entity::find()
        .filter(impersonation_log::Column::SuperAdminId.eq(admin.id))
        .filter(impersonation_log::Column::OrganizationId.eq(org.id))
        .filter(impersonation_log::Column::EndedAt.is_null())
        .order_by_desc(impersonation_log::Column::StartedAt)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Open log row not found");

    assert_eq!(found.id, open.id);

    // Closing it leaves no open rows
    let mut active: impersonation_log::ActiveModel = found.into();
    active.ended_at = Set(Some(Utc::now()));
    active.update(&db).await.expect("Failed to close log row");

    let remaining = impersonation_log::Entity::find()
        .filter(impersonation_log::Column::SuperAdminId.eq(admin.id))
        .filter(impersonation_log::Column::EndedAt.is_null())
        .count(&db)
        .await
        .expect("Failed to count");

    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_vehicles_are_tenant_scoped() {
    let db = setup_test_db().await;

    let acme = insert_organization(&db, "acme-vehicles").await;
    let globex = insert_organization(&db, "globex-vehicles").await;

    for (org, name) in [(&acme, "Truck 1"), (&acme, "Truck 2"), (&globex, "Van 1")] {
        vehicle::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(org.id),
            name: Set(name.to_string()),
            plate_number: Set(None),
            brand: Set(None),
            model: Set(None),
            year: Set(None),
            status: Set(vehicle::VehicleStatus::Active),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(&db)
        .await
        .expect("Failed to insert vehicle");
    }

    let acme_vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::OrganizationId.eq(acme.id))
        .count(&db)
        .await
        .expect("Failed to count");

    assert_eq!(acme_vehicles, 2);
}
