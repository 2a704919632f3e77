//! Integration tests for the tenant access-control layer
//!
//! Exercises the request gate end to end against an in-memory database:
//! membership resolution, permission enforcement on forged direct
//! requests, the anti-enumeration 404, the sole-owner invariant, and the
//! post-login redirect tie-break.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fleetup_api::{models::*, ApiServer, ApiServerConfig};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt; // For `oneshot` method

/// Helper to create an in-memory database with migrations applied
async fn create_test_db() -> DatabaseConnection {
    let db = fleetup_db::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    fleetup_db::migrate(&db).await.expect("Failed to run migrations");

    db
}

/// Helper to create a test router
fn create_test_app(db: DatabaseConnection) -> Router {
    let config = ApiServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(), // Random port
        enable_cors: false,
        jwt_secret: "test-secret".to_string(),
        allow_signup: true,
        secure_cookies: false,
    };

    ApiServer::new(config, db).build_router()
}

/// Send a JSON request, returning status and parsed body.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Register a user and return (user id, session token).
async fn register(app: &Router, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "SecurePassword123!",
            "full_name": "Test User"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

    let response: RegisterResponse = serde_json::from_value(body).unwrap();
    (response.user.id.to_string(), response.token)
}

/// Create an organization owned by the token's user; returns the slug.
async fn create_org(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/orgs",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "org creation failed: {}", body);

    let org: OrganizationDetails = serde_json::from_value(body).unwrap();
    org.slug
}

/// Invite `email` into `slug` with `role` and accept as `invitee_token`.
async fn invite_and_accept(
    app: &Router,
    inviter_token: &str,
    invitee_token: &str,
    slug: &str,
    email: &str,
    role: &str,
) {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/orgs/{}/invitations", slug),
        Some(inviter_token),
        Some(json!({ "email": email, "role": role })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "invitation failed: {}", body);

    let invitation: InvitationInfo = serde_json::from_value(body).unwrap();

    let (status, body) = send(
        app,
        "POST",
        &format!("/api/invitations/{}/accept", invitation.token),
        Some(invitee_token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "acceptance failed: {}", body);
}

#[tokio::test]
async fn test_unauthenticated_tenant_request_is_rejected() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (status, body) = send(&app, "GET", "/api/orgs/acme", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MISSING_AUTH");
}

#[tokio::test]
async fn test_unknown_slug_and_no_membership_are_indistinguishable() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, alice_token) = register(&app, "alice@acme.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (_, bob_token) = register(&app, "bob@acme.test").await;

    // Existing organization bob cannot access
    let (status_member, body_member) =
        send(&app, "GET", "/api/orgs/acme", Some(&bob_token), None).await;
    // Organization that does not exist at all
    let (status_ghost, body_ghost) =
        send(&app, "GET", "/api/orgs/ghost", Some(&bob_token), None).await;

    assert_eq!(status_member, StatusCode::NOT_FOUND);
    assert_eq!(status_ghost, StatusCode::NOT_FOUND);
    assert_eq!(body_member["code"], body_ghost["code"]);
}

#[tokio::test]
async fn test_slug_lookup_is_case_sensitive() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, alice_token) = register(&app, "alice@case.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (status, _) = send(&app, "GET", "/api/orgs/Acme", Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/orgs/acme", Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_viewer_cannot_create_vehicles_even_directly() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, alice_token) = register(&app, "alice@fleet.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (_, bob_token) = register(&app, "bob@fleet.test").await;
    invite_and_accept(
        &app,
        &alice_token,
        &bob_token,
        "acme",
        "bob@fleet.test",
        "viewer",
    )
    .await;

    // The gate resolves bob's membership: reads are fine
    let (status, body) = send(
        &app,
        "GET",
        "/api/orgs/acme/vehicles",
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    // A forged direct create must be rejected by the permission check
    let (status, body) = send(
        &app,
        "POST",
        "/api/orgs/acme/vehicles",
        Some(&bob_token),
        Some(json!({ "name": "Forged Truck" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // The owner can create
    let (status, _) = send(
        &app,
        "POST",
        "/api/orgs/acme/vehicles",
        Some(&alice_token),
        Some(json!({ "name": "Truck 1", "plate_number": "AC-ME-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // And nothing leaked into bob's write: exactly one vehicle exists
    let (_, body) = send(
        &app,
        "GET",
        "/api/orgs/acme/vehicles",
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_finance_reads_are_admin_gated() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, alice_token) = register(&app, "alice@money.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (_, carol_token) = register(&app, "carol@money.test").await;
    invite_and_accept(
        &app,
        &alice_token,
        &carol_token,
        "acme",
        "carol@money.test",
        "collaborator",
    )
    .await;

    // Collaborators can read vehicles but not finances
    let (status, _) = send(
        &app,
        "GET",
        "/api/orgs/acme/vehicles",
        Some(&carol_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        "/api/orgs/acme/finance/transactions",
        Some(&carol_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("finances:view"));

    // But collaborators can create trips
    let (status, _) = send(
        &app,
        "POST",
        "/api/orgs/acme/trips",
        Some(&carol_token),
        Some(json!({ "origin": "Madrid", "destination": "Lisbon" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Owner records a transaction
    let (status, _) = send(
        &app,
        "POST",
        "/api/orgs/acme/finance/transactions",
        Some(&alice_token),
        Some(json!({ "transaction_type": "expense", "amount": 120.5, "description": "Fuel" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_sole_owner_cannot_be_demoted_or_removed() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (alice_id, alice_token) = register(&app, "alice@owners.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (bob_id, bob_token) = register(&app, "bob@owners.test").await;
    invite_and_accept(
        &app,
        &alice_token,
        &bob_token,
        "acme",
        "bob@owners.test",
        "admin",
    )
    .await;

    // Alice is the only owner: demotion must fail and change nothing
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/orgs/acme/members/{}", alice_id),
        Some(&alice_token),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "LAST_OWNER");

    // Removal of the sole owner is the same invariant
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/orgs/acme/members/{}", alice_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "LAST_OWNER");

    // Membership is unchanged
    let (_, body) = send(&app, "GET", "/api/orgs/acme/members", Some(&alice_token), None).await;
    let members: MemberList = serde_json::from_value(body).unwrap();
    let alice = members
        .members
        .iter()
        .find(|m| m.user_id.to_string() == alice_id)
        .unwrap();
    assert!(matches!(alice.role, fleetup_api::permissions::OrgRole::Owner));

    // With two owners, demotion succeeds and leaves exactly one owner
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/orgs/acme/members/{}", bob_id),
        Some(&alice_token),
        Some(json!({ "role": "owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/orgs/acme/members/{}", alice_id),
        Some(&alice_token),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/orgs/acme/members", Some(&alice_token), None).await;
    let members: MemberList = serde_json::from_value(body).unwrap();
    let owners = members
        .members
        .iter()
        .filter(|m| matches!(m.role, fleetup_api::permissions::OrgRole::Owner))
        .count();
    assert_eq!(owners, 1);
}

#[tokio::test]
async fn test_viewer_cannot_manage_members_or_invite() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (alice_id, alice_token) = register(&app, "alice@mgmt.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (_, bob_token) = register(&app, "bob@mgmt.test").await;
    invite_and_accept(
        &app,
        &alice_token,
        &bob_token,
        "acme",
        "bob@mgmt.test",
        "viewer",
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/orgs/acme/invitations",
        Some(&bob_token),
        Some(json!({ "email": "mole@mgmt.test", "role": "owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/orgs/acme/members/{}", alice_id),
        Some(&bob_token),
        Some(json!({ "role": "viewer" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_redirects_to_most_recently_joined_org() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, alice_token) = register(&app, "alice@redirect.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (_, bob_token) = register(&app, "bob@redirect.test").await;
    invite_and_accept(
        &app,
        &alice_token,
        &bob_token,
        "acme",
        "bob@redirect.test",
        "viewer",
    )
    .await;

    // Bob then founds his own organization (joined later)
    create_org(&app, &bob_token, "Bob Logistics").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": "bob@redirect.test",
            "password": "SecurePassword123!"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let login: LoginResponse = serde_json::from_value(body).unwrap();
    assert_eq!(login.redirect_to, "/bob-logistics");
}

#[tokio::test]
async fn test_login_without_memberships_redirects_to_onboarding() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    register(&app, "carol@onboarding.test").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": "carol@onboarding.test",
            "password": "SecurePassword123!"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let login: LoginResponse = serde_json::from_value(body).unwrap();
    assert_eq!(login.redirect_to, "/onboarding");
}

#[tokio::test]
async fn test_tenant_isolation_between_organizations() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, alice_token) = register(&app, "alice@iso.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (_, eve_token) = register(&app, "eve@iso.test").await;
    create_org(&app, &eve_token, "Evil Corp").await;

    // Each owner only sees their own fleet
    send(
        &app,
        "POST",
        "/api/orgs/acme/vehicles",
        Some(&alice_token),
        Some(json!({ "name": "Acme Truck" })),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/orgs/evil-corp/vehicles",
        Some(&eve_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    // Eve owns an org, but acme is still a 404 for her
    let (status, _) = send(&app, "GET", "/api/orgs/acme/vehicles", Some(&eve_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_slug_is_rejected() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, alice_token) = register(&app, "alice@slug.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (_, bob_token) = register(&app, "bob@slug.test").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/orgs",
        Some(&bob_token),
        Some(json!({ "name": "Acme" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SLUG_TAKEN");
}

#[tokio::test]
async fn test_expired_invitation_cannot_be_accepted() {
    let db = create_test_db().await;
    let app = create_test_app(db.clone());

    let (_, alice_token) = register(&app, "alice@expiry.test").await;
    create_org(&app, &alice_token, "Acme").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/orgs/acme/invitations",
        Some(&alice_token),
        Some(json!({ "email": "late@expiry.test", "role": "viewer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let invitation: InvitationInfo = serde_json::from_value(body).unwrap();

    // Age the invitation past its deadline directly in storage
    use fleetup_db::entities::invitation;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};

    let row = invitation::Entity::find_by_id(invitation.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active: invitation::ActiveModel = row.into();
    active.expires_at = Set(chrono::Utc::now() - chrono::Duration::hours(1));
    active.update(&db).await.unwrap();

    let (_, late_token) = register(&app, "late@expiry.test").await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/invitations/{}/accept", invitation.token),
        Some(&late_token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVITATION_EXPIRED");
}
