//! Fleetup REST API
//!
//! Routes are grouped into four classes with distinct gates:
//! - public (health, auth entry points, invitation preview)
//! - protected (any valid session)
//! - admin (session + storage-verified super admin)
//! - tenant (session + membership or impersonation, under
//!   `/api/orgs/{slug}`)
//!
//! The gates are composed as tower middleware layers here; handlers only
//! ever consume the request extensions the gates attach.

pub mod cookies;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod permissions;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use fleetup_auth::JwtValidator;
use sea_orm::DatabaseConnection;

use middleware::AuthState;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    /// HS256 secret for session and impersonation tokens
    pub jwt_secret: String,
    pub allow_signup: bool,
    /// Mark cookies `Secure` (behind TLS)
    pub secure_cookies: bool,
    /// Shared validator for the tokens this API signs
    pub validator: Arc<JwtValidator>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fleetup API",
        version = "0.1.0",
        description = "REST API for multi-tenant fleet management",
        contact(
            name = "Fleetup Team",
            email = "team@fleetup.io"
        )
    ),
    paths(
        handlers::health_check,
        handlers::auth::auth_config,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_current_user,
        handlers::auth::list_user_organizations,
        handlers::organizations::create_organization,
        handlers::organizations::get_organization,
        handlers::organizations::update_organization,
        handlers::organizations::delete_organization,
        handlers::members::list_members,
        handlers::members::update_member_role,
        handlers::members::remove_member,
        handlers::invitations::create_invitation,
        handlers::invitations::list_invitations,
        handlers::invitations::cancel_invitation,
        handlers::invitations::preview_invitation,
        handlers::invitations::accept_invitation,
        handlers::impersonation::start_impersonation,
        handlers::impersonation::stop_impersonation,
        handlers::impersonation::impersonation_status,
        handlers::admin::list_all_organizations,
        handlers::admin::list_impersonation_logs,
        handlers::vehicles::list_vehicles,
        handlers::vehicles::create_vehicle,
        handlers::vehicles::update_vehicle,
        handlers::vehicles::delete_vehicle,
        handlers::trips::list_trips,
        handlers::trips::create_trip,
        handlers::trips::update_trip,
        handlers::trips::delete_trip,
        handlers::finance::list_transactions,
        handlers::finance::create_transaction,
        handlers::finance::delete_transaction,
    ),
    components(
        schemas(
            models::ErrorResponse,
            models::HealthResponse,
            models::AuthConfig,
            models::RegisterRequest,
            models::RegisterResponse,
            models::LoginRequest,
            models::LoginResponse,
            models::UserProfile,
            models::OrganizationSummary,
            models::OrganizationDetails,
            models::CreateOrganizationRequest,
            models::UpdateOrganizationRequest,
            models::OrganizationList,
            models::MembershipSummary,
            models::MembershipList,
            models::Member,
            models::MemberList,
            models::UpdateMemberRoleRequest,
            models::InvitationStatus,
            models::CreateInvitationRequest,
            models::InvitationInfo,
            models::InvitationList,
            models::InvitationPreview,
            models::AcceptInvitationResponse,
            models::StartImpersonationRequest,
            models::ImpersonationStatus,
            models::ImpersonationLogEntry,
            models::ImpersonationLogList,
            models::VehicleStatus,
            models::Vehicle,
            models::VehicleList,
            models::CreateVehicleRequest,
            models::UpdateVehicleRequest,
            models::TripStatus,
            models::Trip,
            models::TripList,
            models::CreateTripRequest,
            models::UpdateTripRequest,
            models::TransactionType,
            models::Transaction,
            models::TransactionList,
            models::CreateTransactionRequest,
            permissions::OrgRole,
            permissions::Permission,
        )
    ),
    tags(
        (name = "system", description = "System health endpoints"),
        (name = "auth", description = "Authentication and session endpoints"),
        (name = "organizations", description = "Organization lifecycle endpoints"),
        (name = "members", description = "Member management endpoints"),
        (name = "invitations", description = "Invitation endpoints"),
        (name = "impersonation", description = "Super-admin impersonation endpoints"),
        (name = "admin", description = "Cross-tenant admin endpoints"),
        (name = "vehicles", description = "Vehicle endpoints"),
        (name = "trips", description = "Trip endpoints"),
        (name = "finance", description = "Financial transaction endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
    /// HS256 secret for signing session and impersonation tokens
    pub jwt_secret: String,
    /// Whether self-service signup is enabled
    pub allow_signup: bool,
    /// Mark cookies `Secure` (behind TLS)
    pub secure_cookies: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
            jwt_secret: "temporary-secret-change-me-in-production".to_string(),
            allow_signup: true,
            secure_cookies: false,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> Self {
        let state = Arc::new(AppState {
            db,
            jwt_secret: config.jwt_secret.clone(),
            allow_signup: config.allow_signup,
            secure_cookies: config.secure_cookies,
            validator: Arc::new(JwtValidator::new(config.jwt_secret.as_bytes())),
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let auth_state = Arc::new(AuthState::new(
            &self.config.jwt_secret,
            self.config.secure_cookies,
        ));

        // PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/config", get(handlers::auth::auth_config))
            .route("/api/auth/register", post(handlers::auth::register))
            .route("/api/auth/login", post(handlers::auth::login))
            .route("/api/auth/logout", post(handlers::auth::logout))
            .route(
                "/api/invitations/{token}",
                get(handlers::invitations::preview_invitation),
            )
            .with_state(self.state.clone());

        // PROTECTED routes (any valid session)
        let protected_router = Router::new()
            .route("/api/auth/me", get(handlers::auth::get_current_user))
            .route(
                "/api/auth/organizations",
                get(handlers::auth::list_user_organizations),
            )
            .route(
                "/api/orgs",
                post(handlers::organizations::create_organization),
            )
            .route(
                "/api/invitations/{token}/accept",
                post(handlers::invitations::accept_invitation),
            )
            .route(
                "/api/impersonation",
                get(handlers::impersonation::impersonation_status)
                    .delete(handlers::impersonation::stop_impersonation),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                auth_state.clone(),
                middleware::require_auth,
            ));

        // ADMIN routes (session + storage-verified super admin)
        let admin_router = Router::new()
            .route(
                "/api/admin/organizations",
                get(handlers::admin::list_all_organizations),
            )
            .route(
                "/api/admin/impersonation",
                post(handlers::impersonation::start_impersonation),
            )
            .route(
                "/api/admin/impersonation/logs",
                get(handlers::admin::list_impersonation_logs),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                self.state.clone(),
                middleware::require_super_admin,
            ))
            .layer(axum_middleware::from_fn_with_state(
                auth_state.clone(),
                middleware::require_auth,
            ));

        // TENANT routes (session + membership or impersonation)
        let tenant_router = Router::new()
            .route(
                "/",
                get(handlers::organizations::get_organization)
                    .patch(handlers::organizations::update_organization)
                    .delete(handlers::organizations::delete_organization),
            )
            .route("/members", get(handlers::members::list_members))
            .route(
                "/members/{user_id}",
                axum::routing::patch(handlers::members::update_member_role)
                    .delete(handlers::members::remove_member),
            )
            .route(
                "/invitations",
                get(handlers::invitations::list_invitations)
                    .post(handlers::invitations::create_invitation),
            )
            .route(
                "/invitations/{id}",
                axum::routing::delete(handlers::invitations::cancel_invitation),
            )
            .route(
                "/vehicles",
                get(handlers::vehicles::list_vehicles).post(handlers::vehicles::create_vehicle),
            )
            .route(
                "/vehicles/{id}",
                axum::routing::patch(handlers::vehicles::update_vehicle)
                    .delete(handlers::vehicles::delete_vehicle),
            )
            .route(
                "/trips",
                get(handlers::trips::list_trips).post(handlers::trips::create_trip),
            )
            .route(
                "/trips/{id}",
                axum::routing::patch(handlers::trips::update_trip)
                    .delete(handlers::trips::delete_trip),
            )
            .route(
                "/finance/transactions",
                get(handlers::finance::list_transactions)
                    .post(handlers::finance::create_transaction),
            )
            .route(
                "/finance/transactions/{id}",
                axum::routing::delete(handlers::finance::delete_transaction),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                self.state.clone(),
                middleware::resolve_org,
            ))
            .layer(axum_middleware::from_fn_with_state(
                auth_state.clone(),
                middleware::require_auth,
            ));

        let api_router = public_router
            .merge(protected_router)
            .merge(admin_router)
            .nest("/api/orgs/{slug}", tenant_router);

        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        // Configure CORS
        let cors = if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            // Cookie-based auth needs credentials, and with credentials
            // the origin cannot be a wildcard
            let cors_layer = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            Some(cors_layer)
        } else {
            None
        };

        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}
