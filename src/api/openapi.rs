//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, catalog, copies, health, loans, logs, reference, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mediateca API",
        version = "0.3.0",
        description = "School library management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::token,
        auth::me,
        // Catalog
        catalog::search,
        catalog::suggestions,
        catalog::get_entry,
        catalog::create_entry,
        catalog::delete_entry,
        // Copies
        copies::list,
        copies::create,
        copies::decommission,
        copies::exclude,
        copies::restore,
        // Loans
        loans::list,
        loans::create,
        loans::return_loan,
        loans::list_reservations,
        loans::create_reservation,
        // Users
        users::list,
        users::list_borrowers,
        users::get,
        users::create,
        users::update,
        users::delete,
        users::import,
        // Reference
        reference::list_centres,
        reference::create_centre,
        reference::delete_centre,
        reference::list_groups,
        reference::create_group,
        reference::delete_group,
        reference::list_countries,
        reference::create_country,
        reference::delete_country,
        reference::list_languages,
        reference::create_language,
        reference::delete_language,
        reference::list_categories,
        reference::create_category,
        // Logs
        logs::list,
    ),
    components(
        schemas(
            // Catalog
            crate::models::catalog::CatalogEntry,
            crate::models::catalog::CatalogSummary,
            crate::models::catalog::CatalogVariant,
            crate::models::catalog::BookDetail,
            crate::models::catalog::MagazineDetail,
            crate::models::catalog::CdDetail,
            crate::models::catalog::VideoDetail,
            crate::models::catalog::DeviceDetail,
            crate::models::catalog::CopyCounts,
            crate::models::catalog::CreateCatalogEntry,
            crate::models::catalog::Suggestion,
            // Copies
            crate::models::copy::Copy,
            crate::models::copy::CopyDetails,
            crate::models::copy::CreateCopy,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::Reservation,
            crate::models::loan::CreateReservation,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::ImportUserRecord,
            crate::models::user::ImportError,
            crate::models::user::ImportReport,
            crate::models::user::TokenRequest,
            crate::models::user::TokenResponse,
            // Reference
            crate::models::reference::NamedRef,
            crate::models::reference::Category,
            crate::models::reference::CreateNamedRef,
            crate::models::reference::CreateCategory,
            // Logs
            crate::models::log::AuditLog,
            crate::models::log::LogLevel,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Catalog search and management"),
        (name = "copies", description = "Physical copy registry"),
        (name = "loans", description = "Loan and reservation ledger"),
        (name = "users", description = "User directory"),
        (name = "reference", description = "Reference data"),
        (name = "logs", description = "Audit log")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
