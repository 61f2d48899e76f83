mod generate;
mod healthcheck;
mod index;

use salvo::Router;

pub use daysheet_core::constants::{
    GENERATE_ROUTE_COMPONENT, GENERATE_ROUTE_PREFIX, HEALTHCHECK_ROUTE_COMPONENT,
    HEALTHCHECK_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the router: the form page at `/`, the generator and the
/// healthcheck.
#[must_use]
pub fn routes() -> Router {
    Router::new()
        .get(index::index)
        .push(generate::routes())
        .push(healthcheck::routes())
}
