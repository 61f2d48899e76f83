use std::sync::Arc;

use daysheet_service::feed::FeedFetcher;
use salvo::async_trait;

use crate::error::{AppError, AppResult};

/// Makes the feed fetcher available to handlers.
pub struct FeedFetcherHandler {
    pub fetcher: Arc<dyn FeedFetcher>,
}

#[async_trait]
impl salvo::Handler for FeedFetcherHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.fetcher));
    }
}

/// ## Summary
/// Retrieves the feed fetcher from the depot.
///
/// ## Errors
/// Returns an error if no fetcher was injected.
pub fn get_fetcher_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn FeedFetcher>> {
    depot
        .obtain::<Arc<dyn FeedFetcher>>()
        .cloned()
        .map_err(|_err| AppError::InvariantViolation("Feed fetcher not found in depot"))
}
