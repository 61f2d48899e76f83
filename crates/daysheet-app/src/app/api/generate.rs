use chrono::Utc;
use daysheet_service::generate::{PlannerForm, PlannerRequest, RenderedPlanner, generate_planner};
use daysheet_service::planner::zone::resolve_display_zone;
use salvo::http::StatusCode;
use salvo::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Serialize;

use super::GENERATE_ROUTE_COMPONENT;
use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult};
use crate::fetcher_handler::get_fetcher_from_depot;

const GENERIC_ERROR: &str = "An error occurred generating the calendar";

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// ## Summary
/// POST /generate - builds the planner PDF from the submitted form.
///
/// ## Errors
/// Returns HTTP 400 with the validation message for bad input, HTTP 500 with
/// a generic message for anything else.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn generate(req: &mut Request, depot: &Depot, res: &mut Response) {
    let form: PlannerForm = match req.parse_form().await {
        Ok(form) => form,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to parse planner form");
            write_error(res, StatusCode::BAD_REQUEST, "Invalid form data");
            return;
        }
    };

    match build_planner(&form, depot).await {
        Ok(rendered) => write_pdf(res, rendered),
        Err(AppError::ValidationError(err)) => {
            tracing::debug!(error = %err, "Planner request rejected");
            write_error(res, StatusCode::BAD_REQUEST, &err.to_string());
        }
        Err(err) => {
            tracing::error!(error = %err, "Planner generation failed");
            write_error(res, StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR);
        }
    }
}

async fn build_planner(form: &PlannerForm, depot: &Depot) -> AppResult<RenderedPlanner> {
    let settings = get_config_from_depot(depot)?;
    let fetcher = get_fetcher_from_depot(depot)?;

    let tz = resolve_display_zone(&settings.planner.timezone);
    let today = Utc::now().with_timezone(&tz).date_naive();
    let request = PlannerRequest::from_form(form, today, &settings.planner)?;
    tracing::info!(
        sources = request.sources.len(),
        start = %request.window.start(),
        end = %request.window.end(),
        "Generating planner"
    );

    Ok(generate_planner(fetcher.as_ref(), &request, tz).await?)
}

fn write_pdf(res: &mut Response, rendered: RenderedPlanner) {
    let disposition = format!("attachment; filename=\"{}\"", rendered.filename);
    if res.add_header(CONTENT_TYPE, "application/pdf", true).is_err()
        || res.add_header(CONTENT_DISPOSITION, disposition, true).is_err()
    {
        tracing::error!(filename = %rendered.filename, "Failed to set download headers");
        write_error(res, StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR);
        return;
    }

    res.status_code(StatusCode::OK);
    res.body(rendered.pdf);
}

fn write_error(res: &mut Response, status: StatusCode, message: &str) {
    res.status_code(status);
    res.render(Json(ErrorResponse {
        error: message.to_owned(),
    }));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(GENERATE_ROUTE_COMPONENT).post(generate)
}
