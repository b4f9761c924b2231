//! HTTP handler functions for the dashboard pages, map documents, and API.

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, web};
use resilience_map_analytics::{NullPolicy, ProximityReport, ProximityScorer, defined_scores, top_n};
use resilience_map_network_models::Treatment;
use resilience_map_server_models::{
    ApiCentrality, ApiError, ApiHealth, ApiProximity, ApiRanking, CentralityQueryParams, Page,
    PageParams, ProximityQueryParams, RankingQueryParams,
};

use crate::views::{self, Controls};
use crate::{AppState, ServerError, pages};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /`
///
/// Renders the page selected by the `page` parameter. Data failures render
/// an error page instead of the view.
pub async fn page(state: web::Data<AppState>, params: web::Query<PageParams>) -> HttpResponse {
    let page = params.page.unwrap_or_default();

    let result = match page {
        Page::Intro => Ok(pages::intro_page(&state.config)),
        Page::Treatment => render_treatment_page(&state, &params),
        Page::Centrality => render_centrality_page(&state, &params),
    };

    match result {
        Ok(html) => html_response(html),
        Err(e) => {
            log::error!("Failed to render {page} page: {e}");
            HttpResponse::build(e.status())
                .content_type(ContentType::html())
                .body(pages::error_page(&state.config, page, &e.to_string()))
        }
    }
}

/// `GET /map/treatment`
///
/// The ranked map alone, as a standalone HTML document.
pub async fn treatment_map(
    state: web::Data<AppState>,
    params: web::Query<PageParams>,
) -> HttpResponse {
    let result = Controls::from_params(&params, &state.config.analysis).and_then(|controls| {
        let view = views::treatment_view(&state.cache, &state.config.analysis, &controls)?;
        Ok(view.document.to_html()?)
    });
    map_response(result)
}

/// `GET /map/centrality`
pub async fn centrality_map(
    state: web::Data<AppState>,
    params: web::Query<PageParams>,
) -> HttpResponse {
    let result = Controls::from_params(&params, &state.config.analysis).and_then(|controls| {
        Ok(views::centrality_view(&state.cache, controls.treatment)?.to_html()?)
    });
    map_response(result)
}

/// `GET /api/ranking`
///
/// Returns the top-ranked intersections under a treatment.
pub async fn ranking(
    state: web::Data<AppState>,
    params: web::Query<RankingQueryParams>,
) -> HttpResponse {
    let treatment = match Treatment::new(params.treatment) {
        Ok(t) => t,
        Err(e) => return api_error(&ServerError::from(e)),
    };
    let top = views::clamp_top(params.top, &state.config.analysis);

    match state.cache.graph() {
        Ok(table) => HttpResponse::Ok().json(ApiRanking {
            treatment: treatment.value(),
            column: treatment.column_name(),
            requested: top,
            intersections: top_n(table, treatment, top, NullPolicy::Exclude),
        }),
        Err(e) => api_error(&ServerError::from(e)),
    }
}

/// `GET /api/proximity`
///
/// Counts top-ranked intersections inside one facility layer's buffers.
pub async fn proximity(
    state: web::Data<AppState>,
    params: web::Query<ProximityQueryParams>,
) -> HttpResponse {
    let treatment = match Treatment::new(params.treatment) {
        Ok(t) => t,
        Err(e) => return api_error(&ServerError::from(e)),
    };
    let top = views::clamp_top(params.top, &state.config.analysis);

    let table = match state.cache.graph() {
        Ok(table) => table,
        Err(e) => return api_error(&ServerError::from(e)),
    };

    let Some(facilities) = state.cache.facilities(params.layer) else {
        return HttpResponse::NotFound().json(ApiError {
            error: format!("{} layer unavailable", params.layer.label()),
        });
    };

    let scorer = ProximityScorer::new(facilities, state.config.analysis.buffer_radius_m);
    let report = ProximityReport::compute(&scorer, table, treatment, top);

    HttpResponse::Ok().json(ApiProximity {
        treatment: treatment.value(),
        layer: report.kind,
        radius_m: report.radius_m,
        near: report.near,
        ranked: report.ranked,
        summary: report.summary(),
    })
}

/// `GET /api/centrality`
///
/// Returns every intersection with a defined score under a treatment.
pub async fn centrality(
    state: web::Data<AppState>,
    params: web::Query<CentralityQueryParams>,
) -> HttpResponse {
    let treatment = match Treatment::new(params.treatment) {
        Ok(t) => t,
        Err(e) => return api_error(&ServerError::from(e)),
    };

    match state.cache.graph() {
        Ok(table) => HttpResponse::Ok().json(ApiCentrality {
            treatment: treatment.value(),
            column: treatment.column_name(),
            intersections: defined_scores(table, treatment),
        }),
        Err(e) => api_error(&ServerError::from(e)),
    }
}

/// Error handler for query strings that fail to deserialize (e.g. a
/// treatment too large for `u8` or a negative `top`).
///
/// Answers in the same shape as the route would: JSON under `/api`, the
/// error page for `/`, and plain text for the map documents.
pub fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query parameters: {err}");
    log::error!("{message} ({})", req.uri());

    let response = match req.app_data::<web::Data<AppState>>() {
        _ if req.path().starts_with("/api") => {
            HttpResponse::BadRequest().json(ApiError {
                error: message.clone(),
            })
        }
        Some(state) if req.path() == "/" => {
            let page = req
                .query_string()
                .split('&')
                .find_map(|pair| pair.strip_prefix("page="))
                .and_then(|value| value.parse::<Page>().ok())
                .unwrap_or_default();
            HttpResponse::BadRequest()
                .content_type(ContentType::html())
                .body(pages::error_page(&state.config, page, &message))
        }
        _ => HttpResponse::BadRequest()
            .content_type(ContentType::plaintext())
            .body(message.clone()),
    };

    InternalError::from_response(message, response).into()
}

fn render_treatment_page(state: &AppState, params: &PageParams) -> Result<String, ServerError> {
    let controls = Controls::from_params(params, &state.config.analysis)?;
    let view = views::treatment_view(&state.cache, &state.config.analysis, &controls)?;
    let map_html = view.document.to_html()?;
    Ok(pages::treatment_page(
        &state.config,
        &controls,
        &map_html,
        &view.reports,
    ))
}

fn render_centrality_page(state: &AppState, params: &PageParams) -> Result<String, ServerError> {
    let controls = Controls::from_params(params, &state.config.analysis)?;
    let map_html = views::centrality_view(&state.cache, controls.treatment)?.to_html()?;
    Ok(pages::centrality_page(
        &state.config,
        controls.treatment,
        &map_html,
    ))
}

fn html_response(html: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html)
}

fn map_response(result: Result<String, ServerError>) -> HttpResponse {
    match result {
        Ok(html) => html_response(html),
        Err(e) => {
            log::error!("Failed to render map: {e}");
            HttpResponse::build(e.status())
                .content_type(ContentType::plaintext())
                .body(e.to_string())
        }
    }
}

fn api_error(e: &ServerError) -> HttpResponse {
    log::error!("API request failed: {e}");
    HttpResponse::build(e.status()).json(ApiError {
        error: e.to_string(),
    })
}
