//! HTTP handler functions for the `GeoSpy` API.

use actix_web::{HttpResponse, web};
use base64::Engine as _;
use chrono::Utc;
use geospy_ai::image::ImageSource;
use geospy_ai::{LocateRequest, locate_classified};
use geospy_pipeline::export::to_feature_collection;
use geospy_pipeline::{AnalysisOutcome, analyze};
use geospy_server_models::{
    ApiHealth, GeoJsonRequest, ImagePayload, LocateRequestBody, LocateResponse, ReportRequest,
    ReportResponse,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.provider.as_ref().map(|p| p.name()),
    })
}

/// `POST /api/report`
///
/// Runs the pipeline on a raw result supplied by the caller.
pub async fn report(state: web::Data<AppState>, body: web::Json<ReportRequest>) -> HttpResponse {
    let ReportRequest { result, session } = body.into_inner();

    let outcome = analyze(&result, &state.config);
    let session = session
        .unwrap_or_default()
        .record(result, None, Utc::now());

    HttpResponse::Ok().json(ReportResponse { session, outcome })
}

/// `POST /api/report/geojson`
///
/// Returns the map as a `GeoJSON` feature collection, or `204 No Content`
/// when there is nothing to draw.
pub async fn report_geojson(
    state: web::Data<AppState>,
    body: web::Json<GeoJsonRequest>,
) -> HttpResponse {
    match analyze(&body.result, &state.config) {
        AnalysisOutcome::Located(report) => match &report.map {
            Some(map) => HttpResponse::Ok().json(to_feature_collection(map)),
            None => HttpResponse::NoContent().finish(),
        },
        AnalysisOutcome::Failed { .. } | AnalysisOutcome::NoLocations { .. } => {
            HttpResponse::NoContent().finish()
        }
    }
}

/// `POST /api/locate`
///
/// Loads the image, asks the provider where it was taken, and runs the
/// pipeline on the reply. Upstream failures are classified and reported in
/// the outcome rather than as an HTTP error.
pub async fn locate(
    state: web::Data<AppState>,
    body: web::Json<LocateRequestBody>,
) -> HttpResponse {
    let Some(provider) = state.provider.clone() else {
        return HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "error": "No AI provider configured. Set GEMINI_API_KEY or OPENAI_API_KEY."
        }));
    };

    let LocateRequestBody {
        image,
        context_info,
        location_guess,
        session,
    } = body.into_inner();

    let source = match image_source(image) {
        Ok(source) => source,
        Err(message) => {
            log::warn!("Rejected upload: {message}");
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": message }));
        }
    };

    let image = match source.load(&state.http).await {
        Ok(image) => image,
        Err(e) => {
            log::warn!("Failed to load image {}: {e}", source.describe());
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Failed to load image: {e}")
            }));
        }
    };

    let request = LocateRequest::new(image, context_info, location_guess);

    let (result, failure) = locate_classified(provider.as_ref(), &request).await;

    let outcome = analyze(&result, &state.config);
    let session = session
        .unwrap_or_default()
        .record(result, Some(source.describe()), Utc::now());

    HttpResponse::Ok().json(LocateResponse {
        session,
        outcome,
        failure,
    })
}

/// Converts the request payload into an image source. Uploads may be plain
/// base64 or a `data:` URL.
fn image_source(payload: ImagePayload) -> Result<ImageSource, String> {
    match payload {
        ImagePayload::Url { url } => {
            let source = ImageSource::parse(&url);
            if matches!(source, ImageSource::Url(_)) {
                Ok(source)
            } else {
                Err(format!("{url} is not an http(s) URL"))
            }
        }
        ImagePayload::Upload { filename, data } => {
            let encoded = data
                .split_once(";base64,")
                .map_or(data.as_str(), |(_, encoded)| encoded);
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| format!("{filename}: invalid base64 data ({e})"))?;
            Ok(ImageSource::Upload { filename, bytes })
        }
    }
}
