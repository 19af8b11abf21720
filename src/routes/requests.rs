use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use crate::models::{Coordinate, CreateBloodRequest, CreateRequestResponse, Role};
use crate::routes::{authorize, error_response, parse_json, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/requests/create", web::post().to(create_blood_request));
}

/// Create a patient blood request
///
/// POST /requests/create
///
/// Request body:
/// ```json
/// {
///   "blood_group": "B+",
///   "units_required": 2,
///   "request_type": "immediate|scheduled",
///   "scheduled_date": "2026-11-02",
///   "latitude": 19.07,
///   "longitude": 72.87
/// }
/// ```
///
/// The request is stored first; the matched donors are returned to the
/// patient but not notified.
async fn create_blood_request(
    state: web::Data<AppState>,
    body: web::Bytes,
    http_req: HttpRequest,
) -> impl Responder {
    let caller = match authorize(&http_req, &state, &[Role::Patient]) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let req: CreateBloodRequest = match parse_json(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    tracing::info!(
        "Patient {} requesting {} unit(s) of {}",
        caller.user_id,
        req.units_required,
        req.blood_group
    );

    let request_id = match state.store.create_patient_request(caller.user_id, &req).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to store request for patient {}: {}", caller.user_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create request",
                e.to_string(),
            );
        }
    };

    let origin = Coordinate::new(req.latitude, req.longitude);
    let matched_donors = match state
        .matcher
        .find_matching_donors(state.registry.as_ref(), &req.blood_group, origin)
        .await
    {
        Ok(donors) => donors,
        Err(e) => {
            tracing::error!("Donor matching failed for request {}: {}", request_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to match donors",
                e.to_string(),
            );
        }
    };

    tracing::info!("Request {} matched {} donors", request_id, matched_donors.len());

    HttpResponse::Ok().json(CreateRequestResponse {
        message: "Blood request created successfully".to_string(),
        request_id,
        matched_donors,
    })
}
