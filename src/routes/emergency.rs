use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use crate::models::{Coordinate, CreateEmergencyRequest, CreateEmergencyResponse, MatchResult, Role};
use crate::routes::{authorize, error_response, parse_json, AppState};
use crate::services::format_emergency_alert;

const DEFAULT_HOSPITAL_NAME: &str = "BloodLink partner hospital";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/emergency/create", web::post().to(create_emergency));
}

/// Raise an emergency and alert nearby donors
///
/// POST /emergency/create
///
/// Request body:
/// ```json
/// {
///   "blood_group": "O-",
///   "units_required": 3,
///   "latitude": 12.97,
///   "longitude": 77.59,
///   "hospital_name": "City Hospital"
/// }
/// ```
async fn create_emergency(
    state: web::Data<AppState>,
    body: web::Bytes,
    http_req: HttpRequest,
) -> impl Responder {
    let caller = match authorize(&http_req, &state, &[Role::Admin, Role::Hospital]) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let req: CreateEmergencyRequest = match parse_json(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let emergency_id = match state.store.create_emergency_request(caller.user_id, &req).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to store emergency from {}: {}", caller.user_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create emergency",
                e.to_string(),
            );
        }
    };

    tracing::info!(
        "Emergency {} raised by {} ({}) for {}",
        emergency_id,
        caller.user_id,
        caller.role,
        req.blood_group
    );

    let origin = Coordinate::new(req.latitude, req.longitude);
    let matched_donors = match state
        .matcher
        .find_matching_donors(state.registry.as_ref(), &req.blood_group, origin)
        .await
    {
        Ok(donors) => donors,
        Err(e) => {
            tracing::error!("Donor matching failed for emergency {}: {}", emergency_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to match donors",
                e.to_string(),
            );
        }
    };

    notify_donors(&state, &req, &matched_donors).await;

    tracing::info!("Emergency {} notified {} donors", emergency_id, matched_donors.len());

    HttpResponse::Ok().json(CreateEmergencyResponse {
        message: "Emergency created and donors notified".to_string(),
        emergency_id,
        matched_donors_count: matched_donors.len(),
    })
}

/// Best-effort fan-out; a failed delivery is logged and skipped
async fn notify_donors(state: &AppState, req: &CreateEmergencyRequest, donors: &[MatchResult]) {
    let message = format!("Emergency! {} blood needed urgently.", req.blood_group);
    let hospital_name = req.hospital_name.as_deref().unwrap_or(DEFAULT_HOSPITAL_NAME);

    for donor in donors {
        if let Err(e) = state.dispatcher.notify_user(donor.id, &message).await {
            tracing::warn!("In-app notification to donor {} failed: {}", donor.id, e);
        }

        let Some(phone) = donor.phone.as_deref() else {
            tracing::debug!("Donor {} has no phone, skipping WhatsApp", donor.id);
            continue;
        };

        let alert = format_emergency_alert(&donor.name, &req.blood_group, hospital_name, donor.distance_km);
        if let Err(e) = state.dispatcher.send_whatsapp(phone, &alert).await {
            tracing::warn!("WhatsApp alert to donor {} failed: {}", donor.id, e);
        }
    }
}
