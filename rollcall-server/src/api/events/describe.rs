use axum::Json;
use rollcall_core::description::{DescriptionInput, generate_description as fill_template};
use rollcall_sdk::objects::{GenerateDescriptionRequest, GenerateDescriptionResponse};

use crate::api::extractors::AuthUser;

/// `POST /generate-description`: a canned paragraph built from whatever
/// form fields the caller has filled in so far.
pub(super) async fn generate_description(
    _user: AuthUser,
    Json(payload): Json<GenerateDescriptionRequest>,
) -> Json<GenerateDescriptionResponse> {
    let description = fill_template(DescriptionInput {
        title: payload.title.as_deref(),
        date: payload.date,
        location: payload.location.as_deref(),
        capacity: payload.capacity,
    });
    Json(GenerateDescriptionResponse { description })
}
