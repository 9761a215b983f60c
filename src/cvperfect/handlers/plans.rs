use crate::billing::{self, Plan};
use axum::response::Json;

#[utoipa::path(
    get,
    path= "/api/billing/plans",
    responses (
        (status = 200, description = "Plan catalog for the billing page", body = [Plan]),
        (status = 307, description = "Not signed in, redirected to the sign-in page"),
    ),
    tag= "billing"
)]
pub async fn plans() -> Json<Vec<Plan>> {
    Json(billing::catalog())
}
