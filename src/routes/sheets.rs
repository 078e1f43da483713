//! Raw spreadsheet passthrough

use axum::{extract::State, Json};

use crate::error::Result;
use crate::sheets::SheetValues;
use crate::AppState;

/// Raw grids of the three pricing tabs, as last fetched
pub async fn raw_values(State(state): State<AppState>) -> Result<Json<SheetValues>> {
    let values = state.sheet_values().await?;
    Ok(Json(SheetValues::clone(&values)))
}
