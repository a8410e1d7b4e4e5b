//! Session type catalogue

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionType {
    pub id: i32,
    pub slug: String,
    pub name: String,
    /// Full price in major currency units
    pub price: i64,
    pub deposit_percent: i32,
    pub duration_minutes: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl SessionType {
    /// Deposit in major units, rounded half up
    pub fn deposit_amount(&self) -> i64 {
        (self.price * i64::from(self.deposit_percent) + 50) / 100
    }
}
