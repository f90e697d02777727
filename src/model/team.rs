use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Team {
    #[schema(example = 3)]
    pub id: u64,

    #[schema(example = "Night Shift")]
    pub name: String,
}
