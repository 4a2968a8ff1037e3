use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters for the match preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PreviewMatchesQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u16>,
}
