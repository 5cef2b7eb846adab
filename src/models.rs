use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Wille")]
    pub first_name: String,
    #[schema(example = "Svensson")]
    pub last_name: String,
    pub password: String,
    /// Tenant key handed out by the admin; must match an existing admin.
    #[schema(example = "AC1")]
    pub admin_code: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "Wille")]
    pub first_name: String,
    #[schema(example = "Svensson")]
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Full name, for log lines only
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Tenant key: own code for admins, owning admin's code for workers
    pub admin_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
