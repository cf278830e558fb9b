use serde::{Deserialize, Serialize};

pub const VERIFY_CODE_PATH: &str = "auth/2fa/verify";
pub const RESEND_CODE_PATH: &str = "auth/2fa/resend";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendCodeRequest {
    /// Where the previous code was delivered, as shown to the user.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub destination: String,
}
