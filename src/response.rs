//! Standard response envelope: `{ "code", "message", "data" }`, always delivered with HTTP 200.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Business status codes. The numbers are part of the public contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BizCode {
    Success = 0,

    // common (100-199)
    CommonError = 100,
    ParamsError = 101,
    ResourceNotFound = 102,
    DatabaseError = 103,
    PermissionDenied = 104,

    // authentication (200-299)
    AuthError = 200,
    AccountExists = 201,
    AccountNotFound = 202,
    PasswordError = 203,
    TokenInvalid = 204,
    TokenExpired = 205,

    // user state (300-399)
    UserDisabled = 300,
    UserProfileIncomplete = 301,

    // business rules (400-499)
    OperationNotAllowed = 400,
    RateLimitExceeded = 401,
}

impl BizCode {
    pub const ALL: [BizCode; 16] = [
        BizCode::Success,
        BizCode::CommonError,
        BizCode::ParamsError,
        BizCode::ResourceNotFound,
        BizCode::DatabaseError,
        BizCode::PermissionDenied,
        BizCode::AuthError,
        BizCode::AccountExists,
        BizCode::AccountNotFound,
        BizCode::PasswordError,
        BizCode::TokenInvalid,
        BizCode::TokenExpired,
        BizCode::UserDisabled,
        BizCode::UserProfileIncomplete,
        BizCode::OperationNotAllowed,
        BizCode::RateLimitExceeded,
    ];

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_u16() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            BizCode::Success => "SUCCESS",
            BizCode::CommonError => "COMMON_ERROR",
            BizCode::ParamsError => "PARAMS_ERROR",
            BizCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            BizCode::DatabaseError => "DATABASE_ERROR",
            BizCode::PermissionDenied => "PERMISSION_DENIED",
            BizCode::AuthError => "AUTH_ERROR",
            BizCode::AccountExists => "ACCOUNT_EXISTS",
            BizCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            BizCode::PasswordError => "PASSWORD_ERROR",
            BizCode::TokenInvalid => "TOKEN_INVALID",
            BizCode::TokenExpired => "TOKEN_EXPIRED",
            BizCode::UserDisabled => "USER_DISABLED",
            BizCode::UserProfileIncomplete => "USER_PROFILE_INCOMPLETE",
            BizCode::OperationNotAllowed => "OPERATION_NOT_ALLOWED",
            BizCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }
}

impl Serialize for BizCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

impl<'de> Deserialize<'de> for BizCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = u16::deserialize(deserializer)?;
        BizCode::from_u16(n).ok_or_else(|| serde::de::Error::custom(format!("unknown business code {}", n)))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub code: BizCode,
    pub message: String,
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(data: impl Into<Option<Value>>) -> Self {
        Self::success_with(data, "success")
    }

    pub fn success_with(data: impl Into<Option<Value>>, message: impl Into<String>) -> Self {
        ResponseEnvelope {
            code: BizCode::Success,
            message: message.into(),
            data: data.into(),
        }
    }

    pub fn error(code: BizCode, message: impl Into<String>) -> Self {
        Self::error_with(code, message, None)
    }

    pub fn error_with(code: BizCode, message: impl Into<String>, data: Option<Value>) -> Self {
        ResponseEnvelope {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == BizCode::Success
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codes_match_contract() {
        let expected: [(BizCode, u16); 16] = [
            (BizCode::Success, 0),
            (BizCode::CommonError, 100),
            (BizCode::ParamsError, 101),
            (BizCode::ResourceNotFound, 102),
            (BizCode::DatabaseError, 103),
            (BizCode::PermissionDenied, 104),
            (BizCode::AuthError, 200),
            (BizCode::AccountExists, 201),
            (BizCode::AccountNotFound, 202),
            (BizCode::PasswordError, 203),
            (BizCode::TokenInvalid, 204),
            (BizCode::TokenExpired, 205),
            (BizCode::UserDisabled, 300),
            (BizCode::UserProfileIncomplete, 301),
            (BizCode::OperationNotAllowed, 400),
            (BizCode::RateLimitExceeded, 401),
        ];
        for (code, n) in expected {
            assert_eq!(code.as_u16(), n, "{}", code.name());
            assert_eq!(BizCode::from_u16(n), Some(code));
        }
        assert_eq!(BizCode::from_u16(999), None);
    }

    #[test]
    fn success_serializes_with_zero_code() {
        let env = ResponseEnvelope::success(json!({ "id": 1 }));
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({ "code": 0, "message": "success", "data": { "id": 1 } })
        );
    }

    #[test]
    fn error_without_data_serializes_null() {
        let env = ResponseEnvelope::error(BizCode::AccountExists, "account already exists");
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({ "code": 201, "message": "account already exists", "data": null })
        );
    }

    #[test]
    fn business_errors_still_use_http_ok() {
        let resp = ResponseEnvelope::error(BizCode::PasswordError, "wrong password").into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
