//! RPC Error Types
//!
//! Maps broker errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use keyq_core::error::AppError;
use serde_json::json;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_EXISTS: i32 = 4001;
    pub const ALREADY_EXISTS: i32 = 4002;
    pub const EMPTY: i32 = 4004;
    pub const NONE_FOUND: i32 = 4005;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const STORAGE_ERROR: i32 = 5001;
}

/// Convert AppError to JSON-RPC ErrorObject
///
/// The error kind travels in `data` so clients need not parse messages.
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let code = match &err {
        AppError::InvalidName(_) => code::VALIDATION_ERROR,
        AppError::NotExists(_) => code::NOT_EXISTS,
        AppError::AlreadyExists(_) => code::ALREADY_EXISTS,
        AppError::Empty(_) => code::EMPTY,
        AppError::NoneFound => code::NONE_FOUND,
        AppError::Storage(_) => code::STORAGE_ERROR,
        AppError::Config(_) | AppError::Internal(_) => code::INTERNAL_ERROR,
    };

    ErrorObjectOwned::owned(code, err.to_string(), Some(json!({ "kind": err.kind() })))
}
