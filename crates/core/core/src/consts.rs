//! Platform constants shared across the SDK.

/// Default lifetime of an access token in seconds (two hours).
pub const TOKEN_EXPIRE_SECS: u64 = 7200;

/// Seconds before the declared expiry at which a token is treated as expired.
pub const UPDATE_MARGIN_SECS: u64 = 600;

/// Default base URL for the open platform.
pub const DEFAULT_ENDPOINT: &str = "https://open.feishu.cn/open-apis";

/// Default overall request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

/// Environment variable names.
pub mod env {
    pub const APP_ID: &str = "APP_ID";
    pub const APP_SECRET: &str = "APP_SECRET";
    pub const VERIFY_TOKEN: &str = "FEISHU_VERIFY_TOKEN";
    pub const ENCRYPT_KEY: &str = "FEISHU_ENCRYPT_KEY";
}

/// Token endpoint paths, relative to the endpoint.
pub mod paths {
    pub const TENANT_ACCESS_TOKEN: &str = "/auth/v3/tenant_access_token/internal/";
    pub const APP_ACCESS_TOKEN: &str = "/auth/v3/app_access_token/internal/";
}

/// Inbound webhook header names.
pub mod headers {
    pub const REQUEST_TIMESTAMP: &str = "X-Lark-Request-Timestamp";
    pub const REQUEST_NONCE: &str = "X-Lark-Request-Nonce";
    pub const SIGNATURE: &str = "X-Lark-Signature";
    pub const REFRESH_TOKEN: &str = "X-Refresh-Token";
}
