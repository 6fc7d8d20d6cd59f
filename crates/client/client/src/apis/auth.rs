use crate::client::Shared;
use crate::mode::ExecutionMode;
use crate::token::{TokenGrant, TokenKind, token_request};

/// Token endpoints.
///
/// These always ask the platform for a new token and bypass the client's
/// cache; use `FeishuClient::token` for the cached one.
#[derive(Clone)]
pub struct AuthApi<M> {
    shared: Shared<M>,
}

impl<M: ExecutionMode> AuthApi<M> {
    pub(crate) fn new(shared: Shared<M>) -> Self {
        Self { shared }
    }

    /// Issues a tenant access token for a self-built app.
    pub fn tenant_access_token(&self) -> M::Output<TokenGrant> {
        self.grant(TokenKind::Tenant)
    }

    /// Issues an app access token for a self-built app.
    pub fn app_access_token(&self) -> M::Output<TokenGrant> {
        self.grant(TokenKind::App)
    }

    fn grant(&self, kind: TokenKind) -> M::Output<TokenGrant> {
        self.shared.call(move |core| async move {
            let config = core.config();
            let request = token_request(kind, &config.app_id, &config.app_secret);
            let data = core.request(request).await?;
            TokenGrant::from_response(kind, &data)
        })
    }
}
