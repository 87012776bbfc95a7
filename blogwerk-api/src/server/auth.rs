use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

#[derive(Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    #[cfg(test)]
    pub fn new(token: String) -> Self {
        Self(token)
    }

    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        let expected = self.0.as_bytes();
        let presented = presented.as_bytes();

        expected.len() == presented.len()
            && expected
                .iter()
                .zip(presented)
                .fold(0, |difference, (a, b)| difference | (a ^ b))
                == 0
    }
}

impl Debug for ApiToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiToken").field(&"[redacted]").finish()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AuthenticatedSession {
    _private: (),
}

impl<S> FromRequestParts<S> for AuthenticatedSession
where
    ApiToken: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            AuthorizationHeader::from_request_parts(parts, state)
                .await
                .map_err(ServerError::InvalidAuthorizationHeader)?;

        if ApiToken::from_ref(state).matches(bearer.token()) {
            Ok(Self { _private: () })
        } else {
            Err(ServerError::InvalidToken)
        }
    }
}
