use axum::{
    extract::{FromRequest, FromRequestParts, Json, OptionalFromRequestParts, Query},
    http::{HeaderMap, request::Parts},
};
use std::convert::Infallible;

use crate::{api::error::ApiError, model::MiniUser};

/// Header carrying the authenticated user as JSON, set by the auth proxy in front of the API.
pub const LOGGEDIN_USER_HEADER: &str = "x-loggedin-user";

/// JSON request body whose rejection is answered with the `{ err }` envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string whose rejection is answered with the `{ err }` envelope.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// The user making the request.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedinUser(pub MiniUser);

impl LoggedinUser {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(LOGGEDIN_USER_HEADER)?;
        let user: MiniUser = serde_json::from_slice(raw.as_bytes()).ok()?;

        (!user.id.is_empty()).then_some(Self(user))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for LoggedinUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).ok_or(ApiError::Unauthorized)
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for LoggedinUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(LOGGEDIN_USER_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn decodes_user_header() {
        let user = LoggedinUser::from_headers(&headers(r#"{"_id":"u1","fullname":"Dana","imgUrl":"d.png"}"#)).unwrap();

        assert_eq!(user.0.id, "u1");
        assert_eq!(user.0.img_url.as_deref(), Some("d.png"));
    }

    #[test]
    fn decodes_utf8_user_header() {
        let mut headers = HeaderMap::new();
        let raw = r#"{"_id":"u1","fullname":"José Zoë"}"#;
        headers.insert(LOGGEDIN_USER_HEADER, HeaderValue::from_bytes(raw.as_bytes()).unwrap());

        let user = LoggedinUser::from_headers(&headers).unwrap();
        assert_eq!(user.0.fullname, "José Zoë");
    }

    #[test]
    fn rejects_missing_or_garbled_header() {
        assert!(LoggedinUser::from_headers(&HeaderMap::new()).is_none());
        assert!(LoggedinUser::from_headers(&headers("not json")).is_none());
        assert!(LoggedinUser::from_headers(&headers(r#"{"_id":""}"#)).is_none());
    }
}
