//! Bearer token extraction.
//!
//! Resolves the `Authorization` header into a [`Caller`] so handlers only
//! build a [`RequestContext`](crate::domain::RequestContext). A request
//! without the header is anonymous; a header that does not verify is
//! rejected with `401 Unauthorized`.

use std::future::{Ready, ready};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use tracing::warn;

use crate::domain::ports::{TokenError, TokenVerifier};
use crate::domain::{Caller, Error};

const BEARER_PREFIX: &str = "Bearer ";

/// Resolve the caller from the request's bearer token.
pub fn caller_from_request(
    req: &HttpRequest,
    verifier: &dyn TokenVerifier,
) -> Result<Caller, Error> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(Caller::Anonymous);
    };
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;

    match verifier.verify(token) {
        Ok(username) => Ok(Caller::Authenticated(username)),
        Err(TokenError::Expired) => Err(Error::unauthorized("token expired")),
        Err(err) => {
            warn!(error = %err, "bearer token rejected");
            Err(Error::unauthorized("invalid token"))
        }
    }
}

/// Extractor wrapping the resolved [`Caller`].
///
/// Requires a `web::Data<dyn TokenVerifier>` registered as app data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerCaller(pub Caller);

impl FromRequest for BearerCaller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<dyn TokenVerifier>>() {
            Some(verifier) => caller_from_request(req, verifier.get_ref()).map(BearerCaller),
            None => Err(Error::internal("token verifier not configured")),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::MockTokenVerifier;
    use crate::domain::{ErrorCode, Username};
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn verifier() -> MockTokenVerifier {
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().returning(|token| match token {
            "good" => Ok(Username::new("frank").expect("username")),
            "old" => Err(TokenError::expired()),
            _ => Err(TokenError::invalid("bad signature")),
        });
        verifier
    }

    fn request(authorization: Option<&str>) -> HttpRequest {
        let mut request = TestRequest::default();
        if let Some(value) = authorization {
            request = request.insert_header((AUTHORIZATION, value));
        }
        request.to_http_request()
    }

    #[rstest]
    fn missing_header_is_anonymous() {
        let caller = caller_from_request(&request(None), &verifier()).expect("anonymous");
        assert_eq!(caller, Caller::Anonymous);
    }

    #[rstest]
    fn verified_tokens_name_the_caller() {
        let caller =
            caller_from_request(&request(Some("Bearer good")), &verifier()).expect("verified");
        assert_eq!(caller.authenticated().map(|u| u.as_ref()), Some("frank"));
    }

    #[rstest]
    #[case::wrong_scheme("Basic Zm9vOmJhcg==", "malformed authorization header")]
    #[case::empty_token("Bearer ", "malformed authorization header")]
    #[case::expired("Bearer old", "token expired")]
    #[case::tampered("Bearer forged", "invalid token")]
    fn unusable_headers_are_unauthorized(#[case] header: &str, #[case] message: &str) {
        let err = caller_from_request(&request(Some(header)), &verifier()).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), message);
    }

    #[rstest]
    #[actix_web::test]
    async fn extractor_reads_the_registered_verifier() {
        let verifier: Arc<dyn TokenVerifier> = Arc::new(verifier());
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer good"))
            .app_data(web::Data::from(verifier))
            .to_http_request();

        let BearerCaller(caller) = BearerCaller::extract(&req).await.expect("caller");
        assert!(caller.authenticated().is_some());
    }

    #[rstest]
    #[actix_web::test]
    async fn extractor_without_verifier_is_an_internal_error() {
        let req = request(Some("Bearer good"));
        let err = BearerCaller::extract(&req).await.expect_err("no verifier");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
