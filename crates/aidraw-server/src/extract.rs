use axum::{
    Json,
    body::Body,
    extract::{FromRequest, FromRequestParts, Path},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::Failure;

/// JSON body extractor that rejects in the `{success:false,error}` shape
pub(crate) struct ApiJson<T>(pub T);

impl<S, T: DeserializeOwned> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: http::Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(body)) => Ok(Self(body)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "rejected request body");
                Err((rejection.status(), Failure::new(rejection.body_text())).into_response())
            }
        }
    }
}

/// Path parameter extractor with the same rejection shape
pub(crate) struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err((rejection.status(), Failure::new(rejection.body_text())).into_response()),
        }
    }
}
