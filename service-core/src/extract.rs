use crate::error::AppError;
use axum::extract::FromRequest;

/// `axum::Json` whose rejection is reported through [`AppError`], so a
/// malformed body gets the same envelope as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
