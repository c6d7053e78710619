use crate::utils::fmt_json;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use utoipa::ToSchema;

macro_rules! impl_serialize_format {
    ($struct_name:ident, $trait_name:path) => {
        impl<D: Serialize> $trait_name for $struct_name<D> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt_json(self, f)
            }
        }
    };
}

/// Envelope shared by every JSON endpoint.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct GenericResponse<D> {
    pub status: bool,
    pub customer_message: String,
    pub code: String,
    pub data: Option<D>,
}

impl_serialize_format!(GenericResponse, Display);

impl<D> GenericResponse<D> {
    pub fn success(message: &str, data: Option<D>) -> Self {
        Self {
            status: true,
            customer_message: String::from(message),
            code: String::from("200"),
            data,
        }
    }

    pub fn error(message: &str, code: &str, data: Option<D>) -> Self {
        Self {
            status: false,
            customer_message: String::from(message),
            code: String::from(code),
            data,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct OkData {
    pub ok: bool,
}

impl OkData {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkData {
    fn default() -> Self {
        Self::new()
    }
}

/// Implements `FromRequest` for a JSON body, turning payload errors into
/// `GenericError::ValidationError` and running `validator` rules.
#[macro_export]
macro_rules! impl_json_request {
    ($struct_name:ident) => {
        impl actix_web::FromRequest for $struct_name {
            type Error = $crate::errors::GenericError;
            type Future = futures::future::LocalBoxFuture<'static, Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                let fut = <actix_web::web::Json<Self> as actix_web::FromRequest>::from_request(
                    req, payload,
                );

                Box::pin(async move {
                    match fut.await {
                        Ok(json) => {
                            let body = json.into_inner();
                            validator::Validate::validate(&body).map_err(|e| {
                                $crate::errors::GenericError::ValidationError(
                                    $crate::errors::format_validation_errors(&e),
                                )
                            })?;
                            Ok(body)
                        }
                        Err(e) => Err($crate::errors::GenericError::ValidationError(e.to_string())),
                    }
                })
            }
        }
    };
}
