use crate::configuration::AdminConfig;
use crate::constants::ADMIN_KEY_HEADER;
use crate::errors::GenericError;
use crate::utils::get_header_value;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error};
use futures::future::LocalBoxFuture;
use secrecy::ExposeSecret;
use std::future::{ready, Ready};
use std::rc::Rc;

// Middleware comparing the admin key header against the configured key
pub struct AdminKeyMiddleware<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AdminKeyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<actix_web::body::BoxBody>, Error = Error>
        + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let provided_key = get_header_value(&req, ADMIN_KEY_HEADER);
        let admin_config = req.app_data::<web::Data<AdminConfig>>();

        let error_message = match (admin_config, provided_key) {
            (None, _) => Some("Admin access is not configured".to_string()),
            (Some(_), None) => Some(format!("{} is missing", ADMIN_KEY_HEADER)),
            (Some(config), Some(key)) => {
                let expected = config.api_key.expose_secret();
                if expected.is_empty() || expected != key {
                    Some("Invalid admin key".to_string())
                } else {
                    None
                }
            }
        };

        if let Some(message) = error_message {
            tracing::warn!(path = %req.path(), "rejected admin request: {}", message);
            let (request, _pl) = req.into_parts();
            let json_error = GenericError::InsufficientPrivilegeError(message);
            return Box::pin(async { Ok(ServiceResponse::from_err(json_error, request)) });
        }

        let srv = Rc::clone(&self.service);
        Box::pin(async move {
            let res = srv.call(req).await?;
            Ok(res)
        })
    }
}

/// Middleware factory for admin only routes.
pub struct RequireAdmin;

impl<S> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<actix_web::body::BoxBody>, Error = Error>
        + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = AdminKeyMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminKeyMiddleware {
            service: Rc::new(service),
        }))
    }
}
