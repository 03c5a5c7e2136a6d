use super::error::*;
use super::handler;
use crate::application_port::AuthService;
use crate::domain_model::Principal;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    routes_for(server.auth_service.clone())
}

pub fn routes_for(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let register = warp::post()
        .and(warp::path("register"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(auth_service.clone()))
        .and_then(handler::register);

    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(warp::header::optional::<String>(
            http::header::USER_AGENT.as_ref(),
        ))
        .and(with(auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(auth_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(bearer_token())
        .and(with(auth_service.clone()))
        .and_then(handler::logout);

    let update_user = warp::put()
        .and(warp::path("user"))
        .and(warp::path("update"))
        .and(warp::path::end())
        .and(with_verification(auth_service.clone()))
        .and(warp::body::json())
        .and(with(auth_service.clone()))
        .and_then(handler::update_user);

    let history = warp::get()
        .and(warp::path("user"))
        .and(warp::path("history"))
        .and(warp::path::end())
        .and(with_verification(auth_service.clone()))
        .and(with(auth_service))
        .and_then(handler::login_history);

    register
        .or(login)
        .or(refresh)
        .or(logout)
        .or(update_user)
        .or(history)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn bearer_token() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(
        |header: String| async move {
            match header.strip_prefix("Bearer ") {
                Some(token) if !token.is_empty() => Ok(token.to_string()),
                _ => Err(reject::custom(ApiErrorCode::InvalidToken)),
            }
        },
    )
}

fn with_verification(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (Principal,), Error = warp::Rejection> + Clone {
    bearer_token().and_then(move |token: String| {
        let auth_service = auth_service.clone();
        async move {
            auth_service
                .verify_token(&token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}
