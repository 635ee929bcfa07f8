//! HTTP server assembly: session middleware, route registration, startup.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::auth::{login, logout, me, register, token};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::invites::{list_invites, respond_invite, send_invite};
use crate::inbound::http::projects::{
    create_project, delete_project, get_project, list_projects, update_project,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tasks::{
    add_comment, assigned_tasks, create_task, delete_task, get_task, list_project_tasks,
    update_task, update_task_status,
};
use crate::middleware::Trace;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_TTL_HOURS: i64 = 2;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn session_layer(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(CookieDuration::hours(SESSION_TTL_HOURS)),
        )
        .build()
}

/// Every authenticated route, mounted under `/api/v1` behind the session.
fn api_scope(
    session: SessionMiddleware<CookieSessionStore>,
) -> impl actix_web::dev::HttpServiceFactory {
    web::scope("/api/v1")
        .wrap(session)
        .service(register)
        .service(login)
        .service(token)
        .service(logout)
        .service(me)
        .service(create_project)
        .service(list_projects)
        .service(get_project)
        .service(update_project)
        .service(delete_project)
        .service(create_task)
        .service(list_project_tasks)
        .service(assigned_tasks)
        .service(get_task)
        .service(update_task)
        .service(update_task_status)
        .service(delete_task)
        .service(add_comment)
        .service(send_invite)
        .service(list_invites)
        .service(respond_invite)
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = session_layer(deps.key, deps.cookie_secure, deps.same_site);

    let app = App::new()
        .app_data(deps.health_state)
        .app_data(deps.http_state)
        .wrap(Trace)
        .service(api_scope(session))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Bind the HTTP server and flip readiness once the socket is held.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let bind_addr = config.bind_addr();
    let factory_health = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: factory_health.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
