//! Application harness wiring the real services and handlers over the
//! in-memory adapters, behind the same session middleware as production.

use std::sync::Arc;

use actix_http::Request;
use actix_session::config::CookieContentSecurity;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error, test, web};

use backend::domain::ports::DisabledIdentityVerifier;
use backend::domain::{
    AuthService, CollaborationPolicy, InviteService, ProjectService, TaskService,
};
use backend::inbound::http::auth::{login, logout, me, register, token};
use backend::inbound::http::invites::{list_invites, respond_invite, send_invite};
use backend::inbound::http::projects::{
    create_project as create_project_route, delete_project, get_project, list_projects,
    update_project,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::tasks::{
    add_comment, assigned_tasks, create_task, delete_task, get_task, list_project_tasks,
    update_task, update_task_status,
};
use backend::middleware::Trace;
use backend::outbound::security::Argon2PasswordHasher;

use super::memory::{InMemoryInvites, InMemoryProjects, InMemoryTasks, InMemoryUsers};

fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .cookie_content_security(CookieContentSecurity::Private)
        .build()
}

fn build_state(policy: CollaborationPolicy) -> web::Data<HttpState> {
    let users = Arc::new(InMemoryUsers::default());
    let projects = Arc::new(InMemoryProjects::default());
    let invites = Arc::new(InMemoryInvites::default());
    let tasks = Arc::new(InMemoryTasks::default());

    let auth = AuthService::new(
        Arc::clone(&users),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(DisabledIdentityVerifier),
    );
    let project_ops = ProjectService::new(
        Arc::clone(&projects),
        Arc::clone(&tasks),
        Arc::clone(&users),
        policy,
    );
    let task_ops = TaskService::new(
        Arc::clone(&tasks),
        Arc::clone(&projects),
        Arc::clone(&users),
        policy,
    );
    let invite_ops = InviteService::new(invites, projects, users, policy);

    web::Data::new(HttpState::new(
        Arc::new(auth),
        Arc::new(project_ops),
        Arc::new(task_ops),
        Arc::new(invite_ops),
    ))
}

/// Spin up the full application with the default collaboration policy.
pub async fn spawn_app() -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    spawn_app_with_policy(CollaborationPolicy::default()).await
}

/// Spin up the full application with an explicit collaboration policy.
pub async fn spawn_app_with_policy(
    policy: CollaborationPolicy,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    let state = build_state(policy);
    test::init_service(
        App::new().app_data(state).wrap(Trace).service(
            web::scope("/api/v1")
                .wrap(session_middleware())
                .service(register)
                .service(login)
                .service(token)
                .service(logout)
                .service(me)
                .service(create_project_route)
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
                .service(respond_invite),
        ),
    )
    .await
}

/// Extract the session cookie the response set.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("response sets a session cookie")
        .into_owned()
}

/// Register a user and return their profile plus an authenticated cookie.
pub async fn register_user(
    app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
    name: &str,
    email: &str,
) -> (serde_json::Value, Cookie<'static>) {
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(serde_json::json!({
            "name": name,
            "email": email,
            "password": "correct-horse-battery",
        }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED, "registration succeeds");
    let cookie = session_cookie(&res);
    let profile: serde_json::Value = test::read_body_json(res).await;
    (profile, cookie)
}

/// Create a minimal project and return its id.
pub async fn create_project(
    app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
    cookie: &Cookie<'static>,
    title: &str,
) -> String {
    let res = post_json(
        app,
        "/api/v1/projects",
        cookie,
        serde_json::json!({"title": title}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED, "project creation succeeds");
    let project: serde_json::Value = test::read_body_json(res).await;
    project["id"].as_str().expect("project id").to_owned()
}

/// GET with the given session cookie.
pub async fn get(
    app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
    uri: &str,
    cookie: &Cookie<'static>,
) -> ServiceResponse {
    let req = test::TestRequest::get()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request();
    test::call_service(app, req).await
}

/// POST a JSON body with the given session cookie.
pub async fn post_json(
    app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
    uri: &str,
    cookie: &Cookie<'static>,
    body: serde_json::Value,
) -> ServiceResponse {
    let req = test::TestRequest::post()
        .uri(uri)
        .cookie(cookie.clone())
        .set_json(body)
        .to_request();
    test::call_service(app, req).await
}

/// PATCH a JSON body with the given session cookie.
pub async fn patch_json(
    app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
    uri: &str,
    cookie: &Cookie<'static>,
    body: serde_json::Value,
) -> ServiceResponse {
    let req = test::TestRequest::patch()
        .uri(uri)
        .cookie(cookie.clone())
        .set_json(body)
        .to_request();
    test::call_service(app, req).await
}

/// PUT a JSON body with the given session cookie.
pub async fn put_json(
    app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
    uri: &str,
    cookie: &Cookie<'static>,
    body: serde_json::Value,
) -> ServiceResponse {
    let req = test::TestRequest::put()
        .uri(uri)
        .cookie(cookie.clone())
        .set_json(body)
        .to_request();
    test::call_service(app, req).await
}

/// DELETE with the given session cookie.
pub async fn delete(
    app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
    uri: &str,
    cookie: &Cookie<'static>,
) -> ServiceResponse {
    let req = test::TestRequest::delete()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request();
    test::call_service(app, req).await
}
