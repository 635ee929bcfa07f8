//! Invitation workflow: sending, the inbox, and the accept/reject state
//! machine, including the member-invite policy toggle.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use backend::domain::CollaborationPolicy;
use support::harness::{
    create_project, get, post_json, register_user, spawn_app, spawn_app_with_policy,
};

#[actix_web::test]
async fn accepting_an_invite_grants_membership_exactly_once() {
    let app = spawn_app().await;
    let (_, alice) = register_user(&app, "Ada Lovelace", "ada@example.com").await;
    let (bob_profile, bob) = register_user(&app, "Bob Carver", "bob@example.com").await;

    let project_id = create_project(&app, &alice, "Launch").await;
    let invites_uri = format!("/api/v1/projects/{project_id}/invites");

    let res = post_json(&app, &invites_uri, &alice, json!({"email": "bob@example.com"})).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let invite: Value = test::read_body_json(res).await;
    assert_eq!(invite["status"], "pending");
    assert_eq!(invite["receiver"], bob_profile["id"]);
    let invite_id = invite["id"].as_str().expect("invite id").to_owned();

    // The inbox names the sender and the project.
    let res = get(&app, "/api/v1/invites", &bob).await;
    assert_eq!(res.status(), StatusCode::OK);
    let inbox: Vec<Value> = test::read_body_json(res).await;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["sender"]["name"], "Ada Lovelace");
    assert_eq!(inbox[0]["projectTitle"], "Launch");

    let respond_uri = format!("/api/v1/invites/{invite_id}/respond");
    let res = post_json(&app, &respond_uri, &bob, json!({"action": "accept"})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let resolved: Value = test::read_body_json(res).await;
    assert_eq!(resolved["status"], "accepted");

    // Membership is live: the project is now visible to Bob.
    let res = get(&app, &format!("/api/v1/projects/{project_id}"), &bob).await;
    assert_eq!(res.status(), StatusCode::OK);
    let project: Value = test::read_body_json(res).await;
    assert_eq!(project["memberCount"], 2);

    // The state machine only transitions once.
    let res = post_json(&app, &respond_uri, &bob, json!({"action": "accept"})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn rejecting_an_invite_leaves_the_receiver_outside() {
    let app = spawn_app().await;
    let (_, alice) = register_user(&app, "Ada Lovelace", "ada@example.com").await;
    let (_, bob) = register_user(&app, "Bob Carver", "bob@example.com").await;

    let project_id = create_project(&app, &alice, "Launch").await;
    let res = post_json(
        &app,
        &format!("/api/v1/projects/{project_id}/invites"),
        &alice,
        json!({"email": "bob@example.com"}),
    )
    .await;
    let invite: Value = test::read_body_json(res).await;
    let invite_id = invite["id"].as_str().expect("invite id");

    let res = post_json(
        &app,
        &format!("/api/v1/invites/{invite_id}/respond"),
        &bob,
        json!({"action": "reject"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let resolved: Value = test::read_body_json(res).await;
    assert_eq!(resolved["status"], "rejected");

    let res = get(&app, &format!("/api/v1/projects/{project_id}"), &bob).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn only_the_receiver_may_respond() {
    let app = spawn_app().await;
    let (_, alice) = register_user(&app, "Ada Lovelace", "ada@example.com").await;
    let _ = register_user(&app, "Bob Carver", "bob@example.com").await;
    let (_, carol) = register_user(&app, "Carol Danvers", "carol@example.com").await;

    let project_id = create_project(&app, &alice, "Launch").await;
    let res = post_json(
        &app,
        &format!("/api/v1/projects/{project_id}/invites"),
        &alice,
        json!({"email": "bob@example.com"}),
    )
    .await;
    let invite: Value = test::read_body_json(res).await;
    let invite_id = invite["id"].as_str().expect("invite id");

    let res = post_json(
        &app,
        &format!("/api/v1/invites/{invite_id}/respond"),
        &carol,
        json!({"action": "accept"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn duplicate_and_redundant_invites_are_conflicts() {
    let app = spawn_app().await;
    let (_, alice) = register_user(&app, "Ada Lovelace", "ada@example.com").await;
    let (_, bob) = register_user(&app, "Bob Carver", "bob@example.com").await;

    let project_id = create_project(&app, &alice, "Launch").await;
    let invites_uri = format!("/api/v1/projects/{project_id}/invites");

    let res = post_json(&app, &invites_uri, &alice, json!({"email": "bob@example.com"})).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let invite: Value = test::read_body_json(res).await;
    let invite_id = invite["id"].as_str().expect("invite id").to_owned();

    // Pending invite already exists.
    let res = post_json(&app, &invites_uri, &alice, json!({"email": "bob@example.com"})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = post_json(
        &app,
        &format!("/api/v1/invites/{invite_id}/respond"),
        &bob,
        json!({"action": "accept"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Now a collaborator, so a fresh invite is redundant.
    let res = post_json(&app, &invites_uri, &alice, json!({"email": "bob@example.com"})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn inviting_an_unknown_email_is_not_found() {
    let app = spawn_app().await;
    let (_, alice) = register_user(&app, "Ada Lovelace", "ada@example.com").await;
    let project_id = create_project(&app, &alice, "Launch").await;

    let res = post_json(
        &app,
        &format!("/api/v1/projects/{project_id}/invites"),
        &alice,
        json!({"email": "nobody@example.com"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn member_invites_follow_the_policy_flag() {
    // Restricted by default: a plain member may not invite.
    let app = spawn_app().await;
    let (_, alice) = register_user(&app, "Ada Lovelace", "ada@example.com").await;
    let (_, bob) = register_user(&app, "Bob Carver", "bob@example.com").await;
    let _ = register_user(&app, "Carol Danvers", "carol@example.com").await;

    let project_id = create_project(&app, &alice, "Launch").await;
    let invites_uri = format!("/api/v1/projects/{project_id}/invites");
    let res = post_json(&app, &invites_uri, &alice, json!({"email": "bob@example.com"})).await;
    let invite: Value = test::read_body_json(res).await;
    let invite_id = invite["id"].as_str().expect("invite id");
    let res = post_json(
        &app,
        &format!("/api/v1/invites/{invite_id}/respond"),
        &bob,
        json!({"action": "accept"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = post_json(&app, &invites_uri, &bob, json!({"email": "carol@example.com"})).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // With the flag on, the same flow succeeds.
    let app = spawn_app_with_policy(CollaborationPolicy {
        members_may_invite: true,
    })
    .await;
    let (_, alice) = register_user(&app, "Ada Lovelace", "ada@example.com").await;
    let (_, bob) = register_user(&app, "Bob Carver", "bob@example.com").await;
    let _ = register_user(&app, "Carol Danvers", "carol@example.com").await;

    let project_id = create_project(&app, &alice, "Launch").await;
    let invites_uri = format!("/api/v1/projects/{project_id}/invites");
    let res = post_json(&app, &invites_uri, &alice, json!({"email": "bob@example.com"})).await;
    let invite: Value = test::read_body_json(res).await;
    let invite_id = invite["id"].as_str().expect("invite id");
    let res = post_json(
        &app,
        &format!("/api/v1/invites/{invite_id}/respond"),
        &bob,
        json!({"action": "accept"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = post_json(&app, &invites_uri, &bob, json!({"email": "carol@example.com"})).await;
    assert_eq!(res.status(), StatusCode::CREATED);
}
