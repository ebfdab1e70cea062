/// Integration tests for registration and account management
///
/// Registration validation, the application-level duplicate-email check,
/// owner-only edits, and the referenced-user delete guard.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use taskboard_shared::models::user::User;

#[tokio::test]
async fn test_register_user() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("{}@example.com", common::unique("reg"));
    let body = format!(
        "data[firstName]=Jane&data[lastName]=Doe&data[email]={}&data[password]=secret",
        email
    );
    let response = common::send_form(&ctx, "POST", "/users", &body, None).await;

    common::assert_redirect(&response, "/");
    let flash = common::response_flash(&response).unwrap();
    assert_eq!(flash.message, "User registered successfully");

    let user = User::find_by_email(&ctx.db, &email).await.unwrap().unwrap();
    assert_eq!(user.first_name, "Jane");
    assert!(user.password_digest.starts_with("$argon2id$"));

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_register_duplicate_email_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let body = format!(
        "data[firstName]=Jane&data[lastName]=Doe&data[email]={}&data[password]=secret",
        ctx.user.email
    );
    let response = common::send_form(&ctx, "POST", "/users", &body, None).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::body_json(response).await;
    assert_eq!(body["details"][0]["field"], "email");
    assert_eq!(body["details"][0]["message"], "Email already in use");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_register_validation_errors() {
    let ctx = TestContext::new().await.unwrap();

    let response = common::send_form(
        &ctx,
        "POST",
        "/users",
        "data[firstName]=&data[lastName]=&data[email]=not-an-email&data[password]=ab",
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::body_json(response).await;
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"first_name"));
    assert!(fields.contains(&"last_name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_own_account() {
    let ctx = TestContext::new().await.unwrap();

    let cookie = ctx.session_cookie();
    let response = common::send_form(
        &ctx,
        "PATCH",
        &format!("/users/{}", ctx.user.id),
        "data[firstName]=Renamed&data[lastName]=",
        Some(&cookie),
    )
    .await;

    common::assert_redirect(&response, "/users");

    let user = User::find_by_id(&ctx.db, ctx.user.id).await.unwrap().unwrap();
    assert_eq!(user.first_name, "Renamed");
    // Blank fields keep their previous values
    assert_eq!(user.last_name, ctx.user.last_name);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_other_account_denied() {
    let mut ctx = TestContext::new().await.unwrap();
    let other = ctx.create_user().await.unwrap();

    let cookie = ctx.session_cookie();
    let response = common::send_form(
        &ctx,
        "PATCH",
        &format!("/users/{}", other.id),
        "data[firstName]=Hijacked",
        Some(&cookie),
    )
    .await;

    common::assert_redirect(&response, "/users");
    let flash = common::response_flash(&response).unwrap();
    assert_eq!(flash.kind, "danger");
    assert_eq!(flash.message, "Access denied");

    let untouched = User::find_by_id(&ctx.db, other.id).await.unwrap().unwrap();
    assert_eq!(untouched.first_name, "Other");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_user_with_tasks_refused() {
    let mut ctx = TestContext::new().await.unwrap();
    let status = ctx.create_status().await.unwrap();
    ctx.create_task(status.id, None, vec![]).await.unwrap();

    let cookie = ctx.session_cookie();
    let response = common::send_form(
        &ctx,
        "POST",
        &format!("/users/{}/delete", ctx.user.id),
        "",
        Some(&cookie),
    )
    .await;

    common::assert_redirect(&response, "/users");
    let flash = common::response_flash(&response).unwrap();
    assert_eq!(flash.kind, "danger");
    assert_eq!(flash.message, "Cannot delete user with assigned tasks");

    assert!(User::find_by_id(&ctx.db, ctx.user.id).await.unwrap().is_some());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_own_account_ends_session() {
    let ctx = TestContext::new().await.unwrap();

    let cookie = ctx.session_cookie();
    let response = common::send_form(
        &ctx,
        "DELETE",
        &format!("/users/{}", ctx.user.id),
        "",
        Some(&cookie),
    )
    .await;

    common::assert_redirect(&response, "/users");
    assert!(User::find_by_id(&ctx.db, ctx.user.id).await.unwrap().is_none());

    // The session cookie is cleared along with the account
    let cleared = common::set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("session="))
        .unwrap();
    assert!(cleared.contains("Expires=Thu, 01 Jan 1970"));

    ctx.cleanup().await.unwrap();
}
