/// Integration tests for the session flow
///
/// Sign in / sign out, cookie tampering, and the one-shot flash.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use taskboard_shared::auth::session;

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let ctx = TestContext::new().await.unwrap();

    let body = format!(
        "data[email]={}&data[password]={}",
        ctx.user.email, common::TEST_PASSWORD
    );
    let response = common::send_form(&ctx, "POST", "/session", &body, None).await;

    common::assert_redirect(&response, "/");

    let token = common::set_cookie_value(&response, "session").unwrap();
    assert_eq!(
        session::verify_token(&token, &ctx.config.session.secret),
        Some(ctx.user.id)
    );

    let flash = common::response_flash(&response).unwrap();
    assert_eq!(flash.kind, "success");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let body = format!("data[email]={}&data[password]=wrong", ctx.user.email);
    let response = common::send_form(&ctx, "POST", "/session", &body, None).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let wrong_password = common::body_json(response).await;

    // Unknown email answers with the identical body, so the form can't
    // be used to probe registered addresses
    let body = format!(
        "data[email]=missing-{}@example.com&data[password]={}",
        common::unique("x"),
        common::TEST_PASSWORD
    );
    let response = common::send_form(&ctx, "POST", "/session", &body, None).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let unknown_email = common::body_json(response).await;

    assert_eq!(wrong_password, unknown_email);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let ctx = TestContext::new().await.unwrap();

    let cookie = ctx.session_cookie();
    let response = common::send_form(&ctx, "POST", "/session/delete", "", Some(&cookie)).await;

    common::assert_redirect(&response, "/");
    let cleared = common::set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("session="))
        .unwrap();
    assert!(cleared.starts_with("session=;"));
    assert!(cleared.contains("Expires=Thu, 01 Jan 1970"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_tampered_session_reads_as_logged_out() {
    let ctx = TestContext::new().await.unwrap();

    // Forge the user id; the signature no longer matches
    let token = session::issue_token(ctx.user.id, &ctx.config.session.secret);
    let mut parts: Vec<String> = token.split('.').map(String::from).collect();
    parts[0] = (ctx.user.id + 1).to_string();
    let forged = format!("session={}", parts.join("."));

    let response =
        common::send_form(&ctx, "POST", "/tasks", "data[name]=X", Some(&forged)).await;
    common::assert_redirect(&response, "/session/new");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_flash_is_consumed_on_next_page() {
    let ctx = TestContext::new().await.unwrap();

    // Sign in to pick up a flash cookie
    let body = format!(
        "data[email]={}&data[password]={}",
        ctx.user.email, common::TEST_PASSWORD
    );
    let response = common::send_form(&ctx, "POST", "/session", &body, None).await;
    let flash_value = common::set_cookie_value(&response, "flash").unwrap();

    // The next page echoes the flash and clears its cookie
    let cookie = format!(
        "flash={}",
        taskboard_shared::http::cookies::urlencode(&flash_value)
    );
    let response = common::get(&ctx, "/tasks", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cleared = common::set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("flash="))
        .unwrap();
    assert!(cleared.contains("Expires=Thu, 01 Jan 1970"));

    let body = common::body_json(response).await;
    assert_eq!(body["flash"]["kind"], "success");

    // Without the cookie there is no flash and nothing to clear
    let response = common::get(&ctx, "/tasks", None).await;
    assert!(common::set_cookie_value(&response, "flash").is_none());
    let body = common::body_json(response).await;
    assert!(body["flash"].is_null());

    ctx.cleanup().await.unwrap();
}
