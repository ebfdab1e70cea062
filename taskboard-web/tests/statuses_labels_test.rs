/// Integration tests for statuses and labels
///
/// Reference data follows one rule above all: a row that tasks still
/// point at cannot be deleted.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use taskboard_shared::models::label::Label;
use taskboard_shared::models::status::Status;

#[tokio::test]
async fn test_status_list_is_public() {
    let mut ctx = TestContext::new().await.unwrap();
    let status = ctx.create_status().await.unwrap();

    let response = common::get(&ctx, "/statuses", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let names: Vec<&str> = body["statuses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&status.name.as_str()));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_status_requires_auth() {
    let ctx = TestContext::new().await.unwrap();

    let response = common::send_form(&ctx, "POST", "/statuses", "data[name]=Nope", None).await;
    common::assert_redirect(&response, "/session/new");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_status_blank_name_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let cookie = ctx.session_cookie();
    let response =
        common::send_form(&ctx, "POST", "/statuses", "data[name]=++", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::body_json(response).await;
    assert_eq!(body["details"][0]["field"], "name");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_status_is_idempotent_by_name() {
    let ctx = TestContext::new().await.unwrap();

    let name = common::unique("dup");
    let body = format!("data[name]={}", name);
    let cookie = ctx.session_cookie();

    for _ in 0..2 {
        let response = common::send_form(&ctx, "POST", "/statuses", &body, Some(&cookie)).await;
        common::assert_redirect(&response, "/statuses");
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM statuses WHERE name = $1")
        .bind(&name)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count, 1);

    sqlx::query("DELETE FROM statuses WHERE name = $1")
        .bind(&name)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_rename_status() {
    let mut ctx = TestContext::new().await.unwrap();
    let status = ctx.create_status().await.unwrap();

    let renamed = common::unique("renamed");
    let cookie = ctx.session_cookie();
    let response = common::send_form(
        &ctx,
        "PATCH",
        &format!("/statuses/{}", status.id),
        &format!("data[name]={}", renamed),
        Some(&cookie),
    )
    .await;
    common::assert_redirect(&response, "/statuses");

    let status = Status::find_by_id(&ctx.db, status.id).await.unwrap().unwrap();
    assert_eq!(status.name, renamed);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_referenced_status_refused_then_allowed() {
    let mut ctx = TestContext::new().await.unwrap();
    let status = ctx.create_status().await.unwrap();
    let task = ctx.create_task(status.id, None, vec![]).await.unwrap();

    let cookie = ctx.session_cookie();
    let uri = format!("/statuses/{}/delete", status.id);

    let response = common::send_form(&ctx, "POST", &uri, "", Some(&cookie)).await;
    common::assert_redirect(&response, "/statuses");
    let flash = common::response_flash(&response).unwrap();
    assert_eq!(flash.kind, "danger");
    assert_eq!(flash.message, "Cannot delete status with assigned tasks");
    assert!(Status::find_by_id(&ctx.db, status.id).await.unwrap().is_some());

    // Once nothing points at the status, the delete goes through
    taskboard_shared::models::task::Task::delete(&ctx.db, task.id)
        .await
        .unwrap();

    let response = common::send_form(&ctx, "POST", &uri, "", Some(&cookie)).await;
    common::assert_redirect(&response, "/statuses");
    assert!(Status::find_by_id(&ctx.db, status.id).await.unwrap().is_none());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_status_is_404() {
    let ctx = TestContext::new().await.unwrap();

    let cookie = ctx.session_cookie();
    let response =
        common::send_form(&ctx, "DELETE", "/statuses/999999999", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_label_crud() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.session_cookie();

    let name = common::unique("bug");
    let response = common::send_form(
        &ctx,
        "POST",
        "/labels",
        &format!("data[name]={}", name),
        Some(&cookie),
    )
    .await;
    common::assert_redirect(&response, "/labels");

    let label = Label::find_by_name(&ctx.db, &name).await.unwrap().unwrap();

    let renamed = common::unique("feature");
    let response = common::send_form(
        &ctx,
        "PATCH",
        &format!("/labels/{}", label.id),
        &format!("data[name]={}", renamed),
        Some(&cookie),
    )
    .await;
    common::assert_redirect(&response, "/labels");
    assert_eq!(
        Label::find_by_id(&ctx.db, label.id).await.unwrap().unwrap().name,
        renamed
    );

    let response = common::send_form(
        &ctx,
        "DELETE",
        &format!("/labels/{}", label.id),
        "",
        Some(&cookie),
    )
    .await;
    common::assert_redirect(&response, "/labels");
    assert!(Label::find_by_id(&ctx.db, label.id).await.unwrap().is_none());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_attached_label_refused_then_allowed() {
    let mut ctx = TestContext::new().await.unwrap();
    let status = ctx.create_status().await.unwrap();
    let label = ctx.create_label().await.unwrap();
    let task = ctx.create_task(status.id, None, vec![label.id]).await.unwrap();

    let cookie = ctx.session_cookie();
    let uri = format!("/labels/{}/delete", label.id);

    let response = common::send_form(&ctx, "POST", &uri, "", Some(&cookie)).await;
    common::assert_redirect(&response, "/labels");
    let flash = common::response_flash(&response).unwrap();
    assert_eq!(flash.kind, "danger");
    assert_eq!(flash.message, "Cannot delete label with assigned tasks");

    // Detaching the label from the task unblocks the delete
    taskboard_shared::models::task::Task::update(
        &ctx.db,
        task.id,
        taskboard_shared::models::task::UpdateTask {
            label_ids: Some(vec![]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let response = common::send_form(&ctx, "POST", &uri, "", Some(&cookie)).await;
    common::assert_redirect(&response, "/labels");
    assert!(Label::find_by_id(&ctx.db, label.id).await.unwrap().is_none());

    ctx.cleanup().await.unwrap();
}
