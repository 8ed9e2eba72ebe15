mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use serde_json::Value;

async fn seed_job_with_children(
    app: &axum::Router,
    token: &str,
) -> Result<(i64, i64, i64, i64, i64)> {
    let (_, job) = common::request(
        app,
        "POST",
        "/jobs",
        Some(token),
        Some(json!({ "title": "Bathroom remodel" })),
    )
    .await?;
    let job_id = job["id"].as_i64().unwrap();

    let (_, invoice) = common::request(
        app,
        "POST",
        "/invoices",
        Some(token),
        Some(json!({ "amount": 500.0, "job_id": job_id })),
    )
    .await?;
    let (_, expense) = common::request(
        app,
        "POST",
        "/expenses",
        Some(token),
        Some(json!({ "amount": 75.0, "category": "materials", "job_id": job_id })),
    )
    .await?;
    let expense_id = expense["id"].as_i64().unwrap();

    let (_, mileage) = common::request(
        app,
        "POST",
        "/mileage",
        Some(token),
        Some(json!({ "miles": 12.5, "job_id": job_id })),
    )
    .await?;

    let (_, receipt) = common::request(
        app,
        "POST",
        "/receipts",
        Some(token),
        Some(json!({
            "key": "business_1/receipts/abc_store.jpg",
            "file_url": "https://files.example.com/business_1/receipts/abc_store.jpg",
            "expense_id": expense_id,
        })),
    )
    .await?;

    Ok((
        job_id,
        invoice["id"].as_i64().unwrap(),
        expense_id,
        mileage["id"].as_i64().unwrap(),
        receipt["id"].as_i64().unwrap(),
    ))
}

async fn list_len(app: &axum::Router, token: &str, path: &str) -> Result<usize> {
    let (status, body) = common::request(app, "GET", path, Some(token), None).await?;
    anyhow::ensure!(status == StatusCode::OK, "GET {} failed: {}", path, status);
    Ok(body.as_array().map(Vec::len).unwrap_or(0))
}

#[tokio::test]
async fn deleting_a_job_removes_its_dependents() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;
    let (job_id, ..) = seed_job_with_children(&app, &token).await?;

    let (status, body) =
        common::request(&app, "DELETE", &format!("/jobs/{}", job_id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    assert_eq!(list_len(&app, &token, "/jobs").await?, 0);
    assert_eq!(list_len(&app, &token, "/invoices").await?, 0);
    assert_eq!(list_len(&app, &token, "/expenses").await?, 0);
    assert_eq!(list_len(&app, &token, "/mileage").await?, 0);
    assert_eq!(list_len(&app, &token, "/receipts").await?, 0);
    Ok(())
}

#[tokio::test]
async fn deleting_an_expense_takes_its_receipts() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;
    let (_, _, expense_id, _, _) = seed_job_with_children(&app, &token).await?;

    common::request(&app, "DELETE", &format!("/expenses/{}", expense_id), Some(&token), None)
        .await?;

    assert_eq!(list_len(&app, &token, "/expenses").await?, 0);
    assert_eq!(list_len(&app, &token, "/receipts").await?, 0);
    // The job and its invoice are untouched.
    assert_eq!(list_len(&app, &token, "/jobs").await?, 1);
    assert_eq!(list_len(&app, &token, "/invoices").await?, 1);
    Ok(())
}

#[tokio::test]
async fn deleting_a_client_detaches_its_jobs() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;

    let (_, client) = common::request(
        &app,
        "POST",
        "/clients",
        Some(&token),
        Some(json!({ "name": "Acme" })),
    )
    .await?;
    let client_id = client["id"].as_i64().unwrap();

    let (_, job) = common::request(
        &app,
        "POST",
        "/jobs",
        Some(&token),
        Some(json!({ "title": "Fence", "client_id": client_id })),
    )
    .await?;
    assert_eq!(job["client_id"], client_id);

    common::request(&app, "DELETE", &format!("/clients/{}", client_id), Some(&token), None)
        .await?;

    let (_, jobs) = common::request(&app, "GET", "/jobs", Some(&token), None).await?;
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["client_id"], Value::Null);
    assert_eq!(jobs[0]["title"], "Fence");
    Ok(())
}

#[tokio::test]
async fn deleting_a_vendor_detaches_expenses_and_receipts() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;

    let (_, vendor) = common::request(
        &app,
        "POST",
        "/vendors",
        Some(&token),
        Some(json!({ "name": "Hardware Store" })),
    )
    .await?;
    let vendor_id = vendor["id"].as_i64().unwrap();

    common::request(
        &app,
        "POST",
        "/expenses",
        Some(&token),
        Some(json!({ "amount": 30.0, "category": "materials", "vendor_id": vendor_id })),
    )
    .await?;
    common::request(
        &app,
        "POST",
        "/receipts",
        Some(&token),
        Some(json!({
            "key": "business_1/receipts/def_store.jpg",
            "file_url": "https://files.example.com/business_1/receipts/def_store.jpg",
            "vendor_id": vendor_id,
        })),
    )
    .await?;

    common::request(&app, "DELETE", &format!("/vendors/{}", vendor_id), Some(&token), None)
        .await?;

    let (_, expenses) = common::request(&app, "GET", "/expenses", Some(&token), None).await?;
    assert_eq!(expenses[0]["vendor_id"], Value::Null);
    let (_, receipts) = common::request(&app, "GET", "/receipts", Some(&token), None).await?;
    assert_eq!(receipts[0]["vendor_id"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn deleting_the_account_removes_the_whole_tenant() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", Some("Pat")).await?;
    seed_job_with_children(&app, &token).await?;

    let (status, _) = common::request(&app, "DELETE", "/users/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);

    // The email is free again and the new tenant starts empty.
    let token = common::signup(&app, "pat@example.com", Some("Pat")).await?;
    assert_eq!(list_len(&app, &token, "/jobs").await?, 0);
    assert_eq!(list_len(&app, &token, "/invoices").await?, 0);
    assert_eq!(list_len(&app, &token, "/receipts").await?, 0);

    let (_, business) = common::request(&app, "GET", "/business", Some(&token), None).await?;
    assert_eq!(business["next_invoice_number"], 1);
    Ok(())
}

#[tokio::test]
async fn receipts_filter_by_job_and_expense() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;
    let (job_id, _, expense_id, _, _) = seed_job_with_children(&app, &token).await?;

    common::request(
        &app,
        "POST",
        "/receipts",
        Some(&token),
        Some(json!({
            "key": "business_1/receipts/xyz_other.jpg",
            "file_url": "https://files.example.com/business_1/receipts/xyz_other.jpg",
            "job_id": job_id,
        })),
    )
    .await?;

    assert_eq!(list_len(&app, &token, "/receipts").await?, 2);
    assert_eq!(
        list_len(&app, &token, &format!("/receipts?expense_id={}", expense_id)).await?,
        1
    );
    assert_eq!(list_len(&app, &token, &format!("/receipts?job_id={}", job_id)).await?, 1);
    Ok(())
}

#[tokio::test]
async fn job_updates_are_sparse_and_validate_references() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;

    let (_, job) = common::request(
        &app,
        "POST",
        "/jobs",
        Some(&token),
        Some(json!({ "title": "Deck", "client_name": "Walk-in" })),
    )
    .await?;
    let job_id = job["id"].as_i64().unwrap();
    assert_eq!(job["status"], "open");

    let (_, updated) = common::request(
        &app,
        "PUT",
        &format!("/jobs/{}", job_id),
        Some(&token),
        Some(json!({ "status": "done", "end_date": "2024-06-30" })),
    )
    .await?;
    assert_eq!(updated["status"], "done");
    assert_eq!(updated["title"], "Deck");
    assert_eq!(updated["client_name"], "Walk-in");
    assert_eq!(updated["end_date"], "2024-06-30");

    let (status, _) = common::request(
        &app,
        "PUT",
        &format!("/jobs/{}", job_id),
        Some(&token),
        Some(json!({ "client_id": 999 })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Detaching with an explicit null is allowed.
    let (_, detached) = common::request(
        &app,
        "PUT",
        &format!("/jobs/{}", job_id),
        Some(&token),
        Some(json!({ "client_id": null, "client_name": null })),
    )
    .await?;
    assert_eq!(detached["client_id"], Value::Null);
    assert_eq!(detached["client_name"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn receipts_can_be_registered_with_only_a_file_url() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;

    let (status, receipt) = common::request(
        &app,
        "POST",
        "/receipts",
        Some(&token),
        Some(json!({ "file_url": "https://files.example.com/external/scan.jpg" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["key"], Value::Null);
    assert_eq!(receipt["file_url"], "https://files.example.com/external/scan.jpg");

    assert_eq!(list_len(&app, &token, "/receipts").await?, 1);
    Ok(())
}
