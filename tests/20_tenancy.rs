mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn signup_provisions_profile_and_business_defaults() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", Some("Pat Smith")).await?;

    let (status, business) = common::request(&app, "GET", "/business", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(business["name"], "Pat Smith");
    assert_eq!(business["country"], "US");
    assert_eq!(business["invoice_prefix"], "INV-");
    assert_eq!(business["next_invoice_number"], 1);
    assert_eq!(business["default_terms"], "Due on receipt");

    let (status, profile) = common::request(&app, "GET", "/me/profile", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["timezone"], "America/New_York");
    assert_eq!(profile["default_mileage_rate"], 0.0);
    Ok(())
}

#[tokio::test]
async fn blank_full_name_falls_back_to_default_business_name() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", Some("   ")).await?;

    let (_, business) = common::request(&app, "GET", "/business", Some(&token), None).await?;
    assert_eq!(business["name"], "My Business");
    Ok(())
}

#[tokio::test]
async fn entities_are_invisible_across_tenants() -> Result<()> {
    let app = common::test_app().await?;
    let alice = common::signup(&app, "alice@example.com", Some("Alice")).await?;
    let bob = common::signup(&app, "bob@example.com", Some("Bob")).await?;

    let (_, client) = common::request(
        &app,
        "POST",
        "/clients",
        Some(&alice),
        Some(json!({ "name": "Acme" })),
    )
    .await?;
    let client_id = client["id"].as_i64().unwrap();

    let (_, job) = common::request(
        &app,
        "POST",
        "/jobs",
        Some(&alice),
        Some(json!({ "title": "Roof repair", "client_id": client_id })),
    )
    .await?;
    let job_id = job["id"].as_i64().unwrap();

    // Bob sees empty lists.
    let (_, clients) = common::request(&app, "GET", "/clients", Some(&bob), None).await?;
    assert_eq!(clients, json!([]));
    let (_, jobs) = common::request(&app, "GET", "/jobs", Some(&bob), None).await?;
    assert_eq!(jobs, json!([]));

    // Bob cannot touch Alice's rows; existence is not revealed.
    let (status, _) = common::request(
        &app,
        "PUT",
        &format!("/jobs/{}", job_id),
        Some(&bob),
        Some(json!({ "title": "Hijacked" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        common::request(&app, "DELETE", &format!("/clients/{}", client_id), Some(&bob), None)
            .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nothing changed for Alice.
    let (_, jobs) = common::request(&app, "GET", "/jobs", Some(&alice), None).await?;
    assert_eq!(jobs[0]["title"], "Roof repair");
    Ok(())
}

#[tokio::test]
async fn cross_tenant_references_are_rejected() -> Result<()> {
    let app = common::test_app().await?;
    let alice = common::signup(&app, "alice@example.com", None).await?;
    let bob = common::signup(&app, "bob@example.com", None).await?;

    let (_, vendor) = common::request(
        &app,
        "POST",
        "/vendors",
        Some(&alice),
        Some(json!({ "name": "Hardware Store" })),
    )
    .await?;
    let vendor_id = vendor["id"].as_i64().unwrap();

    // Bob cannot attach an expense to Alice's vendor.
    let (status, body) = common::request(
        &app,
        "POST",
        "/expenses",
        Some(&bob),
        Some(json!({ "amount": 50.0, "category": "materials", "vendor_id": vendor_id })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Vendor not found");

    // And no row was written.
    let (_, expenses) = common::request(&app, "GET", "/expenses", Some(&bob), None).await?;
    assert_eq!(expenses, json!([]));

    // Same for jobs referencing a foreign client.
    let (_, client) = common::request(
        &app,
        "POST",
        "/clients",
        Some(&alice),
        Some(json!({ "name": "Acme" })),
    )
    .await?;
    let (status, _) = common::request(
        &app,
        "POST",
        "/jobs",
        Some(&bob),
        Some(json!({ "title": "Job", "client_id": client["id"] })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn nonexistent_ids_yield_not_found() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;

    for path in ["/clients/999", "/vendors/999", "/jobs/999", "/invoices/999", "/expenses/999"] {
        let (status, body) =
            common::request(&app, "DELETE", path, Some(&token), None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "path {}", path);
        assert_eq!(body["error"], true);
    }

    let (status, _) = common::request(&app, "DELETE", "/mileage/999", Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn business_update_is_sparse_and_clears_on_null() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", Some("Pat")).await?;

    let (status, business) = common::request(
        &app,
        "PUT",
        "/business",
        Some(&token),
        Some(json!({ "phone": "555-0100", "city": "Springfield" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(business["phone"], "555-0100");
    assert_eq!(business["city"], "Springfield");
    assert_eq!(business["name"], "Pat");

    // Explicit null clears; omitted fields stay.
    let (_, business) = common::request(
        &app,
        "PUT",
        "/business",
        Some(&token),
        Some(json!({ "phone": null })),
    )
    .await?;
    assert_eq!(business["phone"], json!(null));
    assert_eq!(business["city"], "Springfield");
    Ok(())
}

#[tokio::test]
async fn profile_update_is_sparse() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;

    let (_, profile) = common::request(
        &app,
        "PUT",
        "/me/profile",
        Some(&token),
        Some(json!({ "default_mileage_rate": 0.655 })),
    )
    .await?;
    assert_eq!(profile["default_mileage_rate"], 0.655);
    assert_eq!(profile["timezone"], "America/New_York");

    let (_, profile) = common::request(
        &app,
        "PUT",
        "/me/profile",
        Some(&token),
        Some(json!({ "timezone": null })),
    )
    .await?;
    assert_eq!(profile["timezone"], json!(null));
    assert_eq!(profile["default_mileage_rate"], 0.655);
    Ok(())
}
