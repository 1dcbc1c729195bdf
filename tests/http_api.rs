// End-to-end checks against the full router over an in-memory SQLite store.

#[path = "common/mod.rs"]
mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt; // for oneshot

use dealerdesk::routes;
use dealerdesk::state::AppState;

async fn send(
    state: &AppState,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request build failed"),
        None => builder.body(Body::empty()).expect("request build failed"),
    };

    let app = routes::build_router(state.clone());
    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body read failed");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response was not JSON")
    };
    (status, body)
}

/// Register a staff account and return (token, user id).
async fn register_staff(state: &AppState, name: &str, email: &str) -> (String, String) {
    let (status, body) = send(
        state,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["token"].as_str().expect("token").to_string(),
        body["user"]["id"].as_str().expect("user id").to_string(),
    )
}

async fn admin_token(state: &AppState) -> String {
    let (status, body) = send(
        state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": "admin@dealerdesk.test",
            "password": "seed-admin-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

fn car_payload(chassis: &str, engine: &str) -> Value {
    json!({
        "make": "Maruti",
        "model": "Swift",
        "manufactureYear": 2019,
        "chassisNumber": chassis,
        "engineNumber": engine,
        "buyingPrice": 350000,
        "photos": ["https://photos.example/swift-front.jpg"]
    })
}

async fn create_car(state: &AppState, token: &str, chassis: &str, engine: &str) -> Value {
    let (status, body) = send(
        state,
        "POST",
        "/api/cars",
        Some(token),
        Some(car_payload(chassis, engine)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "car create failed: {body}");
    body
}

async fn sell_car(state: &AppState, token: &str, car_id: &str) -> Value {
    let (status, body) = send(
        state,
        "POST",
        "/api/sell-letters",
        Some(token),
        Some(json!({
            "carId": car_id,
            "buyerName": "Bashir Ahmad",
            "buyerPhone": "9876500000",
            "saleAmount": 525000,
            "paymentMethod": "cash",
            "saleDate": "2024-06-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "sell letter failed: {body}");
    body
}

#[tokio::test]
async fn health_needs_no_token() {
    let state = common::sqlite_state().await;
    let (status, body) = send(&state, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let state = common::sqlite_state().await;

    let (status, body) = send(&state, "GET", "/api/cars", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().expect("message").contains("token"));

    let (status, _) = send(&state, "GET", "/api/cars", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_me_flow() {
    let state = common::sqlite_state().await;
    let (token, user_id) = register_staff(&state, "Imran", "Imran@Example.com").await;

    let (status, me) = send(&state, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], json!(user_id));
    assert_eq!(me["_id"], json!(user_id));
    assert_eq!(me["email"], json!("imran@example.com"));
    assert_eq!(me["role"], json!("staff"));
    assert!(me.get("passwordHash").is_none());

    // Login with the address as typed, mixed case.
    let (status, login) = send(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "Imran@Example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["success"], json!(true));

    let (status, body) = send(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "imran@example.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("invalid email or password"));
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let state = common::sqlite_state().await;
    register_staff(&state, "First", "dup@example.com").await;

    let (status, body) = send(
        &state,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Second", "email": "dup@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn car_create_normalizes_money_and_ids() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;

    let car = create_car(&state, &token, "CH-1001", "EN-1001").await;
    assert_eq!(car["buyingPrice"], json!("3,50,000"));
    assert_eq!(car["status"], json!("Available"));
    assert_eq!(car["make"], json!("Maruti"));
    let id = car["id"].as_str().expect("id");
    assert_eq!(car["_id"], json!(id));
    // Dates come out as plain RFC 3339 strings, not wrapped documents.
    assert!(car["createdAt"].as_str().expect("createdAt").contains('T'));
}

#[tokio::test]
async fn car_create_validates_photos_and_year() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;

    let mut payload = car_payload("CH-2001", "EN-2001");
    payload["photos"] = json!([]);
    let (status, body) = send(&state, "POST", "/api/cars", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().expect("message").contains("photo"));

    let mut payload = car_payload("CH-2002", "EN-2002");
    payload["manufactureYear"] = json!(1850);
    let (status, _) = send(&state, "POST", "/api/cars", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut payload = car_payload("CH-2003", "EN-2003");
    payload["photos"] = json!(vec!["https://photos.example/p.jpg"; 13]);
    let (status, body) = send(&state, "POST", "/api/cars", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().expect("message").contains("12"));
}

#[tokio::test]
async fn duplicate_vehicle_identity_conflicts() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;

    create_car(&state, &token, "CH-3001", "EN-3001").await;
    let (status, body) = send(
        &state,
        "POST",
        "/api/cars",
        Some(&token),
        Some(car_payload("CH-3001", "EN-3001")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn staff_list_is_scoped_admin_sees_all() {
    let state = common::sqlite_state().await;
    let admin = admin_token(&state).await;
    let (staff, _) = register_staff(&state, "Sajad", "sajad@example.com").await;

    create_car(&state, &admin, "CH-4001", "EN-4001").await;
    let own = create_car(&state, &staff, "CH-4002", "EN-4002").await;

    let (status, list) = send(&state, "GET", "/api/cars", Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = list.as_array().expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], own["id"]);

    let (_, list) = send(&state, "GET", "/api/cars", Some(&admin), None).await;
    assert_eq!(list.as_array().expect("list").len(), 2);
}

#[tokio::test]
async fn record_reads_are_ownership_gated() {
    let state = common::sqlite_state().await;
    let admin = admin_token(&state).await;
    let (owner, _) = register_staff(&state, "Owner", "owner@example.com").await;
    let (other, _) = register_staff(&state, "Other", "other@example.com").await;

    let car = create_car(&state, &owner, "CH-5001", "EN-5001").await;
    let path = format!("/api/cars/{}", car["id"].as_str().expect("id"));

    let (status, _) = send(&state, "GET", &path, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&state, "GET", &path, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));
    let (status, _) = send(&state, "GET", &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn car_update_changes_price_and_status() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;
    let car = create_car(&state, &token, "CH-6001", "EN-6001").await;
    let path = format!("/api/cars/{}", car["id"].as_str().expect("id"));

    let (status, updated) = send(
        &state,
        "PUT",
        &path,
        Some(&token),
        Some(json!({ "sellingPrice": 415000, "status": "coming soon" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {updated}");
    assert_eq!(updated["sellingPrice"], json!("4,15,000"));
    assert_eq!(updated["status"], json!("Coming Soon"));
    // Fields not in the payload are untouched.
    assert_eq!(updated["buyingPrice"], json!("3,50,000"));
}

#[tokio::test]
async fn sell_letter_snapshots_car_and_marks_it_sold() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;
    let car = create_car(&state, &token, "CH-7001", "EN-7001").await;
    let car_id = car["id"].as_str().expect("id");

    let letter = sell_car(&state, &token, car_id).await;
    assert_eq!(letter["saleAmount"], json!("5,25,000"));
    assert_eq!(letter["chassisNumber"], json!("CH-7001"));
    assert_eq!(letter["vehicleName"], json!("Maruti Swift"));

    let (_, car) = send(
        &state,
        "GET",
        &format!("/api/cars/{car_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(car["status"], json!("Sold Out"));
    assert_eq!(car["sold"]["customerName"], json!("Bashir Ahmad"));

    // A sold car cannot be sold again.
    let (status, body) = send(
        &state,
        "POST",
        "/api/sell-letters",
        Some(&token),
        Some(json!({
            "carId": car_id,
            "buyerName": "Second Buyer",
            "buyerPhone": "9876511111",
            "saleAmount": 500000,
            "paymentMethod": "cash",
            "saleDate": "2024-06-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().expect("message").contains("sold"));
}

#[tokio::test]
async fn sell_letter_reads_follow_creator_ownership() {
    let state = common::sqlite_state().await;
    let (owner, _) = register_staff(&state, "Seller", "seller@example.com").await;
    let (other, _) = register_staff(&state, "Rival", "rival@example.com").await;

    let car = create_car(&state, &owner, "CH-8001", "EN-8001").await;
    let letter = sell_car(&state, &owner, car["id"].as_str().expect("id")).await;
    let path = format!("/api/sell-letters/{}", letter["id"].as_str().expect("id"));

    let (status, _) = send(&state, "GET", &path, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&state, "GET", &path, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn service_bill_computes_and_formats_totals() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;

    let (status, bill) = send(
        &state,
        "POST",
        "/api/service-bills",
        Some(&token),
        Some(json!({
            "customerName": "Gulzar",
            "vehicleName": "Alto 800",
            "serviceItems": [
                { "description": "Oil change", "quantity": 2, "rate": 800 },
                { "description": "Brake pads", "rate": 2400 }
            ],
            "taxRate": 18,
            "discount": 500,
            "advancePaid": 1000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "bill create failed: {bill}");
    assert_eq!(bill["totalAmount"], json!("4,000"));
    assert_eq!(bill["taxAmount"], json!("720"));
    assert_eq!(bill["grandTotal"], json!("4,220"));
    assert_eq!(bill["balanceDue"], json!("3,220"));
    assert_eq!(bill["paymentStatus"], json!("partial"));
    // Line items and discount keep raw numbers.
    assert_eq!(bill["serviceItems"][0]["amount"], json!(1600.0));
    assert_eq!(bill["discount"], json!(500.0));

    // Settling the balance flips the status.
    let path = format!("/api/service-bills/{}", bill["id"].as_str().expect("id"));
    let (status, updated) = send(
        &state,
        "PUT",
        &path,
        Some(&token),
        Some(json!({ "advancePaid": 4220 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["paymentStatus"], json!("paid"));
    assert_eq!(updated["balanceDue"], json!("0"));
}

#[tokio::test]
async fn service_bill_rejects_empty_items_and_bad_tax() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;

    let (status, body) = send(
        &state,
        "POST",
        "/api/service-bills",
        Some(&token),
        Some(json!({ "customerName": "G", "vehicleName": "V", "serviceItems": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().expect("message").contains("item"));

    let (status, _) = send(
        &state,
        "POST",
        "/api/service-bills",
        Some(&token),
        Some(json!({
            "customerName": "G",
            "vehicleName": "V",
            "serviceItems": [{ "description": "wash", "rate": 100 }],
            "taxRate": 150
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rc_details_promote_and_columns_win() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;

    // Registration number arrives only inside the details blob.
    let (status, rc) = send(
        &state,
        "POST",
        "/api/rc",
        Some(&token),
        Some(json!({
            "details": {
                "vehicleRegNo": "JK01-5544",
                "ownerName": "From Blob",
                "status": { "transferred": "yes" }
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "rc create failed: {rc}");
    assert_eq!(rc["vehicleRegNo"], json!("JK01-5544"));
    assert_eq!(rc["ownerName"], json!("From Blob"));
    assert_eq!(rc["status"]["transferred"], json!(true));
    assert_eq!(rc["status"]["rtoFeesPaid"], json!(false));

    // A top-level write wins over the blob and the mirror follows.
    let path = format!("/api/rc/{}", rc["id"].as_str().expect("id"));
    let (status, updated) = send(
        &state,
        "PUT",
        &path,
        Some(&token),
        Some(json!({ "ownerName": "Column Owner", "status": { "rtoFeesPaid": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["ownerName"], json!("Column Owner"));
    assert_eq!(updated["details"]["ownerName"], json!("Column Owner"));
    assert_eq!(updated["status"]["rtoFeesPaid"], json!(true));
    assert_eq!(updated["status"]["transferred"], json!(true));

    let (_, fetched) = send(&state, "GET", &path, Some(&token), None).await;
    assert_eq!(fetched["ownerName"], json!("Column Owner"));
    // Every logical text field is present even when never written.
    assert_eq!(fetched["rtoAgentName"], json!(""));
}

#[tokio::test]
async fn rc_requires_a_registration_number() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;

    let (status, body) = send(
        &state,
        "POST",
        "/api/rc",
        Some(&token),
        Some(json!({ "ownerName": "No Reg" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .expect("message")
            .contains("vehicleRegNo")
    );
}

#[tokio::test]
async fn gallery_links_are_detached_when_the_car_goes() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;
    let car = create_car(&state, &token, "CH-9001", "EN-9001").await;
    let car_id = car["id"].as_str().expect("id");

    let (status, item) = send(
        &state,
        "POST",
        "/api/gallery",
        Some(&token),
        Some(json!({
            "carId": car_id,
            "photos": ["https://photos.example/swift-front.jpg", "https://photos.example/showroom.jpg"],
            "caption": "Delivery day"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "gallery create failed: {item}");
    assert_eq!(item["carId"], json!(car_id));

    let (status, _) = send(
        &state,
        "DELETE",
        &format!("/api/cars/{car_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let path = format!("/api/gallery/{}", item["id"].as_str().expect("id"));
    let (status, item) = send(&state, "GET", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(item["carId"].is_null());
    assert_eq!(item["photos"], json!(["https://photos.example/showroom.jpg"]));
}

#[tokio::test]
async fn gallery_delete_pulls_photos_out_of_cars() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;
    let car = create_car(&state, &token, "CH-9101", "EN-9101").await;
    let car_id = car["id"].as_str().expect("id");

    let (_, item) = send(
        &state,
        "POST",
        "/api/gallery",
        Some(&token),
        Some(json!({ "photos": ["https://photos.example/swift-front.jpg"] })),
    )
    .await;
    let (status, _) = send(
        &state,
        "DELETE",
        &format!("/api/gallery/{}", item["id"].as_str().expect("id")),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, car) = send(
        &state,
        "GET",
        &format!("/api/cars/{car_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(car["photos"], json!([]));
}

#[tokio::test]
async fn refurbishments_filter_by_car() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;
    let first = create_car(&state, &token, "CH-9201", "EN-9201").await;
    let second = create_car(&state, &token, "CH-9202", "EN-9202").await;
    let first_id = first["id"].as_str().expect("id");

    for (car, work) in [(&first, "Repaint bonnet"), (&second, "New tyres")] {
        let (status, body) = send(
            &state,
            "POST",
            "/api/refurbishments",
            Some(&token),
            Some(json!({
                "carId": car["id"],
                "workItems": [{ "description": work, "cost": 8000 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "refurbishment failed: {body}");
    }

    let (status, list) = send(
        &state,
        "GET",
        &format!("/api/refurbishments?carId={first_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = list.as_array().expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0]["workItems"][0]["description"],
        json!("Repaint bonnet")
    );

    let (_, all) = send(&state, "GET", "/api/refurbishments", Some(&token), None).await;
    assert_eq!(all.as_array().expect("list").len(), 2);
}

#[tokio::test]
async fn advances_validate_amount_and_filter_by_letter() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;
    let car = create_car(&state, &token, "CH-9301", "EN-9301").await;
    let letter = sell_car(&state, &token, car["id"].as_str().expect("id")).await;
    let letter_id = letter["id"].as_str().expect("id");

    let (status, body) = send(
        &state,
        "POST",
        "/api/advance-payments",
        Some(&token),
        Some(json!({ "sellLetterId": letter_id, "amount": -50, "paymentMethod": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().expect("message").contains("amount"));

    let (status, advance) = send(
        &state,
        "POST",
        "/api/advance-payments",
        Some(&token),
        Some(json!({
            "sellLetterId": letter_id,
            "amount": 25000,
            "paymentMethod": "upi",
            "note": "booking amount"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "advance failed: {advance}");
    // No paymentDate in the payload; the server stamps receipt time.
    assert!(advance["paymentDate"].as_str().expect("date").contains('T'));

    let (status, list) = send(
        &state,
        "GET",
        &format!("/api/advance-payments?sellLetterId={letter_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().expect("list").len(), 1);
}

#[tokio::test]
async fn dashboard_shape_depends_on_role() {
    let state = common::sqlite_state().await;
    let admin = admin_token(&state).await;
    let (staff, _) = register_staff(&state, "Staff", "staff@example.com").await;

    let car = create_car(&state, &admin, "CH-9401", "EN-9401").await;
    sell_car(&state, &admin, car["id"].as_str().expect("id")).await;

    let (status, stats) = send(&state, "GET", "/api/dashboard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalBuyValue"], json!(350000.0));
    assert_eq!(stats["totalSellValue"], json!(525000.0));
    assert_eq!(stats["profit"], json!(175000.0));
    assert!(stats["monthlyData"].is_array());
    assert_eq!(stats["carStats"]["soldCars"], json!(1));
    assert_eq!(stats["rcStats"]["totalRCs"], json!(0));
    // Recent rows go through the same normalization as list endpoints.
    assert_eq!(
        stats["recentTransactions"]["sell"][0]["saleAmount"],
        json!("5,25,000")
    );

    let (status, stats) = send(&state, "GET", "/api/dashboard", Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats.get("carStats").is_none());
    assert!(stats.get("rcStats").is_none());
    assert_eq!(stats["totalBuyValue"], json!(0.0));
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let state = common::sqlite_state().await;
    let admin = admin_token(&state).await;
    let (staff, _) = register_staff(&state, "Lowly", "lowly@example.com").await;

    let (status, _) = send(&state, "GET", "/api/users", Some(&staff), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, list) = send(&state, "GET", "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = list.as_array().expect("list");
    assert!(rows.len() >= 2);
    assert!(rows.iter().all(|row| row.get("passwordHash").is_none()));

    let (status, made) = send(
        &state,
        "POST",
        "/api/users",
        Some(&admin),
        Some(json!({
            "name": "Second Admin",
            "email": "second@dealerdesk.test",
            "password": "another-pass",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user create failed: {made}");
    assert_eq!(made["role"], json!("admin"));
}

#[tokio::test]
async fn disabling_an_account_locks_it_out() {
    let state = common::sqlite_state().await;
    let admin = admin_token(&state).await;
    let (staff, staff_id) = register_staff(&state, "Gone", "gone@example.com").await;

    let (status, _) = send(
        &state,
        "PUT",
        &format!("/api/users/{staff_id}"),
        Some(&admin),
        Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The old token no longer clears the middleware.
    let (status, body) = send(&state, "GET", "/api/cars", Some(&staff), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(
        body["message"]
            .as_str()
            .expect("message")
            .contains("disabled")
    );

    let (status, body) = send(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "gone@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(
        body["message"]
            .as_str()
            .expect("message")
            .contains("disabled")
    );
}

#[tokio::test]
async fn admins_cannot_delete_their_own_account() {
    let state = common::sqlite_state().await;
    let admin = admin_token(&state).await;

    let (_, me) = send(&state, "GET", "/api/auth/me", Some(&admin), None).await;
    let my_id = me["id"].as_str().expect("id");

    let (status, body) = send(
        &state,
        "DELETE",
        &format!("/api/users/{my_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().expect("message").contains("own"));
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let state = common::sqlite_state().await;
    let token = admin_token(&state).await;

    let missing = mongodb::bson::oid::ObjectId::new().to_hex();
    let (status, body) = send(
        &state,
        "GET",
        &format!("/api/cars/{missing}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("car not found"));

    let (status, _) = send(&state, "GET", "/api/cars/not-a-hex-id", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
