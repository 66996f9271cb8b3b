/// Integration tests for the RepairTix API
///
/// These verify the system end-to-end against a real database:
/// - Authentication and role-based permission checks
/// - Tenant isolation (one company can never see another's rows)
/// - Soft deletes disappearing from read paths
/// - Invitation lifecycle (revoked tokens are dead)
/// - Payment recording flipping invoices to paid
/// - Purchase-order receiving updating inventory
/// - The billing scheduler charging due subscriptions

mod common;

use axum::http::StatusCode;
use common::{create_test_customer, request_json, TestContext};
use repairtix_shared::auth::jwt::{create_token, Claims, TokenType};
use repairtix_shared::auth::permissions::UserRole;
use repairtix_shared::models::integration::Integration;
use repairtix_shared::models::subscription::{
    CreateSubscription, Subscription, SubscriptionPlan, SubscriptionStatus,
};
use repairtix_shared::models::user::{CreateUser, User};
use repairtix_worker::adapters::MockPaymentProvider;
use repairtix_worker::scheduler::{BillingScheduler, SchedulerConfig};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Requests without a bearer token are rejected
#[tokio::test]
async fn test_authentication_required() {
    let mut ctx = TestContext::new().await.unwrap();

    let (status, _) = request_json(&mut ctx.app, "GET", "/v1/customers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request_json(&mut ctx.app, "GET", "/v1/tickets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// A company cannot read or mutate another company's rows
#[tokio::test]
async fn test_tenant_isolation() {
    let mut ctx = TestContext::new().await.unwrap();
    let other = ctx.other_tenant().await.unwrap();

    // Company A creates a customer and a ticket
    let token_a = ctx.jwt_token.clone();
    let customer_id = create_test_customer(&mut ctx, &token_a).await;

    let (status, ticket) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/tickets",
        Some(&token_a),
        Some(json!({
            "location_id": ctx.location.id,
            "customer_id": customer_id,
            "subject": "Cracked screen",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ticket_id = ticket["id"].as_str().unwrap();

    // Company B cannot fetch them
    let (status, _) = request_json(
        &mut ctx.app,
        "GET",
        &format!("/v1/tickets/{}", ticket_id),
        Some(&other.jwt_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request_json(
        &mut ctx.app,
        "GET",
        &format!("/v1/customers/{}", customer_id),
        Some(&other.jwt_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Company B cannot update or delete them either
    let (status, _) = request_json(
        &mut ctx.app,
        "PUT",
        &format!("/v1/customers/{}", customer_id),
        Some(&other.jwt_token),
        Some(json!({ "first_name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // And B's ticket list is empty
    let (status, tickets) = request_json(
        &mut ctx.app,
        "GET",
        "/v1/tickets",
        Some(&other.jwt_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tickets.as_array().unwrap().len(), 0);

    ctx.cleanup_other(&other).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Soft-deleted rows disappear from every read path
#[tokio::test]
async fn test_soft_delete_hides_customer() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    let customer_id = create_test_customer(&mut ctx, &token).await;

    let (status, _) = request_json(
        &mut ctx.app,
        "DELETE",
        &format!("/v1/customers/{}", customer_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request_json(
        &mut ctx.app,
        "GET",
        &format!("/v1/customers/{}", customer_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, customers) =
        request_json(&mut ctx.app, "GET", "/v1/customers", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(customers
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["id"].as_str().unwrap() != customer_id.to_string()));

    // The row itself is still there, just marked
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM customers WHERE id = $1 AND deleted_at IS NOT NULL")
            .bind(customer_id)
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    assert_eq!(count, 1);

    ctx.cleanup().await.unwrap();
}

/// A revoked invitation can never be accepted
#[tokio::test]
async fn test_revoked_invitation_cannot_be_used() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    let invite_email = format!("tech-{}@example.com", Uuid::new_v4());
    let (status, invitation) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/invitations",
        Some(&token),
        Some(json!({ "email": invite_email, "role": "technician" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let invitation_id = invitation["id"].as_str().unwrap();
    let invitation_token = invitation["token"].as_str().unwrap().to_string();

    let (status, _) = request_json(
        &mut ctx.app,
        "POST",
        &format!("/v1/invitations/{}/revoke", invitation_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/invitations/accept",
        None,
        Some(json!({
            "token": invitation_token,
            "password": "Str0ng!Pass",
            "full_name": "Should Not Exist",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);

    // No user was created for the invitee
    let user = User::find_by_email(&ctx.db, &invite_email).await.unwrap();
    assert!(user.is_none());

    ctx.cleanup().await.unwrap();
}

/// A live invitation creates the user with the invited role
#[tokio::test]
async fn test_invitation_accept_creates_user() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    let invite_email = format!("mgr-{}@example.com", Uuid::new_v4());
    let (status, invitation) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/invitations",
        Some(&token),
        Some(json!({ "email": invite_email, "role": "manager" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let invitation_token = invitation["token"].as_str().unwrap().to_string();

    let (status, accepted) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/invitations/accept",
        None,
        Some(json!({
            "token": invitation_token.clone(),
            "password": "Str0ng!Pass",
            "full_name": "New Manager",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", accepted);
    assert_eq!(
        accepted["company_id"].as_str().unwrap(),
        ctx.company.id.to_string()
    );

    let user = User::find_by_email(&ctx.db, &invite_email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role, UserRole::Manager);
    assert_eq!(user.company_id, ctx.company.id);

    // The token is single-use
    let (status, _) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/invitations/accept",
        None,
        Some(json!({
            "token": invitation_token,
            "password": "An0ther!Pass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// Front desk staff cannot reach management endpoints
#[tokio::test]
async fn test_rbac_front_desk_limits() {
    let mut ctx = TestContext::new().await.unwrap();

    let front_desk = User::create(
        &ctx.db,
        CreateUser {
            company_id: ctx.company.id,
            email: format!("desk-{}@example.com", Uuid::new_v4()),
            password_hash: "test_hash".to_string(),
            full_name: None,
            role: UserRole::FrontDesk,
        },
    )
    .await
    .unwrap();

    let claims = Claims::new(front_desk.id, ctx.company.id, TokenType::Access);
    let desk_token = create_token(&claims, &ctx.config.jwt.secret).unwrap();

    // Allowed: creating customers
    let customer_id = create_test_customer(&mut ctx, &desk_token).await;
    assert!(!customer_id.is_nil());

    // Forbidden: user management, inventory writes, billing
    let (status, _) =
        request_json(&mut ctx.app, "GET", "/v1/users", Some(&desk_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/inventory",
        Some(&desk_token),
        Some(json!({ "sku": "SCR-001", "name": "Screen" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request_json(
        &mut ctx.app,
        "GET",
        "/v1/subscriptions",
        Some(&desk_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Payments accumulate and flip the invoice to paid exactly when covered
#[tokio::test]
async fn test_payments_mark_invoice_paid() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    let customer_id = create_test_customer(&mut ctx, &token).await;

    let (status, invoice) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/invoices",
        Some(&token),
        Some(json!({
            "location_id": ctx.location.id,
            "customer_id": customer_id,
            "lines": [
                { "description": "Screen replacement", "quantity": 1, "unit_price": "80.00" },
                { "description": "Labor", "quantity": 1, "unit_price": "20.00" },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", invoice);
    assert_eq!(invoice["total"].as_str().unwrap(), "100.00");
    let invoice_id = invoice["id"].as_str().unwrap().to_string();

    // Partial payment leaves the invoice open
    let (status, result) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/payments",
        Some(&token),
        Some(json!({
            "invoice_id": invoice_id,
            "amount": "40.00",
            "method": "cash",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", result);
    assert_eq!(result["invoice"]["status"], "draft");
    assert_eq!(result["invoice"]["amount_paid"].as_str().unwrap(), "40.00");

    // Covering the remainder flips it to paid
    let (status, result) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/payments",
        Some(&token),
        Some(json!({
            "invoice_id": invoice_id,
            "amount": "60.00",
            "method": "card",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(result["invoice"]["status"], "paid");

    // A paid invoice takes no more payments
    let (status, _) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/payments",
        Some(&token),
        Some(json!({
            "invoice_id": invoice_id,
            "amount": "1.00",
            "method": "cash",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    ctx.cleanup().await.unwrap();
}

/// Receiving purchase-order lines increments stock and derives PO status
#[tokio::test]
async fn test_purchase_order_receive_updates_inventory() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    let (status, item) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/inventory",
        Some(&token),
        Some(json!({ "sku": format!("SCR-{}", Uuid::new_v4()), "name": "OLED Screen" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = item["id"].as_str().unwrap().to_string();

    let (status, po) = request_json(
        &mut ctx.app,
        "POST",
        "/v1/purchase-orders",
        Some(&token),
        Some(json!({
            "location_id": ctx.location.id,
            "supplier_name": "PartsCo",
            "items": [
                { "inventory_item_id": item_id, "quantity_ordered": 5, "unit_cost": "12.50" },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", po);
    let po_id = po["id"].as_str().unwrap().to_string();
    let line_id = po["items"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = request_json(
        &mut ctx.app,
        "POST",
        &format!("/v1/purchase-orders/{}/order", po_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // First delivery: 3 of 5
    let (status, po) = request_json(
        &mut ctx.app,
        "POST",
        &format!("/v1/purchase-orders/{}/receive", po_id),
        Some(&token),
        Some(json!({ "lines": [{ "item_id": line_id, "quantity": 3 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", po);
    assert_eq!(po["status"], "partially_received");

    let (status, item) = request_json(
        &mut ctx.app,
        "GET",
        &format!("/v1/inventory/{}", item_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["quantity_on_hand"], 3);

    // Second delivery completes the order
    let (status, po) = request_json(
        &mut ctx.app,
        "POST",
        &format!("/v1/purchase-orders/{}/receive", po_id),
        Some(&token),
        Some(json!({ "lines": [{ "item_id": line_id, "quantity": 2 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(po["status"], "received");

    let (_, item) = request_json(
        &mut ctx.app,
        "GET",
        &format!("/v1/inventory/{}", item_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(item["quantity_on_hand"], 5);

    ctx.cleanup().await.unwrap();
}

/// The billing scheduler charges due subscriptions and advances the period
#[tokio::test]
async fn test_billing_scheduler_charges_due_subscription() {
    let ctx = TestContext::new().await.unwrap();

    // A paid-plan subscription whose period has lapsed
    let subscription = Subscription::create(
        &ctx.db,
        ctx.company.id,
        CreateSubscription {
            location_id: ctx.location.id,
            plan: SubscriptionPlan::Starter,
        },
    )
    .await
    .unwrap();

    sqlx::query(
        "UPDATE subscriptions SET current_period_end = NOW() - INTERVAL '1 day' WHERE id = $1",
    )
    .bind(subscription.id)
    .execute(&ctx.db)
    .await
    .unwrap();

    // Payment integration handled by the mock provider
    let sealed = ctx.cipher.seal("{}").unwrap();
    Integration::upsert(&ctx.db, ctx.company.id, "mock", &sealed)
        .await
        .unwrap();

    let mock = Arc::new(MockPaymentProvider::new());
    let mut scheduler = BillingScheduler::with_config(
        ctx.db.clone(),
        ctx.cipher.clone(),
        SchedulerConfig {
            poll_interval_secs: 1,
            batch_size: 10,
            ..Default::default()
        },
    );
    scheduler.register_provider(mock.clone());

    scheduler.run_cycle().await.unwrap();

    assert_eq!(mock.charge_count(), 1);

    let charged = Subscription::find_by_id(&ctx.db, ctx.company.id, subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(charged.status, SubscriptionStatus::Active);
    assert!(charged.current_period_end > chrono::Utc::now());
    assert!(charged.last_charged_at.is_some());
    assert!(charged.last_charge_error.is_none());

    // Nothing due anymore: a second cycle charges nothing
    scheduler.run_cycle().await.unwrap();
    assert_eq!(mock.charge_count(), 1);

    ctx.cleanup().await.unwrap();
}

/// A declined charge marks the subscription past due without aborting
/// the cycle
#[tokio::test]
async fn test_billing_scheduler_marks_past_due_on_decline() {
    let ctx = TestContext::new().await.unwrap();

    let subscription = Subscription::create(
        &ctx.db,
        ctx.company.id,
        CreateSubscription {
            location_id: ctx.location.id,
            plan: SubscriptionPlan::Pro,
        },
    )
    .await
    .unwrap();

    sqlx::query(
        "UPDATE subscriptions SET current_period_end = NOW() - INTERVAL '1 day' WHERE id = $1",
    )
    .bind(subscription.id)
    .execute(&ctx.db)
    .await
    .unwrap();

    let sealed = ctx.cipher.seal("{}").unwrap();
    Integration::upsert(&ctx.db, ctx.company.id, "mock", &sealed)
        .await
        .unwrap();

    let mock = Arc::new(MockPaymentProvider::new());
    mock.set_decline(true);

    let mut scheduler = BillingScheduler::new(ctx.db.clone(), ctx.cipher.clone());
    scheduler.register_provider(mock.clone());

    scheduler.run_cycle().await.unwrap();

    let failed = Subscription::find_by_id(&ctx.db, ctx.company.id, subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(failed.status, SubscriptionStatus::PastDue);
    assert!(failed
        .last_charge_error
        .as_deref()
        .unwrap()
        .contains("declined"));

    // The period end was not advanced, so the next cycle retries
    mock.set_decline(false);
    scheduler.run_cycle().await.unwrap();

    let recovered = Subscription::find_by_id(&ctx.db, ctx.company.id, subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recovered.status, SubscriptionStatus::Active);
    assert!(recovered.last_charge_error.is_none());

    ctx.cleanup().await.unwrap();
}
