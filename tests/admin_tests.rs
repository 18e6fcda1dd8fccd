mod common;

use catalog_admin::audit::{AuditAction, AuditFilterChange};
use catalog_admin::error::Error;
use catalog_admin::users::role_counts;
use chrono::NaiveDate;
use common::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn admins_can_list_users() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "users": [
                user_json(1, "admin@example.com", "admin"),
                user_json(2, "ann@example.com", "user"),
                user_json(3, "bob@example.com", "user")
            ]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let admin = logged_in(&server, "admin");
    let users = admin.users.list().await.unwrap();

    assert_eq!(users.len(), 3);
    assert_eq!(role_counts(&users), (1, 2));
}

#[tokio::test]
async fn non_admins_are_refused_without_a_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let admin = logged_in(&server, "user");
    let err = admin.users.list().await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    assert_eq!(err.user_message(), "Only admins can view users");

    let anonymous = client(&server);
    assert!(anonymous.users.list().await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn audit_filters_become_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/audit"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("action", "DELETE"))
        .and(query_param("user_email", "ann@example.com"))
        .and(query_param("start_date", "2024-03-01"))
        .and(query_param("end_date", "2024-03-31"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "logs": [{
                "id": 11,
                "action": "DELETE",
                "user_email": "ann@example.com",
                "product_id": 4,
                "product_name": "Chair",
                "timestamp": "2024-03-12T14:30:00Z",
                "details": { "reason": "discontinued" }
            }, {
                "id": 12,
                "action": "ARCHIVE",
                "user_email": "ann@example.com",
                "timestamp": "2024-03-13T08:00:00Z",
                "details": "bulk archive"
            }],
            "pagination": { "page": 2, "limit": 20, "total": 22, "totalPages": 2 }
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let admin = logged_in(&server, "admin");
    admin
        .audit
        .set_filter(AuditFilterChange {
            action: Some(Some(AuditAction::Delete)),
            user_email: Some(Some("ann@example.com".to_string())),
            start_date: Some(NaiveDate::from_ymd_opt(2024, 3, 1)),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 3, 31)),
            ..Default::default()
        })
        .await;
    admin.audit.go_to_page(2).await;
    admin.audit.fetch().await;

    let state = admin.audit.snapshot().await;
    assert_eq!(state.error, None);
    assert_eq!(state.logs.len(), 2);
    assert_eq!(state.logs[0].action, AuditAction::Delete);
    assert_eq!(
        state.logs[0].details_text().as_deref(),
        Some(r#"{"reason":"discontinued"}"#)
    );
    assert_eq!(state.logs[1].action, AuditAction::Other("ARCHIVE".to_string()));
    assert_eq!(state.logs[1].details_text().as_deref(), Some("bulk archive"));
    assert_eq!(state.pagination.summary(), "Showing 21 to 22 of 22");
    assert!(!state.pagination.has_next());
}

#[tokio::test]
async fn audit_fetch_failure_is_recorded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/audit"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "message": "Admin access required"
        })))
        .mount(&server)
        .await;

    let admin = logged_in(&server, "admin");
    admin.audit.fetch().await;

    let state = admin.audit.snapshot().await;
    assert_eq!(state.error.as_deref(), Some("Admin access required"));
    assert!(!state.is_loading);
    assert!(state.logs.is_empty());
}
