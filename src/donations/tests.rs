//! Tests for donations module
//!
//! These tests verify:
//! - Create and update validation, including multi-field error reporting
//! - The HTTP envelope and status codes for every outcome

#[cfg(test)]
mod validator_tests {
    use crate::donations::models::{Donation, DonationInput, DonationPatch, DonationType};
    use crate::donations::validators;
    use crate::common::ApiError;
    use chrono::NaiveDate;
    use serde_json::json;

    fn input(value: serde_json::Value) -> DonationInput {
        serde_json::from_value(value).unwrap()
    }

    fn validation_errors(result: Result<impl std::fmt::Debug, ApiError>) -> Vec<String> {
        match result {
            Err(ApiError::ValidationFailed(errors)) => errors,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_create_normalizes_record() {
        let record = validators::validate_create(&input(json!({
            "donor_name": "  A. Smith  ",
            "donation_type": "food",
            "quantity": 12,
            "date": "2024-03-01"
        })))
        .unwrap();

        assert_eq!(record.donor_name, "A. Smith");
        assert_eq!(record.donation_type, DonationType::Food);
        assert_eq!(record.quantity, 12.0);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_validate_create_accepts_numeric_strings_and_timestamps() {
        let record = validators::validate_create(&input(json!({
            "donor_name": "Corner Bakery",
            "donation_type": "household",
            "quantity": "2.5",
            "date": "2024-03-01T10:30:00Z"
        })))
        .unwrap();

        assert_eq!(record.quantity, 2.5);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_validate_create_reports_every_missing_field() {
        let errors = validation_errors(validators::validate_create(&input(json!({}))));

        assert_eq!(
            errors,
            vec![
                "donor_name: Donor name is required",
                "donation_type: Donation type is required",
                "quantity: Quantity is required",
                "date: Date is required",
            ]
        );
    }

    #[test]
    fn test_validate_create_does_not_stop_at_first_bad_field() {
        let errors = validation_errors(validators::validate_create(&input(json!({
            "donor_name": "X",
            "donation_type": "cars",
            "quantity": 0,
            "date": "2024-02-30"
        }))));

        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("donor_name:"));
        assert!(errors[1].starts_with("donation_type:"));
        assert!(errors[2].starts_with("quantity:"));
        assert!(errors[3].starts_with("date:"));
    }

    #[test]
    fn test_short_donor_name_is_rejected() {
        let errors = validation_errors(validators::validate_create(&input(json!({
            "donor_name": "X",
            "donation_type": "food",
            "quantity": 1,
            "date": "2024-01-01"
        }))));

        assert_eq!(
            errors,
            vec!["donor_name: Donor name must be between 2 and 100 characters"]
        );
    }

    #[test]
    fn test_donor_name_is_measured_after_trimming() {
        let base = json!({ "donation_type": "toys", "quantity": 1, "date": "2024-01-01" });

        let mut padded = base.clone();
        padded["donor_name"] = json!("   J   ");
        assert!(validators::validate_create(&input(padded)).is_err());

        let mut longest = base.clone();
        longest["donor_name"] = json!(format!(" {} ", "n".repeat(100)));
        assert!(validators::validate_create(&input(longest)).is_ok());

        let mut too_long = base;
        too_long["donor_name"] = json!("n".repeat(101));
        assert!(validators::validate_create(&input(too_long)).is_err());
    }

    #[test]
    fn test_donor_name_rejects_control_characters() {
        let errors = validation_errors(validators::validate_create(&input(json!({
            "donor_name": "\u{0}\u{0}x",
            "donation_type": "food",
            "quantity": 1,
            "date": "2024-01-01"
        }))));
        assert_eq!(
            errors,
            vec!["donor_name: Donor name must not contain control characters"]
        );

        let errors = validation_errors(validators::validate_update(&input(json!({
            "donor_name": "Ann\tLee"
        }))));
        assert_eq!(
            errors,
            vec!["donor_name: Donor name must not contain control characters"]
        );
    }

    #[test]
    fn test_quantity_bounds() {
        let check = |quantity: serde_json::Value| {
            validators::validate_create(&input(json!({
                "donor_name": "Boundary",
                "donation_type": "money",
                "quantity": quantity,
                "date": "2024-01-01"
            })))
        };

        assert!(check(json!(1_000_000)).is_ok());
        assert!(check(json!(0.01)).is_ok());
        assert!(check(json!(0)).is_err());
        assert!(check(json!(-5)).is_err());
        assert!(check(json!(1_000_000.01)).is_err());
        assert!(check(json!("abc")).is_err());
        assert!(check(json!("NaN")).is_err());
        assert!(check(json!(true)).is_err());
    }

    #[test]
    fn test_every_donation_type_is_accepted() {
        for kind in DonationType::ALL {
            let record = validators::validate_create(&input(json!({
                "donor_name": "Typed Donor",
                "donation_type": kind.as_str(),
                "quantity": 1,
                "date": "2024-01-01"
            })))
            .unwrap();
            assert_eq!(record.donation_type, kind);
        }
    }

    #[test]
    fn test_invalid_dates_are_rejected() {
        for date in ["2024-13-01", "2024-02-30", "yesterday", ""] {
            let errors = validation_errors(validators::validate_create(&input(json!({
                "donor_name": "Dated",
                "donation_type": "books",
                "quantity": 1,
                "date": date
            }))));
            assert_eq!(errors, vec!["date: Date must be a valid ISO 8601 date"]);
        }
    }

    #[test]
    fn test_validate_update_empty_input() {
        let result = validators::validate_update(&input(json!({})));
        assert_eq!(
            result,
            Err(ApiError::InvalidArgument("no fields supplied".to_string()))
        );

        // null and unknown keys do not count as supplied fields
        let result = validators::validate_update(&input(json!({ "quantity": null, "note": "x" })));
        assert!(matches!(result, Err(ApiError::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_update_only_checks_supplied_fields() {
        let patch = validators::validate_update(&input(json!({ "quantity": 20 }))).unwrap();

        assert_eq!(
            patch,
            DonationPatch {
                quantity: Some(20.0),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_validate_update_reports_all_bad_fields() {
        let errors = validation_errors(validators::validate_update(&input(json!({
            "donor_name": "",
            "quantity": -1
        }))));

        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_patch_merge_keeps_absent_fields() {
        let current = Donation {
            id: 1,
            donor_name: "A. Smith".to_string(),
            donation_type: DonationType::Food,
            quantity: 12.0,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let patch = DonationPatch {
            donation_type: Some(DonationType::Books),
            ..Default::default()
        };

        let merged = patch.merge_onto(&current);
        assert_eq!(merged.donor_name, "A. Smith");
        assert_eq!(merged.donation_type, DonationType::Books);
        assert_eq!(merged.quantity, 12.0);
        assert_eq!(merged.date, current.date);
    }

    #[test]
    fn test_donation_type_round_trips_through_text() {
        for kind in DonationType::ALL {
            assert_eq!(kind.as_str().parse::<DonationType>().unwrap(), kind);
        }
        assert!("Food".parse::<DonationType>().is_err());
    }
}

#[cfg(test)]
mod route_tests {
    use crate::common::{migrations::run_migrations, AppState};
    use crate::donations::{donations_routes, DonationStore};
    use axum::{
        body::{to_bytes, Body},
        extract::Extension,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn setup_app() -> Router {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool, false).await.unwrap();

        let state = AppState::new(Arc::new(DonationStore::new(pool)));
        donations_routes().layer(Extension(Arc::new(state)))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_create_update_delete_lifecycle() {
        let app = setup_app().await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/donations",
            Some(json!({
                "donor_name": "A. Smith",
                "donation_type": "food",
                "quantity": 12,
                "date": "2024-03-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["success"], json!(true));
        assert_eq!(created["data"]["id"], json!(1));
        assert_eq!(created["data"]["created_at"], created["data"]["updated_at"]);

        let (status, updated) = send(
            &app,
            Method::PUT,
            "/api/donations/1",
            Some(json!({ "quantity": 20 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["donor_name"], json!("A. Smith"));
        assert_eq!(updated["data"]["quantity"], json!(20.0));
        assert_ne!(updated["data"]["updated_at"], created["data"]["updated_at"]);

        let (status, deleted) = send(&app, Method::DELETE, "/api/donations/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            deleted,
            json!({ "success": true, "message": "Donation deleted successfully" })
        );

        let (status, missing) = send(&app, Method::GET, "/api/donations/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["success"], json!(false));
    }

    #[tokio::test]
    async fn test_validation_failure_envelope() {
        let app = setup_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/donations",
            Some(json!({
                "donor_name": "X",
                "donation_type": "food",
                "quantity": 1,
                "date": "2024-01-01"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert_eq!(
            body["errors"],
            json!(["donor_name: Donor name must be between 2 and 100 characters"])
        );
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_list_is_wrapped_and_empty_by_default() {
        let app = setup_app().await;

        let (status, body) = send(&app, Method::GET, "/api/donations", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": [] }));
    }

    #[tokio::test]
    async fn test_bad_ids_are_client_errors_not_not_found() {
        let app = setup_app().await;

        for uri in ["/api/donations/abc", "/api/donations/-1", "/api/donations/0"] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["success"], json!(false));
        }

        let (status, _) = send(&app, Method::GET, "/api/donations/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_twice_is_not_found_both_times() {
        let app = setup_app().await;

        for _ in 0..2 {
            let (status, body) = send(&app, Method::DELETE, "/api/donations/5", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["success"], json!(false));
        }
    }

    #[tokio::test]
    async fn test_update_with_empty_body_is_rejected() {
        let app = setup_app().await;

        let (status, body) = send(&app, Method::PUT, "/api/donations/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("no fields supplied"));
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let app = setup_app().await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/donations")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_health() {
        let app = setup_app().await;

        let (status, body) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], json!("ok"));
    }
}
