mod common;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use videyhost::error::VideyError;
use videyhost::models::PaymentStatus;
use videyhost::services::withdrawal::DEFAULT_MIN_WITHDRAWAL;
use videyhost::services::WithdrawalFlow;

async fn mock_page(server: &mut ServerGuard, balance: &str) {
    server
        .mock("GET", "/api/total-balance")
        .match_query(Matcher::UrlEncoded("user_id".into(), "12".into()))
        .with_body(json!({ "total_balance": balance }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/api/user-payment-methods/12")
        .with_body(
            json!([{
                "id": 3,
                "user_id": 12,
                "payment_method": "Dana",
                "receiver_name": "Rina",
                "account_number": "081234567890",
                "bank_name": null
            }])
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/payment-requests/12")
        .with_body(
            json!([
                {"request_id": 1, "amount": "100000", "status": "approved", "requested_at": "2024-09-01 10:00:00"},
                {"request_id": 2, "amount": 200000, "status": "pending", "requested_at": "2024-10-01T10:00:00Z"}
            ])
            .to_string(),
        )
        .create_async()
        .await;
}

#[tokio::test]
async fn low_balance_blocks_withdrawal_without_posting() {
    let mut server = Server::new_async().await;
    mock_page(&mut server, "50000").await;
    let submit = server
        .mock("POST", "/api/payment-request")
        .expect(0)
        .create_async()
        .await;

    let mut flow = WithdrawalFlow::load(common::api(&server), 12, DEFAULT_MIN_WITHDRAWAL)
        .await
        .unwrap();

    assert_eq!(flow.balance(), Some(50_000.0));
    let options = flow.options();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].id, "max");
    assert!(!options[0].enabled);

    assert!(matches!(
        flow.select("max"),
        Err(VideyError::BelowMinimumWithdrawal { .. })
    ));
    assert!(matches!(flow.confirm().await, Err(VideyError::NoPendingWithdrawal)));

    submit.assert_async().await;
}

#[tokio::test]
async fn confirm_rechecks_the_minimum() {
    let mut server = Server::new_async().await;
    mock_page(&mut server, "120000").await;
    let submit = server
        .mock("POST", "/api/payment-request")
        .expect(0)
        .create_async()
        .await;

    // A 100k tier is offered, but the configured minimum is higher.
    let mut flow = WithdrawalFlow::load(common::api(&server), 12, 150_000.0)
        .await
        .unwrap();
    assert_ok!(flow.select("100k"));

    assert_err!(flow.confirm().await);
    assert!(flow.pending().is_none());
    submit.assert_async().await;
}

#[tokio::test]
async fn confirmed_withdrawal_updates_balance_and_history() {
    let mut server = Server::new_async().await;
    mock_page(&mut server, "350000").await;
    let submit = server
        .mock("POST", "/api/payment-request")
        .match_body(Matcher::Json(json!({
            "user_id": 12,
            "payment_method": "Dana",
            "payment_account": "081234567890",
            "withdrawal_id": "200k"
        })))
        .with_status(201)
        .with_body(
            json!({
                "request_id": 3,
                "user_id": 12,
                "amount": 200000,
                "status": "pending",
                "requested_at": "2024-10-19T09:00:00Z",
                "new_balance": 150000
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mut flow = WithdrawalFlow::load(common::api(&server), 12, DEFAULT_MIN_WITHDRAWAL)
        .await
        .unwrap();
    let ids: Vec<String> = flow.options().into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec!["100k", "200k", "300k", "max"]);

    assert_eq!(flow.select("200k").unwrap().amount, 200_000.0);
    let request = flow.confirm().await.unwrap();

    assert_eq!(request.request_id, Some(3));
    assert_eq!(request.status, PaymentStatus::Pending);
    assert_eq!(flow.balance(), Some(150_000.0));
    assert!(flow.pending().is_none());

    let history = flow.requests();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].request_id, Some(3));
    assert_eq!(history[1].request_id, Some(2));
    assert_eq!(history[2].status, PaymentStatus::Approved);

    submit.assert_async().await;
}

#[tokio::test]
async fn rejected_submission_keeps_balance() {
    let mut server = Server::new_async().await;
    mock_page(&mut server, "350000").await;
    server
        .mock("POST", "/api/payment-request")
        .with_status(400)
        .with_body(r#"{"message": "Insufficient balance"}"#)
        .create_async()
        .await;

    let mut flow = WithdrawalFlow::load(common::api(&server), 12, DEFAULT_MIN_WITHDRAWAL)
        .await
        .unwrap();
    flow.select("max").unwrap();

    let err = flow.confirm().await.unwrap_err();
    assert!(matches!(err, VideyError::Api { ref message, .. } if message == "Insufficient balance"));
    assert_eq!(flow.balance(), Some(350_000.0));
    assert!(flow.pending().is_none());
    assert_eq!(flow.requests().len(), 2);
}
