// End-to-end tests for the ticketing core (checkout, payment notification,
// gate scan) against in-memory store doubles. The doubles mirror the
// conditional-update semantics of the Mongo stores: every mutation checks its
// precondition under the lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson;

use gatepass_api::errors::{AppError, Result};
use gatepass_api::models::ticket::{TicketStatus, TicketType};
use gatepass_api::models::transaction::{PaymentDetails, Transaction, TransactionStatus};
use gatepass_api::repositories::{TicketStore, TransactionStore};
use gatepass_api::services::payment_gateway::MockPaymentGateway;
use gatepass_api::services::ticketing::{NotificationResult, TicketingService};

#[derive(Default)]
struct MemTicketStore {
    tickets: Mutex<HashMap<String, TicketType>>,
}

impl MemTicketStore {
    fn seed(&self, id: &str, ticket: TicketType) {
        self.tickets.lock().unwrap().insert(id.to_string(), ticket);
    }
}

#[async_trait]
impl TicketStore for MemTicketStore {
    async fn ticket_by_id(&self, id: &str) -> Result<Option<TicketType>> {
        Ok(self.tickets.lock().unwrap().get(id).cloned())
    }

    async fn reserve_stock(&self, id: &str, quantity: i64) -> Result<bool> {
        let mut tickets = self.tickets.lock().unwrap();
        match tickets.get_mut(id) {
            Some(ticket) if ticket.stock >= quantity => {
                ticket.stock -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_stock(&self, id: &str, quantity: i64) -> Result<()> {
        let mut tickets = self.tickets.lock().unwrap();
        if let Some(ticket) = tickets.get_mut(id) {
            ticket.stock += quantity;
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemTransactionStore {
    transactions: Mutex<HashMap<String, Transaction>>,
}

#[async_trait]
impl TransactionStore for MemTransactionStore {
    async fn create(&self, transaction: &Transaction) -> Result<()> {
        let id = transaction.id.expect("transaction id assigned").to_hex();
        self.transactions
            .lock()
            .unwrap()
            .insert(id, transaction.clone());
        Ok(())
    }

    async fn transaction_by_id(&self, id: &str) -> Result<Option<Transaction>> {
        Ok(self.transactions.lock().unwrap().get(id).cloned())
    }

    async fn transactions_by_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let mut txs: Vec<Transaction> = self
            .transactions
            .lock()
            .unwrap()
            .values()
            .filter(|tx| tx.user_id == user_id)
            .cloned()
            .collect();
        txs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(txs)
    }

    async fn attach_payment_details(&self, id: &str, details: &PaymentDetails) -> Result<()> {
        if let Some(tx) = self.transactions.lock().unwrap().get_mut(id) {
            tx.payment_details = Some(details.clone());
        }
        Ok(())
    }

    async fn transition(
        &self,
        id: &str,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<bool> {
        let mut txs = self.transactions.lock().unwrap();
        match txs.get_mut(id) {
            Some(tx) if tx.status == from => {
                tx.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn redeem(&self, id: &str, scanned_by: &str) -> Result<bool> {
        let mut txs = self.transactions.lock().unwrap();
        match txs.get_mut(id) {
            Some(tx) if tx.status == TransactionStatus::Paid => {
                tx.status = TransactionStatus::Used;
                tx.scanned_at = Some(bson::DateTime::now());
                tx.scanned_by = Some(scanned_by.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn ticket(event_id: &str, name: &str, price: f64, quota: i64) -> TicketType {
    let now = Utc::now();
    TicketType {
        id: None,
        event_id: event_id.to_string(),
        name: name.to_string(),
        description: None,
        price,
        quota,
        stock: quota,
        sales_start: None,
        sales_end: None,
        status: TicketStatus::Available,
        created_at: now,
        updated_at: now,
    }
}

fn setup(
    ticket_id: &str,
    seeded: TicketType,
) -> (
    TicketingService,
    Arc<MemTicketStore>,
    Arc<MemTransactionStore>,
) {
    let tickets = Arc::new(MemTicketStore::default());
    tickets.seed(ticket_id, seeded);
    let transactions = Arc::new(MemTransactionStore::default());

    let service = TicketingService::new(
        tickets.clone(),
        transactions.clone(),
        MockPaymentGateway::new("https://pay.test".to_string()),
    );

    (service, tickets, transactions)
}

async fn stock_of(tickets: &MemTicketStore, id: &str) -> i64 {
    tickets.ticket_by_id(id).await.unwrap().unwrap().stock
}

#[tokio::test]
async fn checkout_reserves_stock_and_creates_pending_transaction() {
    let (service, tickets, _) = setup("tkt-1", ticket("evt-1", "Early Bird", 50.0, 10));

    let tx = service.checkout("user-1", "tkt-1", 3, None).await.unwrap();

    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.quantity, 3);
    assert_eq!(tx.total_price, 150.0);
    assert_eq!(tx.ticket_name, "Early Bird");
    assert_eq!(tx.event_id, "evt-1");
    assert_eq!(tx.payment_method, "bank_transfer");
    assert_eq!(stock_of(&tickets, "tkt-1").await, 7);

    let details = tx.payment_details.expect("payment intent attached");
    let id = tx.id.unwrap().to_hex();
    assert_eq!(details.payment_url, format!("https://pay.test/pay/{}", id));
    assert_eq!(details.va_number.len(), 10);
    assert!(details.expiry_time > Utc::now());
}

#[tokio::test]
async fn checkout_with_insufficient_stock_leaves_inventory_untouched() {
    let (service, tickets, transactions) = setup("tkt-1", {
        let mut t = ticket("evt-1", "VIP", 100.0, 10);
        t.stock = 2;
        t
    });

    let err = service.checkout("user-1", "tkt-1", 5, None).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock));
    assert_eq!(stock_of(&tickets, "tkt-1").await, 2);
    assert!(transactions
        .transactions_by_user("user-1")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn checkout_rejects_non_positive_quantity() {
    let (service, tickets, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 5));

    for quantity in [0, -1] {
        let err = service
            .checkout("user-1", "tkt-1", quantity, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
    assert_eq!(stock_of(&tickets, "tkt-1").await, 5);
}

#[tokio::test]
async fn checkout_unknown_ticket_is_not_found() {
    let (service, _, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 5));

    let err = service.checkout("user-1", "missing", 1, None).await.unwrap_err();
    assert!(matches!(err, AppError::TicketNotFound));
}

#[tokio::test]
async fn settlement_marks_transaction_paid_without_touching_stock() {
    let (service, tickets, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let tx = service.checkout("user-1", "tkt-1", 2, None).await.unwrap();
    let id = tx.id.unwrap().to_hex();

    let result = service.handle_notification(&id, "settlement").await.unwrap();
    assert_eq!(result, NotificationResult::Settled);

    let stored = service.user_transactions("user-1").await.unwrap();
    assert_eq!(stored[0].status, TransactionStatus::Paid);
    assert_eq!(stock_of(&tickets, "tkt-1").await, 8);
}

#[tokio::test]
async fn failure_notification_fails_transaction_and_restores_stock() {
    let (service, tickets, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let tx = service.checkout("user-1", "tkt-1", 3, None).await.unwrap();
    let id = tx.id.unwrap().to_hex();
    assert_eq!(stock_of(&tickets, "tkt-1").await, 7);

    let result = service.handle_notification(&id, "expire").await.unwrap();
    assert_eq!(result, NotificationResult::Failed);

    let stored = service.user_transactions("user-1").await.unwrap();
    assert_eq!(stored[0].status, TransactionStatus::Failed);
    assert_eq!(stock_of(&tickets, "tkt-1").await, 10);
}

#[tokio::test]
async fn duplicate_failure_notifications_restore_stock_exactly_once() {
    let (service, tickets, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let tx = service.checkout("user-1", "tkt-1", 3, None).await.unwrap();
    let id = tx.id.unwrap().to_hex();

    assert_eq!(
        service.handle_notification(&id, "expire").await.unwrap(),
        NotificationResult::Failed
    );
    for _ in 0..3 {
        assert_eq!(
            service.handle_notification(&id, "expire").await.unwrap(),
            NotificationResult::AlreadyProcessed
        );
    }

    // Stock restored once, never beyond the quota.
    assert_eq!(stock_of(&tickets, "tkt-1").await, 10);
}

#[tokio::test]
async fn duplicate_settlements_apply_once() {
    let (service, _, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let tx = service.checkout("user-1", "tkt-1", 1, None).await.unwrap();
    let id = tx.id.unwrap().to_hex();

    assert_eq!(
        service.handle_notification(&id, "settlement").await.unwrap(),
        NotificationResult::Settled
    );
    assert_eq!(
        service.handle_notification(&id, "success").await.unwrap(),
        NotificationResult::AlreadyProcessed
    );
}

#[tokio::test]
async fn settlement_after_failure_is_not_applied() {
    let (service, tickets, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let tx = service.checkout("user-1", "tkt-1", 2, None).await.unwrap();
    let id = tx.id.unwrap().to_hex();

    service.handle_notification(&id, "cancel").await.unwrap();
    let result = service.handle_notification(&id, "settlement").await.unwrap();
    assert_eq!(result, NotificationResult::AlreadyProcessed);

    let stored = service.user_transactions("user-1").await.unwrap();
    assert_eq!(stored[0].status, TransactionStatus::Failed);
    assert_eq!(stock_of(&tickets, "tkt-1").await, 10);
}

#[tokio::test]
async fn unknown_gateway_status_is_ignored() {
    let (service, tickets, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let tx = service.checkout("user-1", "tkt-1", 2, None).await.unwrap();
    let id = tx.id.unwrap().to_hex();

    let result = service.handle_notification(&id, "challenge").await.unwrap();
    assert_eq!(result, NotificationResult::Ignored);

    let stored = service.user_transactions("user-1").await.unwrap();
    assert_eq!(stored[0].status, TransactionStatus::Pending);
    assert_eq!(stock_of(&tickets, "tkt-1").await, 8);
}

#[tokio::test]
async fn notification_for_unknown_transaction_is_not_found() {
    let (service, _, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let err = service
        .handle_notification("64b0c0ffee0000000000aaaa", "settlement")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransactionNotFound));
}

#[tokio::test]
async fn scan_redeems_paid_ticket_once() {
    let (service, _, transactions) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let tx = service.checkout("user-1", "tkt-1", 1, None).await.unwrap();
    let id = tx.id.unwrap().to_hex();
    service.handle_notification(&id, "settlement").await.unwrap();

    let receipt = service.scan(&id, "checker-1").await.unwrap();
    assert_eq!(receipt.ticket_name, "GA");
    assert_eq!(receipt.event_id, "evt-1");
    assert_eq!(receipt.holder_id, "user-1");

    let stored = transactions.transaction_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Used);
    assert!(stored.scanned_at.is_some());
    assert_eq!(stored.scanned_by.as_deref(), Some("checker-1"));

    // Second scan is rejected.
    let err = service.scan(&id, "checker-2").await.unwrap_err();
    assert!(matches!(err, AppError::TicketAlreadyUsed));
}

#[tokio::test]
async fn scan_rejects_unpaid_transactions() {
    let (service, _, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let pending = service.checkout("user-1", "tkt-1", 1, None).await.unwrap();
    let pending_id = pending.id.unwrap().to_hex();
    let err = service.scan(&pending_id, "checker-1").await.unwrap_err();
    assert!(matches!(err, AppError::TicketNotPayable));

    let failed = service.checkout("user-1", "tkt-1", 1, None).await.unwrap();
    let failed_id = failed.id.unwrap().to_hex();
    service.handle_notification(&failed_id, "deny").await.unwrap();
    let err = service.scan(&failed_id, "checker-1").await.unwrap_err();
    assert!(matches!(err, AppError::TicketNotPayable));
}

#[tokio::test]
async fn scan_unknown_code_is_not_found() {
    let (service, _, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let err = service
        .scan("64b0c0ffee0000000000bbbb", "checker-1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransactionNotFound));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_never_oversell() {
    let (service, tickets, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 5));

    let mut handles = Vec::new();
    for i in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.checkout(&format!("user-{}", i), "tkt-1", 1, None).await
        }));
    }

    let mut successes = 0;
    let mut stock_errors = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::InsufficientStock) => stock_errors += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(successes, 5);
    assert_eq!(stock_errors, 5);
    assert_eq!(stock_of(&tickets, "tkt-1").await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scans_redeem_exactly_once() {
    let (service, _, _) = setup("tkt-1", ticket("evt-1", "GA", 20.0, 10));

    let tx = service.checkout("user-1", "tkt-1", 1, None).await.unwrap();
    let id = tx.id.unwrap().to_hex();
    service.handle_notification(&id, "settlement").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            service.scan(&id, &format!("checker-{}", i)).await
        }));
    }

    let mut successes = 0;
    let mut already_used = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::TicketAlreadyUsed) => already_used += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(already_used, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stock_stays_within_bounds_under_mixed_load() {
    let quota = 8;
    let (service, tickets, _) = setup("tkt-1", ticket("evt-1", "GA", 10.0, quota));

    // Interleave checkouts with failure notifications for half of them.
    let mut checkout_handles = Vec::new();
    for i in 0..12 {
        let service = service.clone();
        checkout_handles.push(tokio::spawn(async move {
            service.checkout(&format!("user-{}", i), "tkt-1", 1, None).await
        }));
    }

    let mut created = Vec::new();
    for handle in checkout_handles {
        if let Ok(tx) = handle.await.unwrap() {
            created.push(tx.id.unwrap().to_hex());
        }
    }

    let mut notify_handles = Vec::new();
    for (i, id) in created.iter().enumerate() {
        let service = service.clone();
        let id = id.clone();
        let status = if i % 2 == 0 { "expire" } else { "settlement" };
        // Deliver each notification twice to exercise idempotency.
        notify_handles.push(tokio::spawn(async move {
            let _ = service.handle_notification(&id, status).await;
            let _ = service.handle_notification(&id, status).await;
        }));
    }
    for handle in notify_handles {
        handle.await.unwrap();
    }

    let stock = stock_of(&tickets, "tkt-1").await;
    assert!(stock >= 0, "stock went negative: {}", stock);
    assert!(stock <= quota, "stock exceeded quota: {}", stock);

    // Every failed checkout returned its unit; paid ones still hold theirs.
    let failed = created.len() - created.len() / 2;
    let expected = quota - created.len() as i64 + failed as i64;
    assert_eq!(stock, expected);
}
