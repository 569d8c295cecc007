// services/ticketing.rs
//
// Ticket inventory and transaction lifecycle. This is the only part of the
// system with real state-transition and concurrency concerns; everything it
// touches goes through conditional store updates, never read-then-write.

use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::errors::{AppError, Result};
use crate::models::transaction::{PaymentOutcome, Transaction, TransactionStatus};
use crate::repositories::{TicketStore, TransactionStore};
use crate::services::payment_gateway::MockPaymentGateway;

/// What a notification delivery actually did, for the gateway-facing reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationResult {
    Settled,
    Failed,
    /// The transaction had already left `pending`; duplicate or out-of-order
    /// delivery, nothing was applied.
    AlreadyProcessed,
    /// Gateway status we do not act on.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ScanReceipt {
    pub ticket_name: String,
    pub event_id: String,
    pub holder_id: String,
}

#[derive(Clone)]
pub struct TicketingService {
    tickets: Arc<dyn TicketStore>,
    transactions: Arc<dyn TransactionStore>,
    gateway: MockPaymentGateway,
}

impl TicketingService {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        transactions: Arc<dyn TransactionStore>,
        gateway: MockPaymentGateway,
    ) -> Self {
        Self {
            tickets,
            transactions,
            gateway,
        }
    }

    /// Reserves stock, records a pending transaction and attaches a mock
    /// payment intent. Stock is decremented before the transaction is
    /// inserted; if the insert fails the reservation is released again.
    pub async fn checkout(
        &self,
        user_id: &str,
        ticket_id: &str,
        quantity: i64,
        payment_method: Option<String>,
    ) -> Result<Transaction> {
        if quantity <= 0 {
            return Err(AppError::invalid_data("Quantity must be a positive integer"));
        }

        let ticket = self
            .tickets
            .ticket_by_id(ticket_id)
            .await?
            .ok_or(AppError::TicketNotFound)?;

        // Price at read time; concurrent price changes are not re-validated.
        let total_price = ticket.price * quantity as f64;

        let reserved = self.tickets.reserve_stock(ticket_id, quantity).await?;
        if !reserved {
            return Err(AppError::InsufficientStock);
        }

        let now = Utc::now();
        let mut transaction = Transaction {
            id: Some(ObjectId::new()),
            user_id: user_id.to_string(),
            ticket_id: ticket_id.to_string(),
            ticket_name: ticket.name.clone(),
            event_id: ticket.event_id.clone(),
            quantity,
            total_price,
            payment_method: payment_method.unwrap_or_else(|| "bank_transfer".to_string()),
            payment_details: None,
            status: TransactionStatus::Pending,
            scanned_at: None,
            scanned_by: None,
            created_at: now,
            updated_at: now,
        };

        let transaction_id = transaction.id.map(|id| id.to_hex()).unwrap_or_default();

        if let Err(e) = self.transactions.create(&transaction).await {
            // Compensate so the reservation does not leak without a record.
            if let Err(release_err) = self.tickets.release_stock(ticket_id, quantity).await {
                tracing::error!(
                    "failed to release stock for ticket {} after aborted checkout: {}",
                    ticket_id,
                    release_err
                );
            }
            return Err(e);
        }

        let details = self.gateway.create_intent(&transaction_id);
        self.transactions
            .attach_payment_details(&transaction_id, &details)
            .await?;
        transaction.payment_details = Some(details);

        tracing::info!(
            "checkout: user {} reserved {} x ticket {} (transaction {})",
            user_id,
            quantity,
            ticket_id,
            transaction_id
        );

        Ok(transaction)
    }

    /// Consumes a gateway notification. Transitions are compare-and-swap on
    /// `pending`, so replays and out-of-order deliveries are no-ops and the
    /// stock restore on failure runs exactly once per transaction.
    pub async fn handle_notification(
        &self,
        transaction_id: &str,
        gateway_status: &str,
    ) -> Result<NotificationResult> {
        let transaction = self
            .transactions
            .transaction_by_id(transaction_id)
            .await?
            .ok_or(AppError::TransactionNotFound)?;

        let outcome = match PaymentOutcome::from_gateway_status(gateway_status) {
            Some(outcome) => outcome,
            None => {
                tracing::debug!(
                    "ignoring gateway status '{}' for transaction {}",
                    gateway_status,
                    transaction_id
                );
                return Ok(NotificationResult::Ignored);
            }
        };

        match outcome {
            PaymentOutcome::Settled => {
                let applied = self
                    .transactions
                    .transition(
                        transaction_id,
                        TransactionStatus::Pending,
                        TransactionStatus::Paid,
                    )
                    .await?;

                if applied {
                    tracing::info!("transaction {} settled", transaction_id);
                    Ok(NotificationResult::Settled)
                } else {
                    Ok(NotificationResult::AlreadyProcessed)
                }
            }
            PaymentOutcome::Failed => {
                let applied = self
                    .transactions
                    .transition(
                        transaction_id,
                        TransactionStatus::Pending,
                        TransactionStatus::Failed,
                    )
                    .await?;

                if !applied {
                    return Ok(NotificationResult::AlreadyProcessed);
                }

                // Guarded by the transition above: only the delivery that
                // actually flipped the status returns the stock.
                self.tickets
                    .release_stock(&transaction.ticket_id, transaction.quantity)
                    .await?;

                tracing::info!(
                    "transaction {} failed, returned {} to ticket {}",
                    transaction_id,
                    transaction.quantity,
                    transaction.ticket_id
                );
                Ok(NotificationResult::Failed)
            }
        }
    }

    /// Redeems a paid transaction at the gate. The `paid -> used` flip is a
    /// single conditional write, so concurrent scans of the same code yield
    /// exactly one success.
    pub async fn scan(&self, code: &str, scanned_by: &str) -> Result<ScanReceipt> {
        let transaction = self
            .transactions
            .transaction_by_id(code)
            .await?
            .ok_or(AppError::TransactionNotFound)?;

        match transaction.status {
            TransactionStatus::Used => return Err(AppError::TicketAlreadyUsed),
            TransactionStatus::Pending | TransactionStatus::Failed => {
                return Err(AppError::TicketNotPayable)
            }
            TransactionStatus::Paid => {}
        }

        let redeemed = self.transactions.redeem(code, scanned_by).await?;
        if !redeemed {
            // Another scanner won the race between our read and the write.
            return Err(AppError::TicketAlreadyUsed);
        }

        tracing::info!("transaction {} redeemed by {}", code, scanned_by);

        Ok(ScanReceipt {
            ticket_name: transaction.ticket_name,
            event_id: transaction.event_id,
            holder_id: transaction.user_id,
        })
    }

    pub async fn user_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        self.transactions.transactions_by_user(user_id).await
    }
}
