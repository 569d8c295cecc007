use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::errors::Result;
use crate::models::transaction::{PaymentDetails, Transaction, TransactionStatus};

/// Ledger of purchase records. Every status change is a compare-and-swap on
/// the expected prior status, which makes notification replay and concurrent
/// scans safe.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create(&self, transaction: &Transaction) -> Result<()>;

    async fn transaction_by_id(&self, id: &str) -> Result<Option<Transaction>>;

    /// Caller's transactions, newest first.
    async fn transactions_by_user(&self, user_id: &str) -> Result<Vec<Transaction>>;

    /// Idempotent: repeating the same write leaves the same details in place.
    async fn attach_payment_details(&self, id: &str, details: &PaymentDetails) -> Result<()>;

    /// Applies `from -> to` only if the stored status is still `from`.
    /// Returns whether the transition happened.
    async fn transition(
        &self,
        id: &str,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<bool>;

    /// `paid -> used` stamping scan metadata, conditional on `paid`.
    /// Returns whether this caller won the redemption.
    async fn redeem(&self, id: &str, scanned_by: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct MongoTransactionStore {
    db: Database,
}

impl MongoTransactionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Transaction> {
        self.db.collection("transactions")
    }
}

#[async_trait]
impl TransactionStore for MongoTransactionStore {
    async fn create(&self, transaction: &Transaction) -> Result<()> {
        self.collection().insert_one(transaction).await?;
        Ok(())
    }

    async fn transaction_by_id(&self, id: &str) -> Result<Option<Transaction>> {
        let object_id = ObjectId::parse_str(id)?;
        let transaction = self.collection().find_one(doc! { "_id": object_id }).await?;
        Ok(transaction)
    }

    async fn transactions_by_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let cursor = self
            .collection()
            .find(doc! { "user_id": user_id })
            .sort(doc! { "created_at": -1 })
            .await?;

        let transactions: Vec<Transaction> = cursor.try_collect().await?;
        Ok(transactions)
    }

    async fn attach_payment_details(&self, id: &str, details: &PaymentDetails) -> Result<()> {
        let object_id = ObjectId::parse_str(id)?;

        let filter = doc! { "_id": object_id };
        let update = doc! {
            "$set": {
                "payment_details": bson::to_bson(details)?,
                "updated_at": Utc::now(),
            }
        };

        self.collection().update_one(filter, update).await?;
        Ok(())
    }

    async fn transition(
        &self,
        id: &str,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<bool> {
        let object_id = ObjectId::parse_str(id)?;

        let filter = doc! { "_id": object_id, "status": from.as_str() };
        let update = doc! {
            "$set": {
                "status": to.as_str(),
                "updated_at": Utc::now(),
            }
        };

        let result = self.collection().update_one(filter, update).await?;
        Ok(result.modified_count == 1)
    }

    async fn redeem(&self, id: &str, scanned_by: &str) -> Result<bool> {
        let object_id = ObjectId::parse_str(id)?;

        let filter = doc! {
            "_id": object_id,
            "status": TransactionStatus::Paid.as_str(),
        };
        let update = doc! {
            "$set": {
                "status": TransactionStatus::Used.as_str(),
                "scanned_at": bson::DateTime::now(),
                "scanned_by": scanned_by,
                "updated_at": Utc::now(),
            }
        };

        let result = self.collection().update_one(filter, update).await?;
        Ok(result.modified_count == 1)
    }
}
