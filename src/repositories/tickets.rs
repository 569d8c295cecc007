use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::errors::Result;
use crate::models::ticket::TicketType;

/// Inventory side of the checkout flow. Both mutations are conditional
/// single-document updates so concurrent checkouts cannot lose writes.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn ticket_by_id(&self, id: &str) -> Result<Option<TicketType>>;

    /// Decrements stock by `quantity` only if at least that much remains.
    /// Returns whether the reservation was applied.
    async fn reserve_stock(&self, id: &str, quantity: i64) -> Result<bool>;

    /// Returns previously reserved stock. Callers guarantee at most one
    /// release per failed transaction.
    async fn release_stock(&self, id: &str, quantity: i64) -> Result<()>;
}

#[derive(Clone)]
pub struct MongoTicketStore {
    db: Database,
}

impl MongoTicketStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<TicketType> {
        self.db.collection("tickets")
    }
}

#[async_trait]
impl TicketStore for MongoTicketStore {
    async fn ticket_by_id(&self, id: &str) -> Result<Option<TicketType>> {
        let object_id = ObjectId::parse_str(id)?;
        let ticket = self.collection().find_one(doc! { "_id": object_id }).await?;
        Ok(ticket)
    }

    async fn reserve_stock(&self, id: &str, quantity: i64) -> Result<bool> {
        let object_id = ObjectId::parse_str(id)?;

        // The stock precondition lives in the filter, so two racing
        // checkouts can never both decrement past zero.
        let filter = doc! {
            "_id": object_id,
            "stock": { "$gte": quantity },
        };
        let update = doc! {
            "$inc": { "stock": -quantity },
            "$set": { "updated_at": Utc::now() },
        };

        let result = self.collection().update_one(filter, update).await?;
        Ok(result.modified_count == 1)
    }

    async fn release_stock(&self, id: &str, quantity: i64) -> Result<()> {
        let object_id = ObjectId::parse_str(id)?;

        let filter = doc! { "_id": object_id };
        let update = doc! {
            "$inc": { "stock": quantity },
            "$set": { "updated_at": Utc::now() },
        };

        self.collection().update_one(filter, update).await?;
        Ok(())
    }
}
