pub mod tickets;
pub mod transactions;

pub use tickets::{MongoTicketStore, TicketStore};
pub use transactions::{MongoTransactionStore, TransactionStore};
