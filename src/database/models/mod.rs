pub mod credit_card;
pub mod loan;
pub mod transaction;

pub use credit_card::CreditCardSnapshot;
pub use loan::LoanSnapshot;
pub use transaction::{Direction, Transaction};
