pub mod erp;
pub mod sqlite;
pub mod traits;

pub use erp::ErpSalesClient;
pub use sqlite::SqliteSource;
pub use traits::{SalesSource, VisitSource};
