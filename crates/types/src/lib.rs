//! Interface types for the meshdb initiator: identifiers, result tables,
//! responses, and collaborator traits.

pub mod identifiers;
pub mod response;
pub mod table;
pub mod traits;

pub use identifiers::{SiteId, TxnId};
pub use response::{ClientResponse, ResponseStatus, SiteResponse};
pub use table::{ColumnInfo, ColumnType, FieldValue, ResultTable};
pub use traits::{ClientChannel, InitiatorCallback};
