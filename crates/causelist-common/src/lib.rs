pub mod catalog;
pub mod error;
pub mod formatter;
pub mod protocol;
pub mod validation;

pub use catalog::FallbackCatalog;
pub use error::BackendError;
pub use protocol::{
    AcquisitionResult, CaseRecord, CauseListRequest, DocumentMetadata, ListType, LocationPath,
    Locator, OptionSource, RecordSource, ResolvedOptions, SelectOption,
};
pub use validation::{RequestFields, ValidationError};
