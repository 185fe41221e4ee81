pub mod backend;
pub mod captcha;
pub mod config;
pub mod extract;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod session;
pub mod store;

pub use causelist_common::catalog;
pub use causelist_common::formatter;
pub use causelist_common::protocol;
pub use causelist_common::validation;

pub use backend::{Backend, BackendError, NavigationResult};
pub use pipeline::AcquisitionPipeline;
pub use resolver::SelectorResolver;
pub use session::SessionManager;
