pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod paging;
pub mod scroll;
pub mod storage;

pub use catalog::{Catalog, Record};
pub use config::AppConfig;
pub use controller::{DirectoryController, DirectoryEvent, View};
pub use error::{Error, Result};
pub use filter::FilterCriteria;
