pub mod provider;
pub mod types;

pub use types::Invoice;
