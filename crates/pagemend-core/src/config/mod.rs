pub mod schema;

pub use schema::PageMendConfig;
