pub mod schema;
pub mod validate;

pub use schema::SchemaCmd;
pub use validate::ValidateCmd;
