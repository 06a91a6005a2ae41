pub mod catalog;
pub mod schema;

pub use catalog::Catalog;
pub use schema::{CollectionSchema, FieldDef, FieldKind, ParamBinding, ParamOp};
