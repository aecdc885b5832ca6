//! Catalog read operations

pub mod list_categories;
pub mod list_data_types;

pub use list_categories::{CategoryInfo, ListCategoriesError, ListCategoriesQuery};
pub use list_data_types::{DataTypeInfo, ListDataTypesError, ListDataTypesQuery};
