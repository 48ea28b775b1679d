//! Categories group transactions into named income or expense buckets, each
//! with a display colour for charts.
//!
//! The model and database queries live in [core], with one submodule per
//! HTTP endpoint.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    Category, CategoryKind, CategoryName, Color, NewCategory, create_category,
    create_category_table, get_categories_by_user, get_category,
};
pub(crate) use core::{delete_category, update_category};
pub(crate) use create_endpoint::create_category_endpoint;
pub(crate) use delete_endpoint::delete_category_endpoint;
pub(crate) use edit_endpoint::edit_category_endpoint;
pub(crate) use list_endpoint::{get_category_endpoint, list_categories_endpoint};
