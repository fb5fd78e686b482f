//! Domain models with validation at construction
//!
//! Request input is validated when crossing the HTTP boundary. Invalid
//! input returns ValidationError, not panic.

pub mod validation;
pub mod category;
pub mod product;
pub mod user;

pub use validation::{require_name, ValidationError};
pub use category::{Category, CategoryPatch, CreateCategoryRequest};
pub use product::{CreateProductRequest, Product, ProductPatch};
pub use user::{derive_token, CreateUserRequest, User, Username};
