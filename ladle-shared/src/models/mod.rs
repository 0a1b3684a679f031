/// Database models for Ladle
///
/// This module contains all database models and their CRUD operations.
/// Tag, Ingredient, and Recipe queries are always scoped to an owning
/// user; cross-user rows behave as if they do not exist.
///
/// # Models
///
/// - `user`: accounts, credentials, and email normalization
/// - `tag`: per-user recipe labels
/// - `ingredient`: per-user recipe components
/// - `recipe`: recipes with decimal prices, image paths, and
///   many-to-many links to tags and ingredients
pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;
