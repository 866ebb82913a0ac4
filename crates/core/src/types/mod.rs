//! Core types for Digi.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod status;
pub mod user;

pub use cart::{LineItem, ProductRef};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, PaymentInfo};
pub use price::Price;
pub use status::*;
pub use user::User;
