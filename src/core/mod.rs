// Core modules implementing storage, the catalog and cart stores, validation, timers, and errors.
pub mod cart;
pub mod catalog;
pub mod error;
pub mod product;
pub mod reveal;
pub mod storage;
pub mod timer;
pub mod validate;
