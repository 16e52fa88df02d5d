//! Purpose: Headless storefront core shared by the `prestige` CLI, hosts, and tests.
//! Exports: `api` (stable surface), `core` (stores, storage, validation, timers, errors).
//! Role: Owns catalog persistence, the session cart, form validation, and markup rendering.
//! Invariants: No ambient globals; all state lives in an owned `Storefront`.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod notice;
pub mod page;
pub mod render;
pub mod storage_paths;
pub mod storefront;
pub mod ui;
