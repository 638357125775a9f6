//! Shared building blocks for the reward-stream contracts.
//!
//! This crate provides:
//! - [`admin`]: single-administrator capability check with a two-step
//!   handover.
//! - [`reentrancy`]: the non-reentrant critical section that wraps every
//!   mutating entry point.
//!
//! Helpers report failure as `bool` / `Option`; each contract maps that onto
//! its own error enum.

#![cfg_attr(not(feature = "std"), no_std)]

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod admin;
pub mod reentrancy;

pub use reentrancy::ReentrancyGuard;
