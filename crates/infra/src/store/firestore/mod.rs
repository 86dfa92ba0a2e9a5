//! Firestore (REST v1) document store.
//!
//! The typed-value codec is always compiled; the HTTP client needs the
//! `firestore` feature.

pub mod codec;

#[cfg(feature = "firestore")]
pub mod client;

#[cfg(feature = "firestore")]
pub use client::FirestoreStore;
