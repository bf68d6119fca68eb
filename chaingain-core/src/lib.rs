//! `chaingain-core` coordinates a vocabulary learning session against the
//! ChainGain backend.
//!
//! The crate is split along the lifecycle of a session:
//!
//! - [`AccountProvisioner`] makes sure the device has a persisted identity
//!   before any answer is verified.
//! - [`VerificationClient`] checks a single answer and normalises the
//!   backend's reply, failing closed.
//! - [`Card`] and [`Session`] are pure state machines driving the
//!   "Submit / Next" interaction for each vocabulary item.
//! - [`ChainGain`] wires the pieces together for a front end.
//!
//! Persistence is supplied by the host through the
//! [`storage::PersistentStore`] trait.
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod account;
pub use account::*;

mod certificate;
pub use certificate::*;

mod client;
pub use client::*;

mod config;
pub use config::*;

mod deck;
pub use deck::*;

mod error;
pub use error::*;

pub mod logger;

mod session;
pub use session::*;

pub mod storage;

mod verification;
pub use verification::*;

// private modules
mod http_request;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!("chaingain_core");
