//! # kyc-core -- Foundational Types for the KYC Wizard
//!
//! Defines the value model shared by the wizard and the remote client.
//! Every other crate in the workspace depends on `kyc-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `GhanaCardNumber`, `MomoNumber`
//!    and `CountryCode` validate their format at construction time. Raw form
//!    input stays a `String` until it crosses into a request.
//!
//! 2. **One statically typed form.** `FormValues` has a named field for every
//!    input of every step. There is no untyped bag of values.
//!
//! 3. **Cheap, immutable file references.** `FileRef` shares its bytes, so a
//!    snapshot of the form is a deep copy in meaning without copying images.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `kyc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod form;
pub mod identity;

pub use error::ValidationError;
pub use form::{FileId, FileRef, FormField, FormValues, MomoDetails};
pub use identity::{CountryCode, GhanaCardNumber, MomoNumber, GHANA_COUNTRY_CODE};
