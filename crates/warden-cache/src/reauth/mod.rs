//! Single-use reauthentication proofs

mod proof_store;

pub use proof_store::ReauthProofStore;
