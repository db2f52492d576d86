//! # Process Layer
//!
//! Everything that touches the script's OS process lives here.
//!
//! ## Modules
//!
//! - **`launcher`**: Validates the script and builds the `<interpreter> <script> [args...]`
//!   invocation, including output redirection and the child's environment.
//! - **`controller`**: The lifecycle state machine (`Unstarted -> Running -> Finished`).
//!   It is the only owner of the process handle and its streams.
//! - **`channel`**: The single-worker request/response protocol used by interactive calls
//!   and by the batch wait.
//! - **`error`**: The error taxonomy and the translation of non-zero exits into failures
//!   carrying the script's stderr.

pub mod channel;
pub mod controller;
pub mod error;
pub mod launcher;
