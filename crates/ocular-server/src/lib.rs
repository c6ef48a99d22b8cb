//! HTTP inference service.
//!
//! `POST /predict` runs the fundus pipeline on an uploaded image; the
//! disease reference and a health probe are served alongside it. The router
//! is composable: [`router`] returns a `Router` that tests drive directly
//! and [`serve`] binds to a socket.

pub mod endpoints;
pub mod error;
pub mod router;
mod server;
mod state;

pub use error::{ApiError, ErrorBody};
pub use router::router;
pub use server::serve;
pub use state::AppState;
