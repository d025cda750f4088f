//! Durable stores. Traits are the seam the core services depend on; the
//! Postgres implementations are what the server wires in.

pub mod answer_store;
pub mod user_store;

pub use answer_store::{AnswerStore, PgAnswerStore};
pub use user_store::{NewUser, PgUserStore, UserChanges, UserStore};
