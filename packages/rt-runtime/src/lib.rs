//! Process bootstrap: CLI parsing, config loading, tracing init and the
//! shutdown-signal watch, scoped to what a single embeddable node needs
//! (§4.0c, §6).

mod cli;
mod term_signal;
mod traces;

pub use cli::Cli;
pub use term_signal::TermSignal;
pub use traces::init_tracing_subscriber;
