//! Oracle Arena - tic-tac-toe sessions that score progress oracles
//!
//! Every move is classified by the rule engine in [`oracle_board`] and by
//! each registered [`Oracle`]; the session keeps a running accuracy tally
//! per oracle so predictive models can be compared live.
//!
//! # Architecture
//!
//! - **Oracle**: the prediction port plus a registry that isolates failures
//! - **Oracles**: built-in adapters (rules, random, k-NN, constant)
//! - **Session**: one game, its random opponent, and its tallies
//! - **Store**: the default session plus keyed sessions for many clients
//! - **HTTP / Console**: front ends over the store and a single session
//!
//! # Example
//!
//! ```
//! use oracle_arena::{OracleRegistry, Session, SessionSettings};
//! use oracle_arena::oracles::RuleOracle;
//! use oracle_board::{Player, ProgressLabel};
//! use std::sync::Arc;
//!
//! let oracles = OracleRegistry::builder()
//!     .register("Rules", RuleOracle)
//!     .build()
//!     .expect("valid registry");
//! let mut session = Session::new(
//!     "demo".to_string(),
//!     Arc::new(oracles),
//!     SessionSettings::new(Player::O, Some(1)),
//! );
//!
//! let snapshot = session.submit_move(4).expect("legal move");
//! assert_eq!(snapshot.ground_truth, Some(ProgressLabel::Ongoing));
//! assert_eq!(snapshot.oracles[0].accuracy, 100.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod console;
mod error;
mod http;
mod oracle;
mod session;
mod snapshot;
mod store;
mod tally;

pub mod oracles;

// Crate-level exports - Configuration
pub use config::{ArenaConfig, CONFIG_ENV_VAR, OracleKind, OracleSpec, ServerConfig};

// Crate-level exports - Errors
pub use error::{ArenaError, ArenaErrorKind, ConfigError, OracleError};

// Crate-level exports - Oracle port
pub use oracle::{Oracle, OracleRegistry, OracleRegistryBuilder, Verdict, VerdictLabel};

// Crate-level exports - Sessions
pub use session::{Session, SessionId, SessionSettings, SessionStatus};
pub use snapshot::{OracleReport, Snapshot};
pub use store::{DEFAULT_SESSION_ID, SessionStore};
pub use tally::OracleTally;

// Crate-level exports - Front ends
pub use console::{render_analysis, render_board, run as run_console};
pub use http::{CreateSessionRequest, ErrorResponse, MoveRequest, router};
