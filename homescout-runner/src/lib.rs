//! # homescout-runner
//!
//! The handoff router that moves a user turn between HomeScout roles.
//!
//! ```rust,ignore
//! let router = HandoffRouter::builder()
//!     .role(Arc::new(coordinator))
//!     .role(Arc::new(retrieval))
//!     .role(Arc::new(translation))
//!     .build()?;
//!
//! let mut turn = router.run("Show me 2-bedroom flats near good schools");
//! while let Some(event) = turn.next().await {
//!     match event? {
//!         RouterEvent::TextDelta { text, .. } => print!("{text}"),
//!         RouterEvent::TurnComplete { .. } => println!(),
//!         _ => {}
//!     }
//! }
//! ```
//!
//! A turn always starts at the coordinator and ends when the coordinator
//! replies without handing off. Specialists that finish without naming a
//! target go back to the coordinator. Turns fail with a [`TurnError`] when a
//! role faults, hands off along an edge the [`HandoffGraph`] does not allow,
//! exceeds [`RouterConfig::max_hops`], or is cancelled.

mod context;
pub mod error;
pub mod event;
pub mod graph;
pub mod router;

pub use error::{TurnError, TurnResult};
pub use event::{RouterEvent, TurnState};
pub use graph::HandoffGraph;
pub use router::{
    DEFAULT_MAX_HOPS, HandoffRouter, HandoffRouterBuilder, RouterConfig, TurnStream,
};
pub use tokio_util::sync::CancellationToken;
