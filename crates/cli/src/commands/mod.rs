//! Command handlers for the Meridian CLI.

pub mod ask;
pub mod route;
pub mod runtime;
pub mod session;

pub use ask::AskCommand;
pub use route::RouteCommand;
pub use session::SessionCommand;
