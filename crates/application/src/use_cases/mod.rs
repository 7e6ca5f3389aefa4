//! Application use cases (business logic orchestration).

mod list_tasks;
mod login;
mod logout;
mod refresh_session;

pub use list_tasks::*;
pub use login::*;
pub use logout::*;
pub use refresh_session::*;
