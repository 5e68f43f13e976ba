pub mod session;
pub mod ws;

pub use session::*;
pub use ws::*;
