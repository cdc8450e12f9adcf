mod auth;
mod candidates;
mod fingerprint;
mod resolve;

pub use auth::cmd_auth;
pub use candidates::cmd_candidates;
pub use fingerprint::cmd_fingerprint;
pub use resolve::cmd_resolve;
