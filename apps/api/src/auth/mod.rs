// Admin authentication: password hashing, session storage, extractors, and handlers.

pub mod extract;
pub mod handlers;
pub mod password;
pub mod session;
