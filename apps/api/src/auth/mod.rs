// Accounts and sessions: password and Google sign-in, bearer tokens,
// email verification and password reset.

pub mod extractor;
pub mod google;
pub mod handlers;
pub mod password;
pub mod tokens;
