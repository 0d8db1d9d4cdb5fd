// Public API
pub use claims::Claims;
pub use extractor::AuthenticatedUser;
pub use token::TokenConfig;

// Internal modules
mod claims;
mod extractor;
mod token;
