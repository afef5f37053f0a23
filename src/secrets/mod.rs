//! Hosting token handling.
//!
//! - [`Token`] - a bearer token read from the environment
//! - [`OutputMasker`] - redacts token values (and URL credentials) from text
//!
//! # Example
//!
//! ```
//! use monorel::secrets::{OutputMasker, Token};
//!
//! let token = Token::new("ghp_example");
//! let masker = OutputMasker::for_token(&token);
//! assert_eq!(masker.mask("token ghp_example"), "token [REDACTED]");
//! assert_eq!(format!("{:?}", token), "Token([REDACTED])");
//! ```

pub mod mask;
pub mod token;

pub use mask::OutputMasker;
pub use token::Token;
