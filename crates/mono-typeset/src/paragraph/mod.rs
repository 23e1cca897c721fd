mod breaker;
mod hyphenate;
mod token;
mod word;

pub use breaker::*;
pub use hyphenate::*;
pub use token::*;
pub use word::*;
