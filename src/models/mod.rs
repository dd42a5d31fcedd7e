pub mod analysis;
pub mod segment;
pub mod tag;
pub mod token;

pub use analysis::*;
pub use segment::*;
pub use tag::*;
pub use token::*;
