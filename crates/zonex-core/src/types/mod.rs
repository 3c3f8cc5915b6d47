mod finding;
mod record;

pub use finding::*;
pub use record::*;
