pub mod error;
mod lenient;
pub mod records;
pub mod resources;
pub mod result;
pub mod schema;
pub mod settings;

pub use error::*;
pub use records::*;
pub use resources::*;
pub use result::*;
pub use schema::*;
pub use settings::*;
