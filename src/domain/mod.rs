pub mod outputs;
pub mod readings;

pub use outputs::*;
pub use readings::*;
