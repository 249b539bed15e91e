pub mod analysis;
pub mod dataset;
pub mod filter;
pub mod imaging;
pub mod operations;

pub use analysis::*;
pub use dataset::*;
pub use filter::*;
pub use imaging::*;
pub use operations::*;
