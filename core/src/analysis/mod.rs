pub use constraints::*;
pub use observation::*;
pub use oracle::*;

mod constraints;
mod observation;
mod oracle;
