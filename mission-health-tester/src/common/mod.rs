pub mod scenario;
pub mod util;

pub use util::{run_stamp, split_csv};
