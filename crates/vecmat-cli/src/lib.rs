pub mod bench;
pub mod util;
