pub mod coinbase;
pub mod polygon;
pub mod util;
