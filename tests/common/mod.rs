#![allow(dead_code)]

pub mod log_capture;
pub mod mock_connector;
pub mod strategies;

#[allow(unused_imports)]
pub use log_capture::*;
#[allow(unused_imports)]
pub use mock_connector::*;
#[allow(unused_imports)]
pub use strategies::*;
