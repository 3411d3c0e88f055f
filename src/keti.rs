mod calibration;
mod frame;
mod reading;
mod session;
mod sink;

pub use calibration::*;
pub use frame::*;
pub use reading::*;
pub use session::*;
pub use sink::*;
