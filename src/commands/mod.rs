pub mod demo_command;
pub mod shell_command;

pub use self::{demo_command::*, shell_command::*};
