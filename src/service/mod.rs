pub mod leave;

pub use leave::{Decision, LeaveRequestPatch, LeaveService, NewLeaveRequest};
