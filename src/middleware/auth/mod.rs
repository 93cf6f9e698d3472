//! Authorization middleware (bearer credential → verified claims → permission gate).
pub mod permission;

pub use permission::guard;
