mod role;
pub use role::Role;

mod target;
pub use target::TargetType;
