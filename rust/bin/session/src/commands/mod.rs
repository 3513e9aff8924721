pub mod inspect;
pub mod permissions;
pub mod watch;
