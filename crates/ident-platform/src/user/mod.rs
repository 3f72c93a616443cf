//! User Aggregate

pub mod entity;
pub mod repository;

pub use entity::{
    AuthType, MfaOptions, MfaSettings, MfaState, MfaType, RequiredAction, User, UserInfo,
    UserState,
};
pub use repository::{UserRepository, UserStore};
