pub mod brand_kit;
pub mod generation;
pub mod subscription;
pub mod template;
pub mod user;

pub use brand_kit::*;
pub use generation::*;
pub use subscription::*;
pub use template::*;
pub use user::*;
