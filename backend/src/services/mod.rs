//! Business logic services
//!
//! Services coordinate the user store, the completion client and the
//! plan registry; handlers stay thin.

pub mod export;
pub mod media;
pub mod plan;
pub mod user;

pub use export::ExportService;
pub use media::MediaService;
pub use plan::PlanService;
pub use user::UserService;
