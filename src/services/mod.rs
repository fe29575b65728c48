//! Services layer - Business logic
//!
//! Services implement validation and coordinate repositories with the image
//! storage. The HTTP layer only talks to services.

pub mod article;
pub mod product;
pub mod session;
pub mod upload;

pub use article::{ArticleService, ArticleServiceError};
pub use product::{ProductService, ProductServiceError};
pub use session::{generate_secret, SessionError, SessionService, SessionSigner, SESSION_COOKIE};
pub use upload::{ImageStorage, ImageUpload, LocalImageStorage, UploadError};
