pub mod claims;
pub mod jwt;
pub mod middleware;

pub use claims::{Claims, Role};
pub use jwt::JwtService;
pub use middleware::{AuthMiddleware, AuthenticatedStudent};
