/// Authentication utilities
///
/// - `password`: Argon2id hashing and verification
/// - `jwt`: access/refresh token creation and validation
/// - `middleware`: request auth context and error responses for Axum
pub mod jwt;
pub mod middleware;
pub mod password;
