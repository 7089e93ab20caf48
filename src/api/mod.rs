// External service clients
pub mod firebase;
pub mod http;
