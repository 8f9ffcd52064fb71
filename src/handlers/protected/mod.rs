// Protected handlers (JWT authentication required)
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware injects AuthCustomer
pub mod agent;
pub mod auth;
