pub mod email_service;
pub mod otp_service;
pub mod payment_gateway;
pub mod ticketing;
