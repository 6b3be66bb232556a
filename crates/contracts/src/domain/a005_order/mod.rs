pub mod aggregate;
pub mod checkout;
