//! One conversion per draft producer.

pub mod einvoice;
pub mod extraction;
pub mod manual;
