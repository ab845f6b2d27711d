pub mod application;
pub mod audit_log;
pub mod practice_test;
pub mod question;
pub mod stage_result;
pub mod test_result;
pub mod user;
