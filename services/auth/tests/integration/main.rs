mod helpers;

mod otp_test;
mod register_test;
