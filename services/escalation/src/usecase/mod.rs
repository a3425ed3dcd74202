pub mod checkin;
pub mod contact;
pub mod dispatch;
pub mod scan;
pub mod token;
pub mod verify;
