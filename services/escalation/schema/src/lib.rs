pub mod check_ins;
pub mod contacts;
pub mod scheduled_deadlines;
