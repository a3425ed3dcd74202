mod dispatch_test;
mod helpers;
mod scan_test;
mod verify_test;
