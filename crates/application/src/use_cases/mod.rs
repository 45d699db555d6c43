//! Application use cases (business logic orchestration).

mod save_test_suite;
mod send_request;

pub use save_test_suite::{MAX_FILE_NAME_LEN, SaveTestSuite, SaveTestSuiteInput, sanitize_file_name};
pub use send_request::{SendRequest, SendRequestOutput};
