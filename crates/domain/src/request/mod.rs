//! Request domain types

mod body;
mod certificate;
mod key_value;
mod method;
mod spec;

pub use body::{BodyType, RequestBody};
pub use certificate::ClientCertificate;
pub use key_value::{KeyValue, active_pairs};
pub use method::HttpMethod;
pub use spec::ApiRequest;
