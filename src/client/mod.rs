pub mod api;
pub mod ip;

pub use api::ApiClient;
pub use ip::{FixedIp, IpLookup, IpifyLookup};
