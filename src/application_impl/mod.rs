mod account_service_impl;
mod engagement_service_impl;
mod feed_service_impl;
mod session;
mod social_graph_service_impl;

pub use account_service_impl::*;
pub use engagement_service_impl::*;
pub use feed_service_impl::*;
pub use session::*;
pub use social_graph_service_impl::*;
