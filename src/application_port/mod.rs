mod account_service;
mod engagement_service;
mod error;
mod feed_service;
mod social_graph_service;
mod subscription;

pub use account_service::*;
pub use engagement_service::*;
pub use error::*;
pub use feed_service::*;
pub use social_graph_service::*;
pub use subscription::*;
