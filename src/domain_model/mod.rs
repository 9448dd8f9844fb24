mod engagement;
mod friend;
mod outcome;
mod post;
mod user;

pub use engagement::*;
pub use friend::*;
pub use outcome::*;
pub use post::*;
pub use user::*;
