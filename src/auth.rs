//! Auth-domain identifiers, scope sets, consumer credentials, and access tokens.

pub mod id;
pub mod scope;
pub mod token;

pub use id::*;
pub use scope::*;
pub use token::{bearer::*, consumer::*, credential::*, oauth1::*, secret::*};
