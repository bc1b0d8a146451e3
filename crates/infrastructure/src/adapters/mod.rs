//! Adapter implementations of application ports.

mod reqwest_identity;

pub use reqwest_identity::{
    ClientBuildError, ReqwestIdentityClient, parse_profile_response, parse_token_response,
};
