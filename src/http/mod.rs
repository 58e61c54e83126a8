//! HTTP utilities
//!
//! Response builders shared by all request handlers.

pub mod response;

pub use response::{
    apply_cors, build_404_response, build_413_response, build_500_response, build_html_response,
    build_json_response, build_options_response,
};
