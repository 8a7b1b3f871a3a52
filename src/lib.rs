pub mod config;
pub mod diagram;
pub mod layout;
pub mod node;
pub mod scene;
pub mod snapshot;
#[doc(hidden)]
pub mod test_support;
pub mod text;
