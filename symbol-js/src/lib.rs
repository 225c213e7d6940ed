//! Scope analysis and name mangling over a [`parse_js`] AST.
//!
//! [`resolve`] builds the scope tree and binds every identifier, storing [`assoc`] data on the nodes. [`mangle`] then renames local bindings, and [`mangle_properties`] renames property names consistently across units through a [`SharedNameCache`].

pub mod assoc;
pub mod cache;
mod declare;
pub mod error;
pub mod mangle;
pub mod name;
pub mod props;
mod resolve;
pub mod scope;

pub use cache::NameCache;
pub use cache::SharedNameCache;
pub use error::ScopeError;
pub use error::ScopeErrorType;
pub use error::ScopeResult;
pub use mangle::mangle;
pub use mangle::MangleOptions;
pub use mangle::MangleResult;
pub use parse_js::options::TopLevelMode;
pub use props::mangle_properties;
pub use props::PropertyManglePolicy;
pub use props::PropertyMangleResult;
pub use resolve::resolve;
pub use scope::Resolution;
