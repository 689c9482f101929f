pub mod calls;
pub mod extract;
pub mod scope;
pub mod tokens;
