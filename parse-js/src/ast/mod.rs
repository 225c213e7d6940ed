pub mod class_or_object;
pub mod comment;
pub mod expr;
pub mod func;
pub mod import_export;
pub mod node;
pub mod stmt;
pub mod stx;
pub mod walk;
