pub mod checks;
pub mod extract;
pub mod linter;
pub mod normalize;
pub mod parser;
pub mod position;
pub mod settings;

// Re-export main types for convenient access
pub use linter::{Issue, Linter};
pub use parser::GoFile;
pub use position::FilePos;
pub use settings::{Scope, Settings};
