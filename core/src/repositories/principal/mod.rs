mod memory;
mod r#trait;

pub use memory::InMemoryPrincipalDirectory;
pub use r#trait::PrincipalResolver;
