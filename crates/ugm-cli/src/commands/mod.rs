pub mod cdrs;
pub mod mutate;
pub mod template;
