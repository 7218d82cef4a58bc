// Application layer - migration use case and the ports it depends on
pub mod account_rewriter;
pub mod entity_directory;
pub mod entity_resolver;
pub mod migration_service;
pub mod reference_cache;

#[cfg(test)]
pub mod testing;
