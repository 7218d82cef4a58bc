// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod name_list;
pub mod nerdgraph_client;
