// Domain layer - dashboard definitions, entity references and migration outcomes
pub mod dashboard;
pub mod entity;
pub mod outcome;
