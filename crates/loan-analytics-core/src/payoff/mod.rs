pub mod comparator;
pub mod simulation;
pub mod strategy;
