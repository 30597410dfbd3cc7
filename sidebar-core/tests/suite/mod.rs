// Aggregates all former standalone integration tests as modules.
mod intents;
mod mutations;
mod persistence;
mod selection;
mod startup;
