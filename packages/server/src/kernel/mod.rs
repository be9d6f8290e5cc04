// Infrastructure wiring: concrete clients and stores behind the pipeline traits
pub mod deps;
pub mod scheduled_tasks;

pub use deps::ServerDeps;
pub use scheduled_tasks::start_progress_purge;
