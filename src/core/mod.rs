pub mod deadline;
pub mod health_service;
pub mod probe;
pub mod probe_runner;
