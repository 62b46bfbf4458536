pub mod functions;
pub mod ids;
pub mod location;
pub mod runtime;
