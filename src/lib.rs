// Modules
pub mod agent;
pub mod config;
pub mod memory;
pub mod tools;

pub use agent::{AgentRunner, RigAgentRunner, RunResult, SessionOrchestrator, TraceStep};
pub use config::HarnessConfig;
pub use memory::{create_shared_session_memory, SessionMemory, SharedSessionMemory};
