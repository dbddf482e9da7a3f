use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Unknown activity: {0:?}")]
    InvalidActivity(String),

    #[error("No activity selected")]
    NoActivitySelected,

    #[error("Monitoring is already active")]
    AlreadyMonitoring,

    #[error("No session is open")]
    NoActiveSession,

    #[error("Session recorded no readings")]
    EmptySession,

    #[error("Simulation fault: {0}")]
    SimulationFault(String),

    #[error("No async runtime available: {0}")]
    Runtime(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
