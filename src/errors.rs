use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Workload definition problems caught at build time
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Workload registry lookups and registration
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Target store operations
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Run orchestration failures
    #[error("Run error: {0}")]
    Run(#[from] RunError),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating a workload definition
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// Workload name must be a non-empty identifier
    #[error("Workload name must not be empty")]
    EmptyName,

    /// A workload needs at least one state to run
    #[error("Workload '{0}' defines no states")]
    NoStates(String),

    /// Each state name may only be defined once
    #[error("Duplicate state '{state}' in workload '{workload}'")]
    DuplicateState { workload: String, state: String },

    /// The declared start state must exist
    #[error("Start state '{start}' is not defined in workload '{workload}'")]
    UnknownStartState { workload: String, start: String },

    /// Transition sources must be defined states
    #[error("Transition source '{src}' is not a defined state in workload '{workload}'")]
    UnknownSource { workload: String, src: String },

    /// Transition targets must be defined states
    #[error("Transition '{src}' -> '{target}' names an undefined target in workload '{workload}'")]
    UnknownTarget {
        workload: String,
        src: String,
        target: String,
    },

    /// Every state needs a way out, even if only back to itself
    #[error("State '{state}' has no outgoing transitions in workload '{workload}'")]
    TerminalState { workload: String, state: String },

    /// Weights must be finite and strictly positive
    #[error("Invalid weight {weight} on transition '{src}' -> '{target}' in workload '{workload}'")]
    InvalidWeight {
        workload: String,
        src: String,
        target: String,
        weight: f64,
    },

    /// Each (source, target) edge may only appear once
    #[error("Duplicate transition '{src}' -> '{target}' in workload '{workload}'")]
    DuplicateTransition {
        workload: String,
        src: String,
        target: String,
    },

    /// At least one worker thread is required
    #[error("Workload '{0}' requests zero threads")]
    ZeroThreads(String),
}

/// Workload registry error types
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A workload with this name is already registered
    #[error("Workload already registered: {0}")]
    Duplicate(String),

    /// Lookup failed
    #[error("Unknown workload: {0}")]
    Unknown(String),
}

/// Target store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Insert collided with an existing key
    #[error("Duplicate key '{key}' in collection '{collection}'")]
    DuplicateKey { collection: String, key: String },

    /// Read/update/remove addressed a missing key
    #[error("Key '{key}' not found in collection '{collection}'")]
    KeyNotFound { collection: String, key: String },

    /// Collection was dropped or never created
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// A worker panicked while holding the lock
    #[error("Lock poisoned for '{0}'")]
    Poisoned(String),
}

/// Run orchestration error types
#[derive(Error, Debug)]
pub enum RunError {
    /// Nothing to do
    #[error("No workloads selected for the run")]
    EmptyRun,

    /// Too few workers could be spawned to trust the run
    #[error("Spawned only {spawned} of {requested} workers (allowed failure ratio {allowed:.2})")]
    SpawnShortfall {
        spawned: usize,
        requested: usize,
        allowed: f64,
    },

    /// One or more workers reported a failure
    #[error("{failed} worker(s) failed")]
    WorkersFailed { failed: usize },

    /// Workload setup hook failed before any worker started
    #[error("Setup failed for workload '{workload}': {message}")]
    Setup { workload: String, message: String },

    /// One or more teardown hooks failed after their workers were joined
    #[error("{0} teardown hook(s) failed")]
    TeardownsFailed(usize),

    /// The run exceeded its configured wall-clock budget
    #[error("Run timed out after {0} seconds")]
    Timeout(u64),

    /// The coordinating task itself died
    #[error("Run coordinator panicked: {0}")]
    CoordinatorPanic(String),
}

/// Errors returned by workload state handlers and lifecycle hooks
#[derive(Error, Debug)]
pub enum StateError {
    /// Store operation failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A workload-level invariant did not hold
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Anything else a handler wants to surface
    #[error("{0}")]
    Other(String),
}

/// Application-wide result type - single point of truth
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Result type for state handlers and lifecycle hooks
pub type StateResult = Result<(), StateError>;

// Additional From implementations for common error types
impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Other(format!("JSON error: {}", err))
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        HarnessError::Config(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for HarnessError {
    fn from(err: config::ConfigError) -> Self {
        HarnessError::Config(err.to_string())
    }
}
