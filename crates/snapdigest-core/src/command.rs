//! The top-level action abstraction.

/// A runnable top-level action such as `backup` or `report`.
///
/// Implementations receive their collaborators at construction time and
/// return a process exit status on completion. Fatal conditions are
/// reported through `Self::Error`.
pub trait Command {
    /// Error type for fatal failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Execute the action.
    fn run(&self) -> Result<u8, Self::Error>;
}
