/// Programmatic form of the `bookshelf` subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Connect and run the operation plan.
    Run,
    /// Load the sample books; drop the collection first when `reset` is set.
    Seed { reset: bool },
    /// List the operation plan without connecting.
    Plan,
}
