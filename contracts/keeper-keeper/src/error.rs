use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum KeeperError {
    /// `initialise` was already called
    AlreadyInitialised = 1,
    NegativeNotAllowed = 2,
    /// Amount must be strictly positive
    InvalidAmount = 3,
    /// Attached value does not cover the swap and leave a residual
    InsufficientFunds = 4,
    /// Quoted native cost is above the attached value
    ExcessiveInputAmount = 5,
    /// Contract holds less LINK than requested
    InsufficientLinkBalance = 6,
    /// Router quoted zero native for the LINK sold
    InsufficientOutputAmount = 7,
    SwarmIndexOutOfBounds = 8,
    InvalidConfig = 9,
    ArithmeticOverflow = 10,
    /// Router returned an empty amounts vector
    UnexpectedRouterResponse = 11,
    /// Registrar returned a zero upkeep id
    InvalidUpkeepId = 12,
    OwnerNotSet = 13,
    /// Mandatory storage entry missing
    NotConfigured = 14,
}
