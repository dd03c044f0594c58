use soroban_sdk::{contractevent, Address, U256};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Initialised {
    #[topic]
    pub owner: Address,
    pub value: i128,
    pub native_spent: i128,
    pub link_bought: i128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpkeepRegistered {
    #[topic]
    pub index: u32,
    pub upkeep_id: U256,
    pub amount: i128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkSwappedIn {
    #[topic]
    pub caller: Address,
    pub value: i128,
    pub native_spent: i128,
    pub link_received: i128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkSwappedOut {
    pub link_sold: i128,
    pub native_received: i128,
}
