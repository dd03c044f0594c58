use soroban_sdk::{contractclient, Address, Env, U256};

#[allow(dead_code)]
#[contractclient(name = "UpkeepRegistrarClient")]
pub trait UpkeepRegistrar {
    /// Registers `target` as an upkeep funded with `amount` of LINK pulled
    /// from `sender`. Returns the upkeep id.
    fn register(e: Env, sender: Address, target: Address, gas_limit: u32, amount: i128) -> U256;
}
