use soroban_sdk::{contracttype, panic_with_error, Address, Env, U256};

use crate::error::KeeperError;

const DAY_IN_LEDGERS: u32 = 17280;

pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = 3 * DAY_IN_LEDGERS;

pub const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Deployment-time parameters of the keeper
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeeperConfig {
    /// Number of upkeeps registered by `initialise`
    pub swarm_size: u32,
    /// LINK funded into each upkeep registration
    pub registration_amount: i128,
    /// Gas limit forwarded to the registrar
    pub gas_limit: u32,
    /// Seconds added to the ledger timestamp to form the router deadline
    pub swap_deadline: u64,
}

impl KeeperConfig {
    pub fn is_valid(&self) -> bool {
        self.swarm_size > 0
            && self.registration_amount > 0
            && self.gas_limit > 0
            && self.swap_deadline > 0
    }
}

#[derive(Clone)]
#[contracttype]
enum DataKey {
    NativeToken,
    LinkToken,
    SoroswapRouter,
    UpkeepRegistrar,
    Config,
    Initialised,
    SwarmLen,
    Swarm(u32),
}

pub fn extend_instance_ttl(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn get_address(e: &Env, key: &DataKey) -> Address {
    e.storage()
        .instance()
        .get(key)
        .unwrap_or_else(|| panic_with_error!(e, KeeperError::NotConfigured))
}

pub fn set_native_token_address(e: &Env, address: Address) {
    e.storage().instance().set(&DataKey::NativeToken, &address);
}

pub fn get_native_token_address(e: &Env) -> Address {
    get_address(e, &DataKey::NativeToken)
}

pub fn set_link_token_address(e: &Env, address: Address) {
    e.storage().instance().set(&DataKey::LinkToken, &address);
}

pub fn get_link_token_address(e: &Env) -> Address {
    get_address(e, &DataKey::LinkToken)
}

pub fn set_soroswap_router_address(e: &Env, address: Address) {
    e.storage().instance().set(&DataKey::SoroswapRouter, &address);
}

pub fn get_soroswap_router_address(e: &Env) -> Address {
    get_address(e, &DataKey::SoroswapRouter)
}

pub fn set_upkeep_registrar_address(e: &Env, address: Address) {
    e.storage().instance().set(&DataKey::UpkeepRegistrar, &address);
}

pub fn get_upkeep_registrar_address(e: &Env) -> Address {
    get_address(e, &DataKey::UpkeepRegistrar)
}

pub fn set_config(e: &Env, config: &KeeperConfig) {
    e.storage().instance().set(&DataKey::Config, config);
}

pub fn get_config(e: &Env) -> KeeperConfig {
    e.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(e, KeeperError::NotConfigured))
}

pub fn is_initialised(e: &Env) -> bool {
    e.storage()
        .instance()
        .get(&DataKey::Initialised)
        .unwrap_or(false)
}

pub fn set_initialised(e: &Env) {
    e.storage().instance().set(&DataKey::Initialised, &true);
}

pub fn get_swarm_len(e: &Env) -> u32 {
    e.storage().instance().get(&DataKey::SwarmLen).unwrap_or(0)
}

/// Appends an upkeep id to the swarm and returns its index
pub fn push_swarm_member(e: &Env, upkeep_id: &U256) -> u32 {
    let index = get_swarm_len(e);
    let key = DataKey::Swarm(index);
    e.storage().persistent().set(&key, upkeep_id);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
    e.storage().instance().set(&DataKey::SwarmLen, &(index + 1));
    index
}

pub fn get_swarm_member(e: &Env, index: u32) -> Option<U256> {
    let key = DataKey::Swarm(index);
    let upkeep_id: Option<U256> = e.storage().persistent().get(&key);
    if upkeep_id.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
    }
    upkeep_id
}
