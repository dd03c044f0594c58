#![cfg(test)]

use soroban_sdk::{
    contract, contractimpl, contracttype, testutils::Address as _, token, vec, Address, Env,
    Vec, U256,
};

use crate::{KeeperConfig, KeeperKeeper, KeeperKeeperClient};

/// 7 decimals, like every Stellar Asset Contract
pub const UNIT: i128 = 10_000_000;

/// Native paid per LINK, in basis points (1 LINK = 0.05 native)
pub const PRICE_BPS: i128 = 500;

pub const REGISTRATION_AMOUNT: i128 = 5 * UNIT;
pub const SWARM_SIZE: u32 = 2;

#[derive(Clone)]
#[contracttype]
enum RouterKey {
    Native,
    PriceBps,
}

/// Fixed-price router. Acts as its own pair and settles from its own reserves.
#[contract]
pub struct MockRouter;

fn is_native(e: &Env, token: &Address) -> bool {
    let native: Address = e.storage().instance().get(&RouterKey::Native).unwrap();
    *token == native
}

fn amount_in_for(e: &Env, amount_out: i128, path: &Vec<Address>) -> i128 {
    let price: i128 = e.storage().instance().get(&RouterKey::PriceBps).unwrap();
    if is_native(e, &path.first().unwrap()) {
        // round up, the pair never gives away LINK
        (amount_out * price + 9_999) / 10_000
    } else {
        (amount_out * 10_000 + price - 1) / price
    }
}

fn amount_out_for(e: &Env, amount_in: i128, path: &Vec<Address>) -> i128 {
    let price: i128 = e.storage().instance().get(&RouterKey::PriceBps).unwrap();
    if is_native(e, &path.first().unwrap()) {
        amount_in * 10_000 / price
    } else {
        amount_in * price / 10_000
    }
}

fn check_deadline(e: &Env, deadline: u64) {
    if e.ledger().timestamp() >= deadline {
        panic!("EXPIRED");
    }
}

fn settle(e: &Env, path: &Vec<Address>, to: &Address, amount_in: i128, amount_out: i128) {
    let pair = e.current_contract_address();
    token::Client::new(e, &path.first().unwrap()).transfer(to, &pair, &amount_in);
    token::Client::new(e, &path.last().unwrap()).transfer(&pair, to, &amount_out);
}

#[contractimpl]
impl MockRouter {
    pub fn __constructor(e: Env, native: Address, price_bps: i128) {
        e.storage().instance().set(&RouterKey::Native, &native);
        e.storage().instance().set(&RouterKey::PriceBps, &price_bps);
    }

    pub fn router_pair_for(e: Env, _token_a: Address, _token_b: Address) -> Address {
        e.current_contract_address()
    }

    pub fn router_get_amounts_in(e: Env, amount_out: i128, path: Vec<Address>) -> Vec<i128> {
        vec![&e, amount_in_for(&e, amount_out, &path), amount_out]
    }

    pub fn router_get_amounts_out(e: Env, amount_in: i128, path: Vec<Address>) -> Vec<i128> {
        vec![&e, amount_in, amount_out_for(&e, amount_in, &path)]
    }

    pub fn swap_tokens_for_exact_tokens(
        e: Env,
        amount_out: i128,
        amount_in_max: i128,
        path: Vec<Address>,
        to: Address,
        deadline: u64,
    ) -> Vec<i128> {
        to.require_auth();
        check_deadline(&e, deadline);
        let amount_in = amount_in_for(&e, amount_out, &path);
        if amount_in > amount_in_max {
            panic!("EXCESSIVE_INPUT_AMOUNT");
        }
        settle(&e, &path, &to, amount_in, amount_out);
        vec![&e, amount_in, amount_out]
    }

    pub fn swap_exact_tokens_for_tokens(
        e: Env,
        amount_in: i128,
        amount_out_min: i128,
        path: Vec<Address>,
        to: Address,
        deadline: u64,
    ) -> Vec<i128> {
        to.require_auth();
        check_deadline(&e, deadline);
        let amount_out = amount_out_for(&e, amount_in, &path);
        if amount_out < amount_out_min {
            panic!("INSUFFICIENT_OUTPUT_AMOUNT");
        }
        settle(&e, &path, &to, amount_in, amount_out);
        vec![&e, amount_in, amount_out]
    }
}

#[derive(Clone)]
#[contracttype]
enum RegistrarKey {
    Link,
    MinAmount,
    Count,
    ZeroIds,
}

/// Registrar that keeps the funding and hands out sequential non-zero ids
#[contract]
pub struct MockRegistrar;

#[contractimpl]
impl MockRegistrar {
    pub fn __constructor(e: Env, link: Address, min_amount: i128) {
        e.storage().instance().set(&RegistrarKey::Link, &link);
        e.storage().instance().set(&RegistrarKey::MinAmount, &min_amount);
    }

    pub fn register(
        e: Env,
        sender: Address,
        _target: Address,
        _gas_limit: u32,
        amount: i128,
    ) -> U256 {
        let min_amount: i128 = e.storage().instance().get(&RegistrarKey::MinAmount).unwrap();
        if amount < min_amount {
            panic!("insufficient funding");
        }

        let link: Address = e.storage().instance().get(&RegistrarKey::Link).unwrap();
        token::Client::new(&e, &link).transfer(&sender, &e.current_contract_address(), &amount);

        if e.storage().instance().has(&RegistrarKey::ZeroIds) {
            return U256::from_u32(&e, 0);
        }

        let count: u32 = e.storage().instance().get(&RegistrarKey::Count).unwrap_or(0) + 1;
        e.storage().instance().set(&RegistrarKey::Count, &count);
        U256::from_u128(&e, ((count as u128) << 64) | count as u128)
    }

    /// Makes every later registration return the zero id
    pub fn issue_zero_ids(e: Env) {
        e.storage().instance().set(&RegistrarKey::ZeroIds, &true);
    }
}

pub struct Setup<'a> {
    pub env: Env,
    pub owner: Address,
    pub native: token::Client<'a>,
    pub native_admin: token::StellarAssetClient<'a>,
    pub link: token::Client<'a>,
    pub registrar: Address,
    pub keeper: KeeperKeeperClient<'a>,
}

pub fn default_config() -> KeeperConfig {
    KeeperConfig {
        swarm_size: SWARM_SIZE,
        registration_amount: REGISTRATION_AMOUNT,
        gas_limit: 500_000,
        swap_deadline: 300,
    }
}

pub fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let issuer = Address::generate(&env);

    let native_sac = env.register_stellar_asset_contract_v2(issuer.clone());
    let link_sac = env.register_stellar_asset_contract_v2(issuer);
    let native = token::Client::new(&env, &native_sac.address());
    let native_admin = token::StellarAssetClient::new(&env, &native_sac.address());
    let link = token::Client::new(&env, &link_sac.address());
    let link_admin = token::StellarAssetClient::new(&env, &link_sac.address());

    let router = env.register(MockRouter, (native_sac.address(), PRICE_BPS));
    let registrar = env.register(MockRegistrar, (link_sac.address(), REGISTRATION_AMOUNT));

    native_admin.mint(&router, &(1_000 * UNIT));
    link_admin.mint(&router, &(1_000 * UNIT));
    native_admin.mint(&owner, &(100 * UNIT));

    let keeper_id = env.register(
        KeeperKeeper,
        (
            owner.clone(),
            native_sac.address(),
            link_sac.address(),
            router,
            registrar.clone(),
            default_config(),
        ),
    );
    let keeper = KeeperKeeperClient::new(&env, &keeper_id);

    Setup {
        env,
        owner,
        native,
        native_admin,
        link,
        registrar,
        keeper,
    }
}

/// Fresh account holding 10 native
pub fn funded_account(setup: &Setup) -> Address {
    let account = Address::generate(&setup.env);
    setup.native_admin.mint(&account, &(10 * UNIT));
    account
}
