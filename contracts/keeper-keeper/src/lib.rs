#![no_std]
//! # KeeperKeeper
//!
//! An owned contract that holds the native asset, swaps part of it into LINK
//! through the Soroswap router and uses that LINK to fund a "swarm" of upkeep
//! registrations.
//!
//! ## Key Characteristics:
//! - The contract takes custody of both assets (unlike a passthrough proxy)
//! - Swaps pull tokens from the contract itself, so every router/registrar
//!   `transfer` is pre-authorised with `authorize_as_current_contract`
//! - Overpayment on `swap_link_in` stays in the contract, it is not refunded
//! - `initialise` and `swap_link_out` are owner only
//!
//! ## Token Flow:
//! ```text
//! initialise:    Owner (native) → Keeper → Pair → Keeper (LINK) → Registrar
//! swap_link_in:  Caller (native) → Keeper → Pair → Keeper (LINK)
//! swap_link_out: Keeper (LINK) → Pair → Keeper (native)
//! ```

use soroban_sdk::{
    auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation},
    contract, contractimpl, log, panic_with_error, token, vec, Address, Env, IntoVal, Symbol,
    Val, Vec, U256,
};
use stellar_access::ownable;
use stellar_macros::only_owner;

mod error;
mod events;
mod soroswap_router;
mod storage;
mod upkeep_registrar;

pub use error::KeeperError;
pub use storage::KeeperConfig;

use events::{Initialised, LinkSwappedIn, LinkSwappedOut, UpkeepRegistered};
use soroswap_router::SoroswapRouterClient;
use storage::{
    extend_instance_ttl, get_config, get_link_token_address, get_native_token_address,
    get_soroswap_router_address, get_swarm_len, get_swarm_member, get_upkeep_registrar_address,
    push_swarm_member, set_config, set_initialised, set_link_token_address,
    set_native_token_address, set_soroswap_router_address, set_upkeep_registrar_address,
};
use upkeep_registrar::UpkeepRegistrarClient;

/// Validates that the amount is non-negative
pub fn check_nonnegative_amount(amount: i128) -> Result<(), KeeperError> {
    if amount < 0 {
        Err(KeeperError::NegativeNotAllowed)
    } else {
        Ok(())
    }
}

/// Validates that the amount is strictly positive
pub fn check_positive_amount(amount: i128) -> Result<(), KeeperError> {
    check_nonnegative_amount(amount)?;
    if amount == 0 {
        Err(KeeperError::InvalidAmount)
    } else {
        Ok(())
    }
}

/// Pre-authorises `token.transfer(current_contract, to, amount)` for the
/// next sub-invocation made by this contract.
fn authorize_transfer(e: &Env, token: &Address, to: &Address, amount: i128) {
    let mut transfer_args: Vec<Val> = vec![e];
    transfer_args.push_back(e.current_contract_address().into_val(e)); // From
    transfer_args.push_back(to.into_val(e)); // To
    transfer_args.push_back(amount.into_val(e)); // Amount

    e.authorize_as_current_contract(vec![
        e,
        InvokerContractAuthEntry::Contract(SubContractInvocation {
            context: ContractContext {
                contract: token.clone(),
                fn_name: Symbol::new(e, "transfer"),
                args: transfer_args,
            },
            sub_invocations: vec![e],
        }),
    ]);
}

fn swap_deadline(e: &Env) -> u64 {
    e.ledger()
        .timestamp()
        .saturating_add(get_config(e).swap_deadline)
}

/// Native amount the router needs to deliver exactly `amount_out` LINK
fn quote_native_for_link(e: &Env, amount_out: i128) -> Result<i128, KeeperError> {
    let router = SoroswapRouterClient::new(e, &get_soroswap_router_address(e));
    let path = vec![e, get_native_token_address(e), get_link_token_address(e)];

    router
        .router_get_amounts_in(&amount_out, &path)
        .first()
        .ok_or(KeeperError::UnexpectedRouterResponse)
}

/// Buys exactly `amount_out` LINK spending at most `amount_in_max` native
/// held by the contract. Returns the native amount spent.
fn swap_native_for_link(
    e: &Env,
    amount_out: i128,
    amount_in_max: i128,
) -> Result<i128, KeeperError> {
    let native = get_native_token_address(e);
    let link = get_link_token_address(e);
    let keeper = e.current_contract_address();

    let router = SoroswapRouterClient::new(e, &get_soroswap_router_address(e));
    let pair_address = router.router_pair_for(&native, &link);

    // the router pulls exactly the quoted input into the pair
    authorize_transfer(e, &native, &pair_address, amount_in_max);

    let swap_result = router.swap_tokens_for_exact_tokens(
        &amount_out,
        &amount_in_max,
        &vec![e, native, link],
        &keeper,
        &swap_deadline(e),
    );

    swap_result
        .first()
        .ok_or(KeeperError::UnexpectedRouterResponse)
}

/// Sells exactly `amount_in` LINK held by the contract for native.
/// Returns the native amount received.
fn swap_link_for_native(e: &Env, amount_in: i128) -> Result<i128, KeeperError> {
    let native = get_native_token_address(e);
    let link = get_link_token_address(e);
    let keeper = e.current_contract_address();

    let router = SoroswapRouterClient::new(e, &get_soroswap_router_address(e));
    let path = vec![e, link.clone(), native.clone()];

    let amount_out_min = router
        .router_get_amounts_out(&amount_in, &path)
        .last()
        .ok_or(KeeperError::UnexpectedRouterResponse)?;
    if amount_out_min <= 0 {
        return Err(KeeperError::InsufficientOutputAmount);
    }

    let pair_address = router.router_pair_for(&link, &native);
    authorize_transfer(e, &link, &pair_address, amount_in);

    let swap_result = router.swap_exact_tokens_for_tokens(
        &amount_in,
        &amount_out_min,
        &path,
        &keeper,
        &swap_deadline(e),
    );

    swap_result
        .last()
        .ok_or(KeeperError::UnexpectedRouterResponse)
}

#[contract]
pub struct KeeperKeeper;

#[contractimpl]
impl KeeperKeeper {
    /// Deploys the keeper.
    ///
    /// ## Parameters:
    /// - `owner`: the only address allowed to call `initialise` and `swap_link_out`
    /// - `native_token`: Stellar Asset Contract of the native asset
    /// - `link_token`: token bought to fund upkeeps
    /// - `router`: Soroswap router used for both swap directions
    /// - `registrar`: upkeep registrar the swarm is registered with
    /// - `config`: swarm size, funding per upkeep, gas limit and swap deadline
    pub fn __constructor(
        e: &Env,
        owner: Address,
        native_token: Address,
        link_token: Address,
        router: Address,
        registrar: Address,
        config: KeeperConfig,
    ) {
        if !config.is_valid() {
            panic_with_error!(e, KeeperError::InvalidConfig);
        }

        ownable::set_owner(e, &owner);
        set_native_token_address(e, native_token);
        set_link_token_address(e, link_token);
        set_soroswap_router_address(e, router);
        set_upkeep_registrar_address(e, registrar);
        set_config(e, &config);
    }

    /// One-time setup: buys the LINK needed for the swarm and registers it.
    ///
    /// ## What This Does:
    /// 1. Pulls `value` native from the owner into the contract
    /// 2. Buys exactly `registration_amount * swarm_size` LINK through the router
    /// 3. Registers `swarm_size` upkeeps targeting this contract, each funded
    ///    with `registration_amount` LINK
    ///
    /// All the LINK bought is consumed by the registrations and part of `value`
    /// always stays in the contract.
    ///
    /// ## Returns:
    /// The upkeep ids appended to the swarm
    ///
    /// ## Errors:
    /// * `AlreadyInitialised` - on any call after the first successful one
    /// * `InsufficientFunds` - if the quoted native cost is not strictly below `value`
    #[only_owner]
    pub fn initialise(e: &Env, value: i128) -> Result<Vec<U256>, KeeperError> {
        check_nonnegative_amount(value)?;
        if storage::is_initialised(e) {
            return Err(KeeperError::AlreadyInitialised);
        }
        extend_instance_ttl(e);

        let owner = ownable::get_owner(e).ok_or(KeeperError::OwnerNotSet)?;
        let config = get_config(e);
        let link_needed = config
            .registration_amount
            .checked_mul(config.swarm_size as i128)
            .ok_or(KeeperError::ArithmeticOverflow)?;

        let native_in = quote_native_for_link(e, link_needed)?;
        if native_in >= value {
            return Err(KeeperError::InsufficientFunds);
        }

        set_initialised(e);

        let keeper = e.current_contract_address();
        token::Client::new(e, &get_native_token_address(e)).transfer(&owner, &keeper, &value);

        let native_spent = swap_native_for_link(e, link_needed, native_in)?;
        log!(e, "initialise: bought LINK", link_needed, native_spent);

        let link = get_link_token_address(e);
        let registrar_address = get_upkeep_registrar_address(e);
        let registrar = UpkeepRegistrarClient::new(e, &registrar_address);
        let zero = U256::from_u32(e, 0);

        let mut upkeep_ids: Vec<U256> = Vec::new(e);
        for _ in 0..config.swarm_size {
            authorize_transfer(e, &link, &registrar_address, config.registration_amount);
            let upkeep_id = registrar.register(
                &keeper,
                &keeper,
                &config.gas_limit,
                &config.registration_amount,
            );
            if upkeep_id == zero {
                return Err(KeeperError::InvalidUpkeepId);
            }

            let index = push_swarm_member(e, &upkeep_id);
            UpkeepRegistered {
                index,
                upkeep_id: upkeep_id.clone(),
                amount: config.registration_amount,
            }
            .publish(e);
            upkeep_ids.push_back(upkeep_id);
        }

        Initialised {
            owner,
            value,
            native_spent,
            link_bought: link_needed,
        }
        .publish(e);

        Ok(upkeep_ids)
    }

    /// Buys exactly `amount_out` LINK for the contract, paid from `value`.
    ///
    /// Open to any caller. `value` native is pulled from `caller`; whatever the
    /// swap does not consume stays in the contract. The contract's own native
    /// balance is never used to cover the swap.
    ///
    /// ## Returns:
    /// Native amount spent on the swap
    ///
    /// ## Errors:
    /// * `InvalidAmount` - if `amount_out` is zero
    /// * `ExcessiveInputAmount` - if the quoted native cost exceeds `value`
    pub fn swap_link_in(
        e: &Env,
        caller: Address,
        amount_out: i128,
        value: i128,
    ) -> Result<i128, KeeperError> {
        caller.require_auth();
        check_positive_amount(amount_out)?;
        check_nonnegative_amount(value)?;
        extend_instance_ttl(e);

        let native_in = quote_native_for_link(e, amount_out)?;
        if native_in > value {
            return Err(KeeperError::ExcessiveInputAmount);
        }

        if value > 0 {
            token::Client::new(e, &get_native_token_address(e)).transfer(
                &caller,
                &e.current_contract_address(),
                &value,
            );
        }

        let native_spent = swap_native_for_link(e, amount_out, native_in)?;

        LinkSwappedIn {
            caller,
            value,
            native_spent,
            link_received: amount_out,
        }
        .publish(e);

        Ok(native_spent)
    }

    /// Sells exactly `amount` LINK held by the contract back into native.
    ///
    /// ## Returns:
    /// Native amount received, credited to the contract
    ///
    /// ## Errors:
    /// * `InsufficientLinkBalance` - if the contract holds less than `amount` LINK
    #[only_owner]
    pub fn swap_link_out(e: &Env, amount: i128) -> Result<i128, KeeperError> {
        check_positive_amount(amount)?;
        extend_instance_ttl(e);

        let held = token::Client::new(e, &get_link_token_address(e))
            .balance(&e.current_contract_address());
        if held < amount {
            return Err(KeeperError::InsufficientLinkBalance);
        }

        let native_received = swap_link_for_native(e, amount)?;
        log!(e, "swap_link_out", amount, native_received);

        LinkSwappedOut {
            link_sold: amount,
            native_received,
        }
        .publish(e);

        Ok(native_received)
    }

    /// Upkeep id registered at `index`
    pub fn swarm(e: &Env, index: u32) -> Result<U256, KeeperError> {
        get_swarm_member(e, index).ok_or(KeeperError::SwarmIndexOutOfBounds)
    }

    pub fn swarm_len(e: &Env) -> u32 {
        get_swarm_len(e)
    }

    pub fn is_initialised(e: &Env) -> bool {
        storage::is_initialised(e)
    }

    /// Native amount held by the contract
    pub fn balance(e: &Env) -> i128 {
        token::Client::new(e, &get_native_token_address(e)).balance(&e.current_contract_address())
    }

    /// LINK amount held by the contract
    pub fn link_balance(e: &Env) -> i128 {
        token::Client::new(e, &get_link_token_address(e)).balance(&e.current_contract_address())
    }

    pub fn owner(e: &Env) -> Result<Address, KeeperError> {
        ownable::get_owner(e).ok_or(KeeperError::OwnerNotSet)
    }

    pub fn config(e: &Env) -> KeeperConfig {
        get_config(e)
    }

    /// Native amount `swap_link_in` would currently spend for `amount_out` LINK
    pub fn quote_link_in(e: &Env, amount_out: i128) -> Result<i128, KeeperError> {
        check_positive_amount(amount_out)?;
        quote_native_for_link(e, amount_out)
    }
}

#[cfg(test)]
mod mocks;
