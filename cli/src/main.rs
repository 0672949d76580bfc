//! Interactive terminal client for the ContractDesk API.
//! `BASE_URL` points it at a server; the session token lives in `token.txt`.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use rust_decimal::Decimal;
use shared::models::{
    AccountManagementRequest, AddWalletRequest, BuyContractRequest, LoginRequest,
    RegisterRequest, ResetPinRequest, TradingAccountRequest, WithdrawRequest,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

mod client;
mod session;

use client::ApiClient;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const HEARTBEAT_SECS: u64 = 120;

type Input = Lines<BufReader<Stdin>>;

async fn ask(input: &mut Input, prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(input
        .next_line()
        .await?
        .unwrap_or_default()
        .trim()
        .to_string())
}

async fn ask_u64(input: &mut Input, prompt: &str) -> Result<u64> {
    let raw = ask(input, prompt).await?;
    raw.parse().map_err(|_| anyhow::anyhow!("Not a number"))
}

async fn ask_decimal(input: &mut Input, prompt: &str) -> Result<Decimal> {
    let raw = ask(input, prompt).await?;
    raw.parse().map_err(|_| anyhow::anyhow!("Not an amount"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let base_url = std::env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let mut client = ApiClient::new(&base_url, session::load_token());
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("ContractDesk - {base_url}");
    if !client.ping().await {
        println!("Warning: the server is not reachable right now.");
    }

    loop {
        let keep_going = if client.has_token() {
            main_menu(&mut client, &mut input).await?
        } else {
            auth_menu(&mut client, &mut input).await?
        };
        if !keep_going {
            break;
        }
    }
    Ok(())
}

async fn auth_menu(client: &mut ApiClient, input: &mut Input) -> Result<bool> {
    println!();
    println!("1) Log in");
    println!("2) Register");
    println!("3) Reset PIN");
    println!("0) Quit");
    let choice = ask(input, "> ").await?;

    let result = match choice.as_str() {
        "1" => login(client, input).await,
        "2" => register(client, input).await,
        "3" => reset_pin(client, input).await,
        "0" => return Ok(false),
        _ => {
            println!("Unknown choice.");
            return Ok(true);
        }
    };
    if let Err(e) = result {
        println!("Error: {e}");
    }
    Ok(true)
}

async fn login(client: &mut ApiClient, input: &mut Input) -> Result<()> {
    let email = ask(input, "Email: ").await?;
    let pin = ask(input, "PIN (6 digits): ").await?;
    let resp = client.login(&LoginRequest { email, pin }).await?;
    session::save_token(&resp.token);
    client.set_token(Some(resp.token));
    println!("Logged in.");
    Ok(())
}

async fn register(client: &mut ApiClient, input: &mut Input) -> Result<()> {
    let email = ask(input, "Email: ").await?;
    let pin = ask(input, "Choose a 6-digit PIN: ").await?;
    let permission_code = ask(input, "Permission code: ").await?;
    let resp = client
        .register(&RegisterRequest {
            email,
            pin,
            permission_code,
        })
        .await?;
    session::save_token(&resp.token);
    client.set_token(Some(resp.token));
    println!("Account created, you are logged in.");
    Ok(())
}

async fn reset_pin(client: &mut ApiClient, input: &mut Input) -> Result<()> {
    let email = ask(input, "Email: ").await?;
    let code = ask(input, "Reset code (from support): ").await?;
    let new_pin = ask(input, "New 6-digit PIN: ").await?;
    let resp = client
        .reset_pin(&ResetPinRequest {
            email,
            code,
            new_pin,
        })
        .await?;
    session::save_token(&resp.token);
    client.set_token(Some(resp.token));
    println!("PIN updated, you are logged in.");
    Ok(())
}

async fn main_menu(client: &mut ApiClient, input: &mut Input) -> Result<bool> {
    println!();
    println!("1) Dashboard");
    println!("2) Buy contract");
    println!("3) My contracts");
    println!("4) Stop a contract");
    println!("5) Wallets");
    println!("6) Withdraw");
    println!("7) Withdrawal history");
    println!("8) Run");
    println!("9) Telegram link");
    println!("10) Account management");
    println!("11) Trading accounts");
    println!("12) Log out");
    println!("0) Quit");
    let choice = ask(input, "> ").await?;

    let result = match choice.as_str() {
        "1" => dashboard(client).await,
        "2" => buy_contract(client, input).await,
        "3" => list_contracts(client).await,
        "4" => stop_contract(client, input).await,
        "5" => wallets_menu(client, input).await,
        "6" => withdraw(client, input).await,
        "7" => withdrawal_history(client).await,
        "8" => run_session(client, input).await,
        "9" => telegram_link(client).await,
        "10" => account_management(client, input).await,
        "11" => trading_menu(client, input).await,
        "12" => {
            session::clear_token();
            client.set_token(None);
            println!("Logged out.");
            Ok(())
        }
        "0" => return Ok(false),
        _ => {
            println!("Unknown choice.");
            Ok(())
        }
    };
    if let Err(e) = result {
        println!("Error: {e}");
    }
    Ok(true)
}

async fn dashboard(client: &ApiClient) -> Result<()> {
    let d = client.dashboard().await?;
    println!();
    println!("Contracts:               {}", d.contracts);
    println!("Active principal:        {} USDT", d.total_principal);
    println!("Available for withdraw:  {} USDT", d.available_for_withdraw);
    println!("Total withdrawn:         {} USDT", d.total_withdrawn);
    println!(
        "Account management:      {}",
        if d.account_management_paid { "paid" } else { "not paid" }
    );
    for c in &d.contract_list {
        println!(
            "  #{} - {} USDT, {} days, {}",
            c.id, c.amount, c.duration_days, c.status
        );
    }
    Ok(())
}

async fn buy_contract(client: &ApiClient, input: &mut Input) -> Result<()> {
    let options = client.contract_options().await?;
    println!("Plans:");
    for p in &options.plans {
        println!("  {} - {} USDT", p.id, p.label);
    }
    println!("Durations: {:?} days", options.duration_options_days);
    println!(
        "Send the payment (ERC-20) to: {}",
        options.payment_address_erc20
    );

    let plan_id = ask_u64(input, "Plan id: ").await?;
    let duration: String = ask(input, "Duration in days [30]: ").await?;
    let duration_days = if duration.is_empty() {
        None
    } else {
        Some(duration.parse()?)
    };
    let payment_wallet = ask(input, "Wallet you paid from: ").await?;
    let payment_tx_id = ask(input, "Payment transaction id: ").await?;
    let payout_wallet = ask(input, "Payout wallet (optional): ").await?;

    let resp = client
        .buy(&BuyContractRequest {
            plan_id,
            duration_days,
            payment_wallet,
            payment_tx_id,
            payout_wallet: if payout_wallet.is_empty() {
                None
            } else {
                Some(payout_wallet)
            },
        })
        .await?;
    println!("{} (contract #{})", resp.message, resp.contract_id);
    Ok(())
}

async fn list_contracts(client: &ApiClient) -> Result<()> {
    let contracts = client.contracts().await?;
    if contracts.is_empty() {
        println!("No contracts yet.");
        return Ok(());
    }
    for c in contracts {
        println!(
            "#{} - {} USDT, {} days, {}{}",
            c.id,
            c.amount,
            c.duration_days,
            c.status,
            c.started_at
                .map(|t| format!(", started {}", t.format("%Y-%m-%d")))
                .unwrap_or_default()
        );
    }
    Ok(())
}

async fn stop_contract(client: &ApiClient, input: &mut Input) -> Result<()> {
    let id = ask_u64(input, "Contract id to stop: ").await?;
    let pin = ask(input, "Confirm with your PIN: ").await?;
    let contract = client.stop_contract(id, &pin).await?;
    println!(
        "Contract #{} is now {}. The principal is back in your balance.",
        contract.id, contract.status
    );
    Ok(())
}

async fn wallets_menu(client: &ApiClient, input: &mut Input) -> Result<()> {
    let wallets = client.wallets().await?;
    if wallets.is_empty() {
        println!("No wallets saved yet.");
    }
    for w in &wallets {
        println!(
            "  {} - {}{}{}",
            w.id,
            w.wallet,
            w.label
                .as_deref()
                .map(|l| format!(" ({l})"))
                .unwrap_or_default(),
            if w.is_default { " [default]" } else { "" }
        );
    }
    println!("a) Add wallet  d) Set default  r) Remove  anything else: back");
    match ask(input, "> ").await?.as_str() {
        "a" => {
            let wallet = ask(input, "Wallet address: ").await?;
            let label = ask(input, "Label (optional): ").await?;
            let saved = client
                .add_wallet(&AddWalletRequest {
                    wallet,
                    label: if label.is_empty() { None } else { Some(label) },
                    is_default: false,
                })
                .await?;
            println!("Saved wallet #{}.", saved.id);
        }
        "d" => {
            let id = ask_u64(input, "Wallet id: ").await?;
            let updated = client.set_default_wallet(id).await?;
            println!("Default wallet is now {}.", updated.wallet);
        }
        "r" => {
            let id = ask_u64(input, "Wallet id: ").await?;
            let resp = client.remove_wallet(id).await?;
            println!("{}", resp.message);
        }
        _ => {}
    }
    Ok(())
}

async fn withdraw(client: &ApiClient, input: &mut Input) -> Result<()> {
    println!("Note: withdrawals are accepted between 23:00 and 01:00 UTC.");
    let amount = ask_decimal(input, "Amount (USDT): ").await?;
    let wallet = ask(input, "Wallet (empty = default): ").await?;
    let resp = client
        .withdraw(&WithdrawRequest {
            amount,
            wallet: if wallet.is_empty() { None } else { Some(wallet) },
        })
        .await?;
    println!("{} (withdrawal #{}, {})", resp.message, resp.withdrawal_id, resp.status);
    Ok(())
}

async fn withdrawal_history(client: &ApiClient) -> Result<()> {
    let rows = client.withdrawal_history().await?;
    if rows.is_empty() {
        println!("No withdrawals yet.");
        return Ok(());
    }
    for w in rows {
        println!(
            "#{} - {} USDT to {} - {}{}",
            w.id,
            w.amount,
            w.wallet,
            w.status,
            w.provider
                .as_deref()
                .map(|p| format!(" via {p}"))
                .unwrap_or_default()
        );
    }
    Ok(())
}

/// Start a run and keep it alive with heartbeats until Enter is pressed or
/// the server ends it (22h cap).
async fn run_session(client: &ApiClient, input: &mut Input) -> Result<()> {
    let contracts = client.contracts().await?;
    let active: Vec<_> = contracts.iter().filter(|c| c.status == "active").collect();
    if active.is_empty() {
        println!("You need an active contract to run.");
        return Ok(());
    }
    for c in &active {
        println!("  #{} - {} USDT", c.id, c.amount);
    }
    let contract_id = ask_u64(input, "Contract id: ").await?;

    let started = client.run_start(contract_id).await?;
    println!(
        "Run {} started at {}. Press Enter to stop.",
        started.run_id,
        started.started_at.format("%H:%M:%S UTC")
    );

    let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_SECS));
    interval.tick().await; // immediate first tick
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match client.run_heartbeat(started.run_id).await {
                    Ok(status) if status.ended => {
                        println!(
                            "The server ended this run. Earnings: {} USDT",
                            status.earnings_so_far
                        );
                        return Ok(());
                    }
                    Ok(status) => {
                        println!("  earnings so far: {} USDT", status.earnings_so_far);
                    }
                    Err(e) => println!("  heartbeat failed: {e}"),
                }
            }
            _ = input.next_line() => {
                let stopped = client.run_stop(started.run_id).await?;
                println!("{} Earnings added: {} USDT", stopped.message, stopped.earnings_added);
                return Ok(());
            }
        }
    }
}

async fn telegram_link(client: &ApiClient) -> Result<()> {
    let link = client.telegram_link().await?;
    println!("Open @{} on Telegram and send:", link.bot_name);
    println!("  /start {}", link.token);
    println!(
        "The token expires at {}.",
        link.expires_at.format("%H:%M UTC")
    );
    Ok(())
}

async fn account_management(client: &ApiClient, input: &mut Input) -> Result<()> {
    let amount = ask_decimal(input, "Amount paid (USDT): ").await?;
    let wallet = ask(input, "Wallet you paid from: ").await?;
    let tx_id = ask(input, "Transaction id: ").await?;
    let resp = client
        .account_management(&AccountManagementRequest { amount, wallet, tx_id })
        .await?;
    println!("{}", resp.message);
    Ok(())
}

async fn trading_menu(client: &ApiClient, input: &mut Input) -> Result<()> {
    let accounts = client.trading_accounts().await?;
    if accounts.is_empty() {
        println!("No trading accounts yet.");
    }
    for a in &accounts {
        println!("  {} - {} on {} ({})", a.id, a.login, a.server, a.platform);
    }
    println!("c) Connect account  b) Balance  anything else: back");
    match ask(input, "> ").await?.as_str() {
        "c" => {
            let login = ask(input, "MT login: ").await?;
            let password = ask(input, "MT password: ").await?;
            let server = ask(input, "Broker server: ").await?;
            let platform = ask(input, "Platform (mt4/mt5) [mt5]: ").await?;
            let account = client
                .create_trading_account(&TradingAccountRequest {
                    login,
                    password,
                    server,
                    platform: if platform.is_empty() {
                        None
                    } else {
                        Some(platform)
                    },
                })
                .await?;
            println!("Connected trading account #{}.", account.id);
        }
        "b" => {
            let id = ask_u64(input, "Trading account id: ").await?;
            let info = client.trading_account_balance(id).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        _ => {}
    }
    Ok(())
}
