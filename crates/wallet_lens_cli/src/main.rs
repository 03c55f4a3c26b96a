//! wallet-lens CLI: one-shot wallet queries and an interactive dashboard shell.

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::error;
use wallet_lens::{
    table_from, Chain, Config, FetchConfig, FetchError, NetWorthOptions, Tabular, TxFilter,
    WalletApi,
};
use wallet_lens_report::render_table;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();
    let cli = Cli::parse();

    // The credential is checked once, before any client exists: a missing key
    // must perform zero upstream calls.
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!(
                "Set [moralis] api_key in {} and restart.",
                cli.config.display()
            );
            std::process::exit(1);
        }
    };

    let api = WalletApi::new(config.api_key().to_string(), FetchConfig::default())?;
    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Command::Shell => run_shell(&rt, &api, cli.address, cli.chain)?,
        other => {
            let address = cli
                .address
                .ok_or("--address is required for one-shot queries")?;
            if let Some(query) = other.into_query() {
                run_query(&rt, &api, &address, cli.chain, &query);
            }
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "wallet-lens")]
#[command(about = "Explore wallet balances, transfers, NFTs and PnL across chains")]
struct Cli {
    /// Config file holding the Moralis API key under [moralis] api_key.
    #[arg(long, default_value = "wallet_lens.toml")]
    config: PathBuf,
    /// Wallet address to query.
    #[arg(long)]
    address: Option<String>,
    /// Hex EVM chain ID (0x1, 0x89, 0x38, 0xa86a) or alias (ethereum, solana, bitcoin).
    #[arg(long, default_value = "0x1")]
    chain: Chain,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Native balance of the wallet.
    Balance,
    /// Fungible-token balances (ERC-20 or SPL), zero balances filtered out.
    Tokens,
    /// Wallet transaction history (EVM chains only).
    Transactions {
        #[arg(long)]
        from_block: Option<u64>,
        #[arg(long)]
        to_block: Option<u64>,
        #[arg(long)]
        from_date: Option<String>,
        #[arg(long)]
        to_date: Option<String>,
    },
    /// NFT transfer history.
    NftTransfers,
    /// NFTs held by the wallet, with flattened metadata.
    Nfts,
    /// Fungible-token transfer history.
    TokenTransfers,
    /// Net worth in USD per chain.
    NetWorth {
        /// Include tokens flagged as possible spam.
        #[arg(long)]
        include_spam: bool,
        /// Include unverified contracts.
        #[arg(long)]
        include_unverified: bool,
    },
    /// Profitability summary.
    Pnl,
    /// Per-token profitability breakdown.
    PnlBreakdown,
    /// Interactive shell; repeated queries share one response cache.
    Shell,
}

enum Query {
    Balance,
    Tokens,
    Transactions(TxFilter),
    NftTransfers,
    Nfts,
    TokenTransfers,
    NetWorth(NetWorthOptions),
    Pnl,
    PnlBreakdown,
}

impl Command {
    fn into_query(self) -> Option<Query> {
        match self {
            Command::Balance => Some(Query::Balance),
            Command::Tokens => Some(Query::Tokens),
            Command::Transactions {
                from_block,
                to_block,
                from_date,
                to_date,
            } => Some(Query::Transactions(TxFilter {
                from_block,
                to_block,
                from_date,
                to_date,
            })),
            Command::NftTransfers => Some(Query::NftTransfers),
            Command::Nfts => Some(Query::Nfts),
            Command::TokenTransfers => Some(Query::TokenTransfers),
            Command::NetWorth {
                include_spam,
                include_unverified,
            } => Some(Query::NetWorth(NetWorthOptions {
                exclude_spam: !include_spam,
                exclude_unverified_contracts: !include_unverified,
            })),
            Command::Pnl => Some(Query::Pnl),
            Command::PnlBreakdown => Some(Query::PnlBreakdown),
            Command::Shell => None,
        }
    }
}

fn run_query(
    rt: &tokio::runtime::Runtime,
    api: &WalletApi,
    address: &str,
    chain: Chain,
    query: &Query,
) {
    match query {
        Query::Balance => match rt.block_on(api.native_balance(address, chain)) {
            Ok(Some(balance)) => {
                println!("Native Balance ({}): {}", chain.name(), balance.formatted());
            }
            Ok(None) => println!("No native balance found for this wallet."),
            Err(e) => report_failure("native balance", &e),
        },
        Query::Tokens => {
            print_rows("Token Balances", rt.block_on(api.token_balances(address, chain)));
        }
        Query::Transactions(filter) => print_rows(
            "Wallet Transactions",
            rt.block_on(api.wallet_transactions(address, chain, filter)),
        ),
        Query::NftTransfers => {
            print_rows("NFT Transfers", rt.block_on(api.nft_transfers(address, chain)));
        }
        Query::Nfts => print_rows("NFTs", rt.block_on(api.nfts(address, chain))),
        Query::TokenTransfers => {
            print_rows("Token Transfers", rt.block_on(api.token_transfers(address, chain)));
        }
        Query::NetWorth(options) => print_rows(
            "Wallet Net Worth",
            rt.block_on(api.net_worth(address, chain, *options)),
        ),
        Query::Pnl => print_rows("Wallet PnL", rt.block_on(api.pnl_summary(address, chain))),
        Query::PnlBreakdown => match rt.block_on(api.pnl_breakdown(address, chain)) {
            Ok(Some(groups)) if !groups.is_empty() => {
                for group in groups {
                    println!("Wallet PnL for token {}:", group.label);
                    println!("{}", render_table(&table_from("PnL", &group.rows)));
                }
            }
            Ok(_) => println!("No profitability breakdown found for this wallet."),
            Err(e) => report_failure("PnL breakdown", &e),
        },
    }
}

fn print_rows<T: Tabular>(title: &str, result: Result<Option<Vec<T>>, FetchError>) {
    match result {
        Ok(Some(rows)) if !rows.is_empty() => {
            println!("{title}:");
            println!("{}", render_table(&table_from(title, &rows)));
        }
        Ok(Some(_)) => println!("No records found for {title}."),
        Ok(None) => println!("No data found for {title}."),
        Err(e) => report_failure(title, &e),
    }
}

/// Upstream failures never abort the session; they log and render as "no data".
fn report_failure(what: &str, e: &FetchError) {
    error!(error = %e, what, "query failed");
    println!("Failed to retrieve {what}: {e}");
}

fn run_shell(
    rt: &tokio::runtime::Runtime,
    api: &WalletApi,
    address: Option<String>,
    chain: Chain,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut address = address;
    let mut chain = chain;
    println!("wallet-lens shell, chain {}. Type 'help' for commands.", chain.name());
    let stdin = std::io::stdin();
    loop {
        print!("wallet-lens> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else { continue };
        match verb {
            "help" => print_help(),
            "quit" | "exit" => break,
            "address" => match parts.next() {
                Some(a) => {
                    address = Some(a.to_string());
                    println!("Address set.");
                }
                None => println!("usage: address <wallet>"),
            },
            "chain" => match parts.next().map(str::parse::<Chain>) {
                Some(Ok(c)) => {
                    chain = c;
                    println!("Chain set to {}.", chain.name());
                }
                Some(Err(e)) => println!("{e}"),
                None => println!("usage: chain <id|alias>"),
            },
            "clear-cache" => {
                api.clear_cache();
                println!("Cache cleared.");
            }
            "cache" => println!(
                "{} cached entries, {} upstream requests so far",
                api.cached_entries(),
                api.request_count()
            ),
            verb => match shell_query(verb) {
                Some(query) => match &address {
                    Some(address) => run_query(rt, api, address, chain, &query),
                    None => println!("Set an address first: address <wallet>"),
                },
                None => println!("Unknown command '{verb}', type 'help'."),
            },
        }
    }
    Ok(())
}

fn shell_query(verb: &str) -> Option<Query> {
    match verb {
        "balance" => Some(Query::Balance),
        "tokens" => Some(Query::Tokens),
        "transactions" | "txs" => Some(Query::Transactions(TxFilter::default())),
        "nft-transfers" => Some(Query::NftTransfers),
        "nfts" => Some(Query::Nfts),
        "token-transfers" => Some(Query::TokenTransfers),
        "net-worth" => Some(Query::NetWorth(NetWorthOptions::default())),
        "pnl" => Some(Query::Pnl),
        "pnl-breakdown" => Some(Query::PnlBreakdown),
        _ => None,
    }
}

fn print_help() {
    println!("Session:  address <wallet> | chain <id|alias> | cache | clear-cache | quit");
    println!("Queries:  balance | tokens | transactions | nft-transfers | nfts");
    println!("          token-transfers | net-worth | pnl | pnl-breakdown");
    println!("Chains:   0x1 0x5 0x89 0x38 0xa86a solana bitcoin (aliases accepted)");
}
