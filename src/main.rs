/**
* filename : main
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use xOrder::cli::prompt::Prompter;
use xOrder::cli::{self, OrderCommand};
use xOrder::config::Config;
use xOrder::utils::logging;
use xOrder::{OrderSide, TradingBot};

#[derive(Parser)]
#[command(name = "xorder", version, about = "Binance USDT-M Futures order bot (testnet by default)")]
struct Cli {
    /// Path to a config file. Defaults to ./config.{toml,json} when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log orders instead of sending them.
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive order menu (default).
    Menu,
    /// Place a market order.
    Market {
        symbol: String,
        side: OrderSide,
        quantity: Decimal,
    },
    /// Place a GTC limit order.
    Limit {
        symbol: String,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    },
    /// Place a GTC stop-limit order.
    StopLimit {
        symbol: String,
        side: OrderSide,
        quantity: Decimal,
        #[arg(long)]
        stop_price: Decimal,
        #[arg(long)]
        limit_price: Decimal,
    },
    /// Place a simulated OCO (reduce-only take profit + stop) for an open position.
    Oco {
        symbol: String,
        /// Side of the position being protected.
        side: OrderSide,
        quantity: Decimal,
        #[arg(long)]
        take_profit: Decimal,
        #[arg(long)]
        stop_price: Decimal,
    },
    /// Split a market order into chunks submitted at a fixed interval.
    Twap {
        symbol: String,
        side: OrderSide,
        quantity: Decimal,
        /// Number of chunks. Defaults to twap.default_chunks.
        #[arg(long)]
        chunks: Option<u32>,
        /// Seconds between chunks. Defaults to twap.default_interval_secs.
        #[arg(long)]
        interval: Option<f64>,
    },
}

impl Commands {
    fn into_order_command(self) -> Option<OrderCommand> {
        let command = match self {
            Commands::Menu => return None,
            Commands::Market { symbol, side, quantity } => OrderCommand::Market { symbol, side, quantity },
            Commands::Limit { symbol, side, quantity, price } => OrderCommand::Limit { symbol, side, quantity, price },
            Commands::StopLimit { symbol, side, quantity, stop_price, limit_price } => {
                OrderCommand::StopLimit { symbol, side, quantity, stop_price, limit_price }
            }
            Commands::Oco { symbol, side, quantity, take_profit, stop_price } => {
                OrderCommand::Oco { symbol, side, quantity, take_profit_price: take_profit, stop_price }
            }
            Commands::Twap { symbol, side, quantity, chunks, interval } => {
                OrderCommand::Twap { symbol, side, quantity, chunks, interval_seconds: interval }
            }
        };
        Some(command)
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();

    // 설정 로드
    let mut config = Config::load_from(args.config.as_deref())?;
    if args.dry_run {
        config.exchange.dry_run = true;
    }

    // 로깅 초기화
    logging::init(&config.logging)?;
    log::info!("xorder {} 시작", xOrder::VERSION);

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    if !config.exchange.dry_run && !config.has_credentials() {
        prompt_credentials(&mut prompter, &mut config)?;
    }

    let command = match args.command.and_then(Commands::into_order_command) {
        Some(command) => command,
        None => {
            prompter.say("=== Binance Futures Testnet Bot ===")?;
            cli::collect_menu_order(&mut prompter, &config.twap)?
        }
    };

    let bot = TradingBot::from_config(&config)?;

    match cli::execute(&bot, command).await {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            Ok(())
        }
        Err(e) => {
            if let Some(report) = e.partial_report() {
                eprintln!("Partially executed: {}", report.summary());
            }
            Err(e.into())
        }
    }
}

fn prompt_credentials<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, config: &mut Config) -> Result<(), anyhow::Error> {
    log::info!("API credentials not configured, asking interactively");
    config.exchange.api_key = Some(prompter.ask_non_empty("Enter your API Key")?);
    config.exchange.api_secret = Some(prompter.ask_non_empty("Enter your Secret Key")?);
    Ok(())
}
