use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, warn};

use random_quotes::animation::{HeartField, DEFAULT_HEART_COUNT};
use random_quotes::harvester::Harvester;
use random_quotes::quotes::{QuoteService, RngSource};
use random_quotes::{server, AppConfig};

#[derive(Parser)]
#[command(name = "random-quotes")]
#[command(about = "随机引用服务")]
#[command(version)]
struct Cli {
    /// 引用文件路径（覆盖 QUOTES_FILE）
    #[arg(short, long, global = true)]
    quotes: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 启动 HTTP 服务
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// 输出一条随机引用
    Quote {
        /// 语言代码，`any` 表示所有语言
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// 采集并翻译引用
    Harvest {
        /// 只运行一轮
        #[arg(long)]
        once: bool,
    },
    /// 输出背景动画帧（JSON，每行一帧）
    Hearts {
        #[arg(long, default_value_t = 16.0 / 9.0)]
        aspect: f64,
        #[arg(long, default_value_t = 60)]
        ticks: u64,
        #[arg(long, default_value_t = DEFAULT_HEART_COUNT)]
        count: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载环境变量
    dotenv::dotenv().ok();

    // 初始化日志，输出到 stderr 以免混入引用文本
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "random_quotes=info".to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.quotes {
        config.quotes_file = path;
    }

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            info!("🚀 启动随机引用服务...");
            server::start_server(&config.server, QuoteService::new(&config.quotes_file)).await?;
        }
        Command::Quote { lang } => {
            let service = QuoteService::new(&config.quotes_file);
            let mut rng = RngSource::from_entropy();
            println!("{}", service.random_quote_text(lang.as_deref(), &mut rng).await);
        }
        Command::Harvest { once } => {
            let harvester = Harvester::new(config.harvest.clone(), &config.quotes_file)?;
            if once {
                let report = harvester.run_once().await?;
                if !report.written {
                    warn!("⚠️ 没有写入新的引用文件");
                }
            } else {
                harvester.run_periodic().await?;
            }
        }
        Command::Hearts {
            aspect,
            ticks,
            count,
            seed,
        } => {
            if !aspect.is_finite() || aspect <= 0.0 {
                anyhow::bail!("aspect 必须是正数: {}", aspect);
            }
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut field = HeartField::new(aspect, count, &mut rng);
            for frame in field.frames(ticks) {
                println!("{}", serde_json::to_string(&frame)?);
            }
        }
    }

    Ok(())
}
