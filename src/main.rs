use clap::Parser;
use staff_posts::core::ConfigProvider;
use staff_posts::utils::error::{AppError, ErrorSeverity};
use staff_posts::utils::{logger, validation::Validate};
use staff_posts::{CliConfig, LocalStorage, PageRunner, RunSummary, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting staff-posts CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = match cli.config.clone() {
        Some(path) => {
            tracing::info!("📄 Loading configuration from {}", path);
            match TomlConfig::from_file(&path) {
                Ok(config) => run(config).await,
                Err(e) => Err(e),
            }
        }
        None => run(cli).await,
    };

    match result {
        Ok(summary) => {
            tracing::info!("✅ Page rendered successfully!");
            println!("✅ Rendered {} employees", summary.employees);
            if let Some(user_id) = summary.selected_user {
                println!(
                    "👤 Employee {}: {} post cards, {} comment sections expanded",
                    user_id, summary.post_cards, summary.expanded
                );
            }
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Page render failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run<C>(config: C) -> Result<RunSummary, AppError>
where
    C: ConfigProvider + Validate,
{
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let mut runner = PageRunner::from_config(&config, storage)?;
    runner.run().await
}
