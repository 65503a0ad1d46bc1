use chrono::{DateTime, Local, TimeZone};
use clap::Parser;
use semester_trigger::core::report::{self, TriggerReport};
use semester_trigger::domain::ports::SettingsStore;
use semester_trigger::utils::error::ErrorSeverity;
use semester_trigger::utils::{logger, validation::Validate};
use semester_trigger::{CliConfig, OutputFormat, SemesterTrigger, TomlConfig, TriggerError};

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 設定值錯誤
        ErrorSeverity::High => 1,     // 設定或資料錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

fn main() {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting semester-trigger");
    if args.verbose {
        tracing::debug!("CLI config: {:?}", args);
    }

    // 驗證配置
    if let Err(e) = args.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = match args.parsed_now() {
        Ok(Some(now)) => run(&args, now),
        Ok(None) => run(&args, Local::now()),
        Err(e) => Err(e),
    };

    match result {
        Ok(worst) => {
            if let Some(severity) = worst {
                let code = exit_code(severity);
                if code > 0 {
                    std::process::exit(code);
                }
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Evaluation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.severity()));
        }
    }
}

/// 回傳個別觸發器錯誤中最嚴重的等級
fn run<Tz: TimeZone>(
    args: &CliConfig,
    now: DateTime<Tz>,
) -> Result<Option<ErrorSeverity>, TriggerError> {
    tracing::info!("📁 Loading configuration from: {}", args.config);
    let config = TomlConfig::from_file(&args.config)?;
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let mut store = config.build_store(now.date_naive())?;
    match args.data.as_deref().or(config.data_path()) {
        Some(path) => {
            let loaded = store.load_csv_file(path)?;
            tracing::info!("📥 Loaded {} course field values from {}", loaded, path);
        }
        None => tracing::warn!("⚠️ No course data file configured, evaluating with empty data"),
    }

    let trigger = SemesterTrigger::new(&store, &store, &store, config.seasons);

    for trigger_id in store.trigger_ids() {
        let settings = store.trigger_settings(trigger_id)?;
        for problem in trigger.ensure_validity(&settings) {
            tracing::warn!("⚠️ Trigger {}: {}", trigger_id, problem);
        }
    }

    tracing::info!("🕒 Evaluating as of {}", now.naive_local());
    let results = match args.trigger {
        Some(trigger_id) => vec![(trigger_id, trigger.evaluate(trigger_id, &now))],
        None => trigger.evaluate_all(&now),
    };

    let worst = results
        .iter()
        .filter_map(|(_, result)| result.as_ref().err())
        .map(TriggerError::severity)
        .max();

    let mut reports = report::build_reports(&results);
    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - course ids are omitted");
        if args.format != OutputFormat::Text {
            reports.iter_mut().for_each(|r: &mut TriggerReport| r.due_courses.clear());
        }
    }

    let output = match args.format {
        OutputFormat::Text => report::render_text(&reports, !args.dry_run),
        OutputFormat::Json => report::render_json(&reports)?,
        OutputFormat::Csv => report::render_csv(&reports)?,
    };
    println!("{}", output);

    Ok(worst)
}
