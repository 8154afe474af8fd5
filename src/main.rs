use anyhow::{bail, Context};
use clap::{Arg, ArgMatches, Command};
use fraud_sentinel::analyzers::{CallMetadata, MessageInput, PhoneInput, QrInput};
use fraud_sentinel::assistant::{Assistant, DisabledGenerator, HttpTextGenerator, TextGenerator};
use fraud_sentinel::config::OutputFormat;
use fraud_sentinel::{
    mascrow, CheckRecord, CheckRequest, CheckType, CombinedAnalysis, Config, EvidenceReport,
    ThreatEngine,
};
use log::LevelFilter;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let matches = Command::new("fraud-sentinel")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic fraud and phishing risk scoring")
        .long_about(
            "Scores URLs, phone numbers, QR payloads, WhatsApp links and messages against\n\
             fixed indicator catalogs, optionally adds a generated assessment, and prints\n\
             the resulting history record or evidence report.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/fraud-sentinel.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-rule detail")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check-type")
                .short('t')
                .long("check-type")
                .value_name("TYPE")
                .help("Content type: url, phone, qr, whatsapp, message")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("VALUE")
                .help("Content to analyze (messages also accept sender|||body)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("sender")
                .long("sender")
                .value_name("SENDER")
                .help("Declared sender of a message")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("transcript")
                .long("transcript")
                .value_name("TEXT")
                .help("Call transcript for phone checks")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("caller-name")
                .long("caller-name")
                .value_name("NAME")
                .help("Caller ID name for phone checks")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("call-duration")
                .long("call-duration")
                .value_name("SECONDS")
                .help("Call duration in seconds for phone checks")
                .value_parser(clap::value_parser!(u64))
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("fingerprint")
                .long("fingerprint")
                .value_name("HASH")
                .help("Mascrow fingerprint printed with a QR code")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("fingerprint-of")
                .long("fingerprint-of")
                .value_name("CONTENT")
                .help("Print the Mascrow fingerprint of CONTENT and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("salt")
                .long("salt")
                .value_name("SALT")
                .help("Salt used with --fingerprint-of")
                .default_value(""),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("TYPE")
                .help("Print the indicator catalog for TYPE as JSON and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("with-links")
                .long("with-links")
                .help("For messages, also score every embedded URL and print the combined result")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .help("Print a plain-text evidence report instead of the record")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Err(e) = run(&matches).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    if let Some(path) = matches.get_one::<String>("generate-config") {
        Config::default()
            .to_file(path)
            .with_context(|| format!("writing {path}"))?;
        println!("Default configuration written to: {path}");
        return Ok(());
    }

    if let Some(content) = matches.get_one::<String>("fingerprint-of") {
        let salt = matches
            .get_one::<String>("salt")
            .map(String::as_str)
            .unwrap_or("");
        println!("{}", mascrow::fingerprint_with_salt(content, salt));
        return Ok(());
    }

    if let Some(check_type) = matches.get_one::<String>("catalog") {
        let check_type: CheckType = check_type.parse()?;
        println!("{}", serde_json::to_string_pretty(&check_type.catalog())?);
        return Ok(());
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/fraud-sentinel.yaml");
    let config = Config::load_or_default(config_path)?;

    if matches.get_flag("test-config") {
        config.validate()?;
        println!("Configuration OK");
        println!(
            "Assistant: {}",
            if config.assistant.enabled {
                format!("{} ({})", config.assistant.endpoint, config.assistant.model)
            } else {
                "disabled".to_string()
            }
        );
        return Ok(());
    }

    let request = build_request(matches)?;
    let engine = ThreatEngine::new();

    if matches.get_flag("with-links") {
        let CheckRequest::Message(input) = &request else {
            bail!("--with-links only applies to message checks");
        };
        let combined = engine.analyze_message_with_links(input);
        match config.output.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&combined)?),
            OutputFormat::Text => print_combined(&combined),
        }
        return Ok(());
    }

    let timeout = Duration::from_secs(config.assistant.timeout_seconds.max(1));
    let record = if config.assistant.enabled {
        let generator = HttpTextGenerator::from_config(&config.assistant)
            .context("building assistant HTTP client")?;
        review(generator, timeout, &engine, &request).await
    } else {
        review(DisabledGenerator, timeout, &engine, &request).await
    };

    if record.should_notify() {
        log::warn!(
            "{} check flagged as {}: {}",
            record.check_type,
            record.severity,
            record.indicators.join(", ")
        );
    }

    if matches.get_flag("report") {
        print!("{}", EvidenceReport::new(record).render_text());
        return Ok(());
    }

    match config.output.format {
        OutputFormat::Json if config.output.pretty => {
            println!("{}", serde_json::to_string_pretty(&record)?)
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&record)?),
        OutputFormat::Text => print_summary(&record),
    }
    Ok(())
}

async fn review<G: TextGenerator>(
    generator: G,
    timeout: Duration,
    engine: &ThreatEngine,
    request: &CheckRequest,
) -> CheckRecord {
    Assistant::new(generator, timeout).review(engine, request).await
}

fn build_request(matches: &ArgMatches) -> anyhow::Result<CheckRequest> {
    let Some(check_type) = matches.get_one::<String>("check-type") else {
        bail!("--check-type is required (url, phone, qr, whatsapp, message)");
    };
    let check_type: CheckType = check_type.parse()?;
    let Some(input) = matches.get_one::<String>("input") else {
        bail!("--input is required");
    };
    if input.trim().is_empty() {
        bail!("--input must not be empty");
    }

    let request = match check_type {
        CheckType::Phone => {
            let metadata = CallMetadata {
                caller_name: matches.get_one::<String>("caller-name").cloned(),
                call_duration_secs: matches.get_one::<u64>("call-duration").copied(),
                transcript: matches.get_one::<String>("transcript").cloned(),
            };
            let mut phone = PhoneInput::new(input);
            if metadata != CallMetadata::default() {
                phone = phone.with_metadata(metadata);
            }
            CheckRequest::Phone(phone)
        }
        CheckType::Qr => {
            let mut qr = QrInput::new(input);
            if let Some(fingerprint) = matches.get_one::<String>("fingerprint") {
                qr = qr.with_fingerprint(fingerprint);
            }
            CheckRequest::Qr(qr)
        }
        CheckType::Message => match matches.get_one::<String>("sender") {
            Some(sender) => CheckRequest::Message(MessageInput::new(sender, input)),
            None => CheckRequest::Message(MessageInput::from_legacy(input)),
        },
        other => CheckRequest::from_check(other, input),
    };
    Ok(request)
}

fn print_indicators(indicators: &[String]) {
    if indicators.is_empty() {
        println!("Indicators:  none");
    } else {
        println!("Indicators:");
        for indicator in indicators {
            println!("  - {}", indicator);
        }
    }
}

fn print_combined(combined: &CombinedAnalysis) {
    println!("Analyses:    {}", combined.members.len());
    for member in &combined.members {
        println!("  - {}: {:.2} ({})", member.category, member.score, member.severity);
    }
    println!("Overall:     {:.2} ({})", combined.overall_score, combined.overall_severity);
    print_indicators(&combined.indicators());
}

fn print_summary(record: &CheckRecord) {
    println!("Check type:  {}", record.check_type);
    println!("Input:       {}", record.input_value);
    println!(
        "Score:       {:.2} ({}, {:?})",
        record.score, record.severity, record.alert_level
    );
    print_indicators(&record.indicators);
    println!("Assessment:  {}", record.ai_analysis);
}
