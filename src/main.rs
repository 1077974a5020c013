use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use clinicbook::config::AppConfig;
use clinicbook::services::ai::openai::OpenAiProvider;
use clinicbook::services::extractor::PatternSet;
use clinicbook::services::notify::smtp::SmtpMailer;
use clinicbook::services::notify::template::load_template;
use clinicbook::services::provider::calendly::CalendlyProvider;
use clinicbook::services::scheduling::unknown_event_types;
use clinicbook::session::run_session;
use clinicbook::state::AppState;
use clinicbook::store::AppointmentStore;

#[derive(Parser, Debug)]
#[command(name = "clinicbook", about = "Book hospital appointments through a conversation")]
struct Args {
    #[arg(long, help = "Verbose diagnostics, also echoed to stderr")]
    debug: bool,

    #[arg(long, default_value = "logs/app.log")]
    log_file: PathBuf,

    #[arg(long, help = "Print saved appointments and exit")]
    list: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(&args)?;

    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.openai_model,
        data_dir = %config.data_dir.display(),
        date_order = config.date_order.as_str(),
        "starting appointment assistant"
    );

    let store = AppointmentStore::open(&config.data_dir)?;
    if args.list {
        return list_appointments(&store);
    }

    let llm = OpenAiProvider::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.temperature,
        config.http_timeout,
    )?;
    let scheduler = CalendlyProvider::new(
        config.calendly_base_url.clone(),
        config.calendly_api_key.clone(),
        config.calendly_user_uri.clone(),
        config.http_timeout,
    )?;
    let mailer = SmtpMailer::new(
        &config.email_smtp_server,
        config.email_smtp_port,
        config.email_username.clone(),
        config.email_password.clone(),
        &config.email_sender_name,
        load_template(&config.email_template_path),
        config.http_timeout,
    )?;

    match unknown_event_types(&scheduler, &config.event_types).await {
        Ok(unknown) => {
            for (specialty, id) in unknown {
                tracing::warn!(
                    specialty = specialty.as_str(),
                    event_type_id = %id,
                    "configured event type not offered by the scheduling provider"
                );
            }
        }
        Err(e) => tracing::warn!(error = %e, "could not verify event types"),
    }

    let state = AppState {
        config,
        llm: Box::new(llm),
        scheduler: Box::new(scheduler),
        mailer: Box::new(mailer),
        store,
        patterns: PatternSet::default(),
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let end = run_session(&state, stdin, &mut std::io::stdout(), interrupt).await?;
    tracing::info!(end = ?end, "session finished");
    Ok(())
}

fn list_appointments(store: &AppointmentStore) -> anyhow::Result<()> {
    let paths = store.list_appointments()?;
    if paths.is_empty() {
        println!("No saved appointments.");
    }
    for path in paths {
        match store.load_appointment(&path) {
            Ok(record) => println!(
                "{}  {:<9}  {} {}  {}  {}",
                record.id,
                record.status.as_str(),
                record.details.date,
                record.details.time,
                record.details.specialty,
                record.details.patient_name,
            ),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record"),
        }
    }
    Ok(())
}

// RUST_LOG wins, then LOG_LEVEL, then --debug.
fn init_tracing(args: &Args) -> anyhow::Result<()> {
    if let Some(parent) = args.log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)?;

    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|level| EnvFilter::try_new(level).ok())
            .unwrap_or_else(|| EnvFilter::new(default_level))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(args.debug.then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    Ok(())
}
