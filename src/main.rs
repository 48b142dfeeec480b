//! Terminal front end for a single consultation
//!
//! Registers a patient, then relays each typed line to the driver until the
//! doctor issues the final prescription, which is written out as a PDF.

use med_consult::db::Database;
use med_consult::llm::{LlmConfig, ModelRegistry};
use med_consult::{
    ConsultConfig, ConversationDriver, Finalizer, Language, PatientProfile, PrintPdfRenderer,
    Session,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (stderr, so the conversation on stdout stays readable)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "med_consult=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let db_path = std::env::var("CONSULT_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.med-consult/patients.db")
    });
    let output_dir =
        std::env::var("CONSULT_OUTPUT_DIR").map_or_else(|_| PathBuf::from("."), PathBuf::from);

    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %db_path, "Opening database");
    let db = Database::open(&db_path)?;

    let registry = ModelRegistry::new(&LlmConfig::from_env());
    if registry.has_models() {
        tracing::info!(models = ?registry.available_models(), "LLM registry initialized");
    } else {
        tracing::warn!(
            "No LLM API keys configured. Set GROQ_API_KEY, OPENAI_API_KEY or LLM_GATEWAY."
        );
    }
    let driver = ConversationDriver::from_registry(&registry, ConsultConfig::from_env());

    let pdf_font = std::env::var("CONSULT_PDF_FONT").ok();
    let renderer = match &pdf_font {
        Some(path) => PrintPdfRenderer::with_font_file(path),
        None => PrintPdfRenderer::new(),
    };
    let finalizer = Finalizer::new(Arc::new(renderer));

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let Some(profile) = register(&mut input).await? else {
        return Ok(());
    };
    let record = db.register_patient(&profile)?;
    println!("\nRegistered patient {}.", record.id);
    println!("Describe your symptoms. Type 'quit' to leave.\n");

    let language = profile.language.clone();
    if pdf_font.is_none() && language.needs_unicode_font() {
        tracing::warn!(
            language = %language,
            "CONSULT_PDF_FONT is not set; the prescription PDF uses Helvetica and may be unreadable"
        );
    }
    let mut session = Session::new(profile);

    while !session.is_finalized() {
        let Some(line) = prompt(&mut input, "You").await? else {
            return Ok(());
        };
        if line.eq_ignore_ascii_case("quit") {
            return Ok(());
        }
        if line.is_empty() {
            continue;
        }

        match driver.advance(&mut session, &line, &language).await {
            Ok(advance) => println!("\nDoctor: {}\n", advance.reply),
            Err(e) => {
                eprintln!("{}", e.user_message());
                tracing::warn!(error = %e, "Consultation round failed");
                if !e.is_retryable() {
                    return Ok(());
                }
            }
        }
    }

    match finalizer.finalize(&session) {
        Ok(rendered) => {
            let path = rendered.write_to(&output_dir)?;
            if let Some(text) = session.prescription() {
                db.save_prescription(&record.id, &session.id(), text)?;
            }
            println!("Prescription saved to {}", path.display());
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            tracing::error!(error = %e, "Prescription finalization failed");
        }
    }

    Ok(())
}

/// Print a label and read one trimmed line; `None` on end of input
async fn prompt(input: &mut Input, label: &str) -> std::io::Result<Option<String>> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?.map(|l| l.trim().to_string()))
}

/// Ask until a non-empty value parses
async fn prompt_parsed<T: std::str::FromStr>(
    input: &mut Input,
    label: &str,
) -> std::io::Result<Option<T>> {
    loop {
        let Some(raw) = prompt(input, label).await? else {
            return Ok(None);
        };
        if let Ok(value) = raw.parse() {
            return Ok(Some(value));
        }
        println!("Please enter a valid value.");
    }
}

async fn register(input: &mut Input) -> std::io::Result<Option<PatientProfile>> {
    println!("Patient registration");

    let Some(name) = prompt_required(input, "Name").await? else {
        return Ok(None);
    };
    let Some(age) = prompt_parsed::<u32>(input, "Age").await? else {
        return Ok(None);
    };
    let Some(gender) = prompt_required(input, "Gender").await? else {
        return Ok(None);
    };
    let Some(phone) = prompt(input, "Phone").await? else {
        return Ok(None);
    };
    let Some(weight) = prompt_required(input, "Weight (kg)").await? else {
        return Ok(None);
    };
    let Some(allergies) = prompt(input, "Allergies").await? else {
        return Ok(None);
    };
    let Some(language) = prompt_parsed::<Language>(input, "Language (English/Hindi/Telugu)").await?
    else {
        return Ok(None);
    };

    Ok(Some(PatientProfile {
        name,
        age,
        gender,
        phone,
        weight,
        allergies,
        language,
    }))
}

async fn prompt_required(input: &mut Input, label: &str) -> std::io::Result<Option<String>> {
    loop {
        match prompt(input, label).await? {
            None => return Ok(None),
            Some(value) if !value.is_empty() => return Ok(Some(value)),
            Some(_) => println!("{label} is required."),
        }
    }
}
