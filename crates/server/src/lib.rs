//! Web front door for the archetype report service.
//!
//! Stateless request routing over lookup structures built once at startup
//! and shared through [`AppState`]. No session identity: the `paid` query
//! flag is the whole trust model. See the "forged paid flag" note in
//! DESIGN.md and the test pinning it.

use anyhow::{Context as AnyhowContext, Result};
use archetype_checkout::{CheckoutConfig, CheckoutGateway, DEFAULT_DOMAIN};
use archetype_codes::{CodeStore, FileCodeStore};
use archetype_extractor::load_narratives;
use archetype_registry::{ArchetypeRegistry, DEFAULT_CANDIDATES};
use archetype_report::ReportService;
use axum::{
    body::Body,
    extract::Query,
    http::{Response as HttpResponse, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

mod pages;

pub const DEFAULT_CHECKOUT_CODE: &str = "Medium-Medium-Medium-Medium-Medium";

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub struct AppState {
    pub reports: ReportService,
    pub codes: Arc<dyn CodeStore>,
    pub checkout: CheckoutGateway,
}

#[derive(Parser)]
#[command(name = "archetype-server")]
#[command(about = "Big-Five archetype report service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the report site over HTTP
    Serve(ServeArgs),

    /// Mint one free-access code and print it
    #[command(name = "gen-code")]
    GenCode(StoreArgs),

    /// Extract the narrative document and print a per-code summary
    Inspect(DocumentArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:5000
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: String,

    /// Narrative source document (.docx, or plain text with one paragraph per line)
    #[arg(long, default_value = "morrowland.docx")]
    document: PathBuf,

    /// Registry candidate files, highest priority first
    #[arg(long = "registry")]
    registry: Vec<PathBuf>,

    /// Free-access code store file
    #[arg(long, default_value = "free_codes.json")]
    codes_file: PathBuf,

    /// External base URL for payment redirect targets (env: DOMAIN)
    #[arg(long)]
    domain: Option<String>,
}

#[derive(Args)]
struct StoreArgs {
    /// Free-access code store file
    #[arg(long, default_value = "free_codes.json")]
    codes_file: PathBuf,
}

#[derive(Args)]
struct DocumentArgs {
    /// Narrative source document
    #[arg(long, default_value = "morrowland.docx")]
    document: PathBuf,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::GenCode(args) => gen_code(args).await,
        Commands::Inspect(args) => inspect(args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

async fn serve(args: ServeArgs) -> Result<()> {
    let narratives = load_narratives(&args.document)
        .with_context(|| format!("Failed to read {}", args.document.display()))?;
    let candidates = registry_candidates(&args.registry);
    let registry = ArchetypeRegistry::load(&candidates);

    let domain = args
        .domain
        .or_else(|| env::var("DOMAIN").ok())
        .unwrap_or_else(|| DEFAULT_DOMAIN.to_string());
    let secret_key = env::var("STRIPE_SECRET_KEY").unwrap_or_default();
    if secret_key.is_empty() {
        log::warn!("STRIPE_SECRET_KEY is empty; checkout sessions will fail");
    }

    let state = Arc::new(AppState {
        reports: ReportService::new(narratives, registry),
        codes: Arc::new(FileCodeStore::new(&args.codes_file)),
        checkout: CheckoutGateway::new(CheckoutConfig::new(secret_key, domain))?,
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    log::info!(
        "Serving archetype reports on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn gen_code(args: StoreArgs) -> Result<()> {
    let store = FileCodeStore::new(&args.codes_file);
    let token = store.generate().await?;
    println!("{token}");
    Ok(())
}

fn inspect(args: DocumentArgs) -> Result<()> {
    let narratives = load_narratives(&args.document)?;
    let mut entries: Vec<(&str, &str)> = narratives.iter_by_code().collect();
    entries.sort_by_key(|(code, _)| *code);
    for (code, text) in &entries {
        let name = narratives.name_for_text(text).unwrap_or("Unknown");
        println!("{code}  {name}  ({} chars)", text.chars().count());
    }
    println!("{} narratives", entries.len());
    Ok(())
}

fn registry_candidates(flags: &[PathBuf]) -> Vec<PathBuf> {
    if flags.is_empty() {
        DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect()
    } else {
        flags.to_vec()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { html_response(pages::landing_page()) }))
        .route(
            "/generate-free-code",
            get({
                let state = state.clone();
                move || generate_free_code(state.clone())
            }),
        )
        .route(
            "/report",
            get({
                let state = state.clone();
                move |query| report_entry(query, state.clone())
            }),
        )
        .route(
            "/create-checkout-session",
            get({
                let state = state.clone();
                move |query| create_checkout_session(query, state.clone())
            }),
        )
        .route(
            "/api/render-report",
            get({
                let state = state.clone();
                move |query| render_report(query, state.clone())
            }),
        )
        .route("/subtype", get(|| async { html_response(pages::quiz_page()) }))
        .route(
            "/api/download-report",
            get({
                let state = state.clone();
                move |query| download_report(query, state.clone())
            }),
        )
        .route(
            "/debug/all-reports",
            get({
                let state = state.clone();
                move || debug_all_reports(state.clone())
            }),
        )
        .route(
            "/health",
            get({
                let state = state.clone();
                move || health(state.clone())
            }),
        )
}

#[derive(Deserialize)]
struct ReportEntryParams {
    #[serde(default)]
    code: String,
    #[serde(default)]
    free: String,
}

#[derive(Deserialize)]
struct CheckoutParams {
    code: Option<String>,
}

#[derive(Deserialize)]
struct RenderParams {
    #[serde(default)]
    code: String,
    #[serde(default)]
    paid: String,
}

#[derive(Deserialize)]
struct DownloadParams {
    #[serde(default)]
    code: String,
}

async fn generate_free_code(state: Arc<AppState>) -> Response {
    match state.codes.generate().await {
        Ok(token) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "new_code": token }),
        ),
        Err(err) => {
            log::error!("Failed to generate free code: {err}");
            plain_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate free code: {err}"),
            )
        }
    }
}

/// Entry point from the landing page: a successful free-code redemption goes
/// straight to the unlocked report, anything else falls through to checkout.
async fn report_entry(Query(params): Query<ReportEntryParams>, state: Arc<AppState>) -> Redirect {
    let redeemed = if params.free.is_empty() {
        false
    } else {
        match state.codes.redeem(&params.free).await {
            Ok(ok) => ok,
            Err(err) => {
                log::error!("Code redemption failed: {err}");
                false
            }
        }
    };

    if redeemed {
        Redirect::to(&render_report_location(&params.code))
    } else {
        Redirect::to(&checkout_location(&params.code))
    }
}

async fn create_checkout_session(
    Query(params): Query<CheckoutParams>,
    state: Arc<AppState>,
) -> Response {
    let code = params
        .code
        .unwrap_or_else(|| DEFAULT_CHECKOUT_CODE.to_string());
    match state.checkout.create_session(&code).await {
        Ok(session_url) => Redirect::to(&session_url).into_response(),
        Err(err) => plain_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Stripe session creation failed: {err}"),
        ),
    }
}

async fn render_report(Query(params): Query<RenderParams>, state: Arc<AppState>) -> Response {
    // Trust boundary: this bare query flag is the only payment proof there
    // is. Any client can set it.
    let paid = params.paid.eq_ignore_ascii_case("true");
    let view = state.reports.render(&params.code, paid);
    html_response(pages::report_page(&view))
}

async fn download_report(Query(params): Query<DownloadParams>, state: Arc<AppState>) -> Response {
    match state.reports.download(&params.code) {
        Ok(doc) => HttpResponse::builder()
            .status(StatusCode::OK)
            .header("content-type", DOCX_MIME)
            .header(
                "content-disposition",
                format!("attachment; filename=\"{}\"", doc.filename),
            )
            .body(Body::from(doc.bytes))
            .expect("valid HTTP response"),
        Err(err) => {
            log::error!("Failed to build report document: {err}");
            plain_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to build report document: {err}"),
            )
        }
    }
}

async fn debug_all_reports(state: Arc<AppState>) -> Response {
    html_response(pages::debug_page(state.reports.narratives()))
}

async fn health(state: Arc<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "status": "ok",
            "narratives": state.reports.narratives().len(),
            "registry": state.reports.registry().len(),
        }),
    )
}

fn render_report_location(code: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("code", code)
        .append_pair("paid", "true")
        .finish();
    format!("/api/render-report?{query}")
}

fn checkout_location(code: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("code", code)
        .finish();
    format!("/create-checkout-session?{query}")
}

fn html_response(html: String) -> Response {
    HttpResponse::builder()
        .status(StatusCode::OK)
        .header("content-type", "text/html; charset=utf-8")
        .body(Body::from(html))
        .expect("valid HTTP response")
}

fn json_response(status: StatusCode, value: &serde_json::Value) -> Response {
    HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(value.to_string()))
        .expect("valid HTTP response")
}

fn plain_response(status: StatusCode, message: String) -> Response {
    HttpResponse::builder()
        .status(status)
        .header("content-type", "text/plain; charset=utf-8")
        .body(Body::from(message))
        .expect("valid HTTP response")
}
