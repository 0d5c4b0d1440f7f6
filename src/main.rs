use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use videyhost::{
    client::{ApiClient, IpifyLookup},
    config::Config,
    error::VideyError,
    format::{format_count, format_date, format_datetime, format_rupiah, format_rupiah_precise},
    models::{PaymentChannel, User},
    services::{
        download_file_name, session::PAYMENT_METHOD_SUCCESS_KEY, withdrawal::estimated_processing,
        AdRotation,
        AuthService, Catalog, DashboardService, DateRange, ImpressionOutcome, PaymentMethodDraft,
        PaymentMethodService, PlaybackSession, ProgressCallback, SessionStore, UploadProgress,
        UploadSettings, Uploader, VideoCache, VideoService, WithdrawalFlow,
    },
};

#[derive(Parser)]
#[command(name = "videyhost", version, about = "Upload, share and earn from videos", long_about = None)]
struct Cli {
    /// Session file, overrides SESSION_FILE
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        username: String,
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Upload a video and print its short link
    Upload {
        path: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    /// Open a video by short key and record the viewer's impression
    Play {
        key: String,
        /// Also report entering full screen
        #[arg(long)]
        fullscreen: bool,
    },
    /// Show the last uploaded video's download link
    Download,
    Dashboard,
    /// Daily earnings, newest first
    Earnings {
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },
    /// Past withdrawals
    Withdrawals {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show withdrawal options, or request one
    Withdraw {
        option: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    #[command(subcommand)]
    PaymentMethods(PaymentMethodCommand),
    /// Browse the video catalog
    Catalog {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Resolve a redirect id to its target URL
    Redirect { id: String },
}

#[derive(Subcommand)]
enum PaymentMethodCommand {
    List,
    Add(MethodArgs),
    Edit {
        id: u64,
        #[command(flatten)]
        method: MethodArgs,
    },
    Delete { id: u64 },
}

#[derive(clap::Args)]
struct MethodArgs {
    /// Dana, Ovo, LinkAja, Gopay or Bank
    channel: PaymentChannel,
    #[arg(long)]
    receiver: String,
    #[arg(long)]
    account: String,
    #[arg(long)]
    bank: Option<String>,
}

impl From<MethodArgs> for PaymentMethodDraft {
    fn from(args: MethodArgs) -> Self {
        Self {
            channel: args.channel,
            receiver_name: args.receiver,
            account_number: args.account,
            bank_name: args.bank,
        }
    }
}

struct App {
    config: Config,
    api: ApiClient,
    accounts: ApiClient,
    session: SessionStore,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let known = e.downcast_ref::<VideyError>();
        tracing::error!(
            code = known.map(VideyError::error_code).unwrap_or("INTERNAL_ERROR"),
            "Command failed: {:#}",
            e
        );
        eprintln!("Something went wrong: {:#}", e);
        if !known.is_some_and(VideyError::is_user_error) {
            eprintln!("Please try again in a moment.");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    tracing::debug!("Environment: {:?}", config.environment);

    let session_path = cli.session.unwrap_or_else(|| config.session_file.clone());
    let session = SessionStore::load(&session_path)
        .await
        .with_context(|| format!("Failed to read session file {}", session_path.display()))?;

    let app = App {
        api: ApiClient::new(&config.api_url, config.http_timeout)?,
        accounts: ApiClient::new(&config.account_api_url, config.http_timeout)?,
        session,
        config,
    };

    let result = dispatch(&app, cli.command).await;
    app.session.save().await?;
    result
}

async fn dispatch(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = AuthService::new(app.accounts.clone())
                .login(&email, &password, &app.session)
                .await?;
            println!("Welcome, {}!", user.display_name());
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            AuthService::new(app.accounts.clone())
                .register(&username, &email, &password)
                .await?;
            println!("Registration successful, please log in.");
        }
        Command::Logout => {
            AuthService::new(app.accounts.clone()).logout(&app.session);
            println!("Logged out.");
        }
        Command::Upload { path, title } => upload(app, path, title).await?,
        Command::Play { key, fullscreen } => play(app, &key, fullscreen).await?,
        Command::Download => match app.session.download() {
            Some((url, name)) => {
                println!("Download {}: {}", name.as_deref().unwrap_or("video"), url);
                print_sponsored(&AdRotation::default());
            }
            None => println!("No video available to download."),
        },
        Command::Dashboard => {
            let user = signed_in(app).await?;
            let summary = DashboardService::new(app.api.clone())
                .summary(user.user_id)
                .await?;
            println!("Hello, {}", user.display_name());
            println!("Revenue today:     {}", format_rupiah_precise(summary.revenue.total_revenue));
            println!("Impressions today: {}", format_count(summary.revenue.total_impressions));
            println!("Average CPM:       {}", format_rupiah_precise(summary.revenue.avg_cpm));
            println!("Balance:           {}", format_rupiah(summary.balance));
        }
        Command::Earnings { start, end } => {
            let user = signed_in(app).await?;
            let rows = DashboardService::new(app.api.clone())
                .earnings(user.user_id, DateRange::new(start, end)?)
                .await?;
            if rows.is_empty() {
                println!("No earnings yet.");
            }
            for row in rows {
                let day = row.day().map(format_date).unwrap_or(row.date.clone());
                println!(
                    "{:<20} {:>10} impressions  {:>16}  CPM {}",
                    day,
                    format_count(row.impressions),
                    format_rupiah_precise(row.earnings),
                    row.cpm.map(format_rupiah_precise).unwrap_or_else(|| "-".to_string())
                );
            }
        }
        Command::Withdrawals { page } => {
            let user = signed_in(app).await?;
            let page = DashboardService::new(app.api.clone())
                .withdrawal_history(user.user_id, app.session.token(), page)
                .await?;
            if page.items.is_empty() {
                println!("No withdrawals yet.");
            }
            for t in &page.items {
                println!(
                    "#{:<6} {:<22} {:>14}  {}",
                    t.transaction_id,
                    t.created_at.map(format_datetime).unwrap_or_default(),
                    format_rupiah(t.amount),
                    t.description
                );
            }
            println!("Page {} of {}", page.page, page.total_pages.max(1));
        }
        Command::Withdraw { option, yes } => withdraw(app, option, yes).await?,
        Command::PaymentMethods(cmd) => payment_methods(app, cmd).await?,
        Command::Catalog { search, page } => {
            let mut catalog = Catalog::load(&app.api).await?;
            if let Some(query) = search {
                catalog.search(&query);
            }
            catalog.go_to(page);

            let ads = AdRotation::default();
            let mut rng = rand::rng();
            let current = catalog.current_page();
            for entry in &current.items {
                let link = ads
                    .embed_url(&mut rng, &entry.id)
                    .unwrap_or_else(|| entry.url.clone());
                println!("{:<40} {}", entry.title, link);
            }

            let window = catalog.window();
            let mut pages = Vec::new();
            if window.leading_first {
                pages.push("1 …".to_string());
            }
            pages.extend(window.pages.iter().map(|p| {
                if *p == current.page {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            }));
            if let Some(last) = window.trailing_last {
                pages.push(format!("… {}", last));
            }
            println!("{} videos  pages: {}", current.total_items, pages.join(" "));
            print_sponsored(&ads);
        }
        Command::Redirect { id } => {
            let link = AdRotation::default().resolve(&id)?.clone();
            println!("{}", link.url);
        }
    }

    Ok(())
}

async fn signed_in(app: &App) -> Result<User> {
    Ok(AuthService::new(app.accounts.clone())
        .ensure_authenticated(&app.session)
        .await?)
}

async fn upload(app: &App, path: PathBuf, title: Option<String>) -> Result<()> {
    let settings = UploadSettings {
        upload_url: app.config.upload_url.clone(),
        cdn_url: app.config.cdn_url.clone(),
        public_base_url: app.config.public_base_url.clone(),
        max_bytes: app.config.max_upload_bytes,
        chunk_size: app.config.upload_chunk_size,
    };
    let http = reqwest::Client::builder()
        .user_agent(concat!("videyhost/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let uploader = Uploader::new(http, app.api.clone(), settings);

    let on_progress: ProgressCallback = Arc::new(|p: UploadProgress| {
        print!("\rUploading... {}%", p.percent);
        let _ = std::io::stdout().flush();
    });
    let receipt = uploader.upload(&path, title, &app.session, on_progress).await?;

    println!();
    println!("Upload complete: {}", receipt.file_name);
    println!("Share link: {}", receipt.short_link);
    Ok(())
}

async fn play(app: &App, key: &str, fullscreen: bool) -> Result<()> {
    let videos = VideoService::new(app.api.clone(), VideoCache::default());
    let ip_lookup = IpifyLookup::new(app.api.http().clone(), &app.config.ip_lookup_url);

    let playback = PlaybackSession::open(
        &videos,
        &ip_lookup,
        app.api.clone(),
        key,
        app.config.impression_dedup,
    )
    .await?;

    let video = playback.video();
    println!("{}", video.title);
    if let Some(description) = &video.description {
        println!("{}", description);
    }
    println!("Watch: {}", video.video_url);

    report_impression("play", playback.on_play().await);
    if fullscreen {
        report_impression("full screen", playback.on_fullscreen_change(true).await);
    }

    app.session
        .set_download(&video.video_url, &download_file_name(&video.video_url));
    Ok(())
}

fn print_sponsored(ads: &AdRotation) {
    if let Some(url) = ads.random_popunder(&mut rand::rng()) {
        println!("Sponsored: {}", url);
    }
}

fn report_impression(event: &str, outcome: ImpressionOutcome) {
    match outcome {
        ImpressionOutcome::Sent => println!("Impression recorded ({})", event),
        ImpressionOutcome::Suppressed => println!("Impression already counted ({})", event),
        ImpressionOutcome::Skipped | ImpressionOutcome::Failed => {}
    }
}

async fn withdraw(app: &App, option: Option<String>, yes: bool) -> Result<()> {
    let user = signed_in(app).await?;
    let mut flow = WithdrawalFlow::load(app.accounts.clone(), user.user_id, app.config.min_withdrawal).await?;

    if app.session.take_flag(PAYMENT_METHOD_SUCCESS_KEY) {
        println!("Payment method saved successfully.");
    }

    println!(
        "Balance: {}",
        flow.balance().map(format_rupiah).unwrap_or_else(|| "-".to_string())
    );
    match flow.payment_method() {
        Some(m) => println!("Payout to: {} {} ({})", m.payment_method, m.account_number, m.receiver_name),
        None => println!("No payment method yet. Add one with `videyhost payment-methods add`."),
    }

    let Some(option_id) = option else {
        for o in flow.options() {
            let marker = if o.enabled { " " } else { "x" };
            println!("[{}] {:<5} {:>14}  {}", marker, o.id, format_rupiah(o.amount), o.description);
        }
        println!();
        for r in flow.requests() {
            let eta = estimated_processing(&r)
                .map(|at| format!(" (estimated {})", format_date(at.date_naive())))
                .unwrap_or_default();
            println!(
                "{:<10} {:>14}  {}{}",
                r.status,
                format_rupiah(r.amount),
                r.requested_at.map(format_datetime).unwrap_or_default(),
                eta
            );
        }
        return Ok(());
    };

    let selected = flow.select(&option_id)?.clone();
    if !yes && !confirm(&format!("Withdraw {}?", format_rupiah(selected.amount)))? {
        flow.cancel();
        println!("Withdrawal cancelled.");
        return Ok(());
    }

    let request = flow.confirm().await?;
    println!(
        "Withdrawal of {} requested ({}).",
        format_rupiah(request.amount),
        request.status
    );
    if let Some(balance) = flow.balance() {
        println!("New balance: {}", format_rupiah(balance));
    }
    Ok(())
}

async fn payment_methods(app: &App, cmd: PaymentMethodCommand) -> Result<()> {
    let user = signed_in(app).await?;
    let service = PaymentMethodService::new(app.accounts.clone());

    match cmd {
        PaymentMethodCommand::List => {
            let methods = service.list(user.user_id).await?;
            if methods.is_empty() {
                println!("No payment methods yet.");
            }
            for m in methods {
                println!(
                    "{:<6} {:<8} {:<20} {}{}",
                    m.id.map(|id| id.to_string()).unwrap_or_default(),
                    m.payment_method,
                    m.account_number,
                    m.receiver_name,
                    m.bank_name.map(|b| format!(" ({})", b)).unwrap_or_default()
                );
            }
        }
        PaymentMethodCommand::Add(args) => {
            service.create(user.user_id, args.into(), &app.session).await?;
            println!("Payment method added.");
        }
        PaymentMethodCommand::Edit { id, method } => {
            service.update(user.user_id, id, method.into()).await?;
            println!("Payment method updated.");
        }
        PaymentMethodCommand::Delete { id } => {
            service.delete(id).await?;
            println!("Payment method deleted.");
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
