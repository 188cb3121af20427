//! Face Attendance CLI
//!
//! Command-line front end for the attendance service: sign up, sign in
//! with a password or a face capture, mark attendance and list records.

use clap::{Parser, Subcommand};
use face_attendance::{
    capture::{CaptureSession, MockSource, PreviewTarget, StillImage, VideoSource},
    client::ApiClient,
    config::FileConfig,
    flows::{capture_when, AttendanceFlow, AuthFlow, Dashboard, FlowError, SignupForm},
    session::{FileStorage, SessionStore},
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "face-attendance", version, about = "Face-recognition attendance client")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL (overrides config and environment).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Use a synthetic camera instead of real hardware.
    #[arg(long, global = true)]
    mock_camera: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account with a face capture.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in with a face capture.
    LoginFace,
    /// Mark attendance with a face capture.
    Mark,
    /// List attendance records.
    List,
    /// Forget the stored session.
    Logout,
    /// Show the current session.
    Whoami,
}

struct App {
    config: FileConfig,
    store: Arc<SessionStore>,
    client: ApiClient,
    source: Arc<dyn VideoSource>,
    preview: Arc<PreviewTarget>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(run(cli));
    // A pending stdin read must not hold the process open after cancel.
    runtime.shutdown_timeout(Duration::from_millis(100));

    if let Err(message) = result {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    info!("Face Attendance client v{}", face_attendance::VERSION);
    let app = App::build(&cli)?;

    match cli.command {
        Command::Signup {
            name,
            email,
            password,
        } => {
            let form = SignupForm {
                name,
                email,
                password,
            };
            // Reject bad input before turning the camera on
            form.validate().map_err(report)?;
            let face = app.capture_face().await?;
            AuthFlow::new(app.client.clone())
                .signup(&form, face.as_ref())
                .await
                .map_err(report)?;
            println!("Signup successful! Your account has been created. Please login.");
        }
        Command::Login { email, password } => {
            let user = AuthFlow::new(app.client.clone())
                .login(&email, &password)
                .await
                .map_err(report)?;
            println!("Login successful! Welcome back, {}.", user.name);
        }
        Command::LoginFace => {
            let face = app.capture_face().await?.ok_or("Capture cancelled")?;
            let user = AuthFlow::new(app.client.clone())
                .login_face(&face)
                .await
                .map_err(report)?;
            println!("Face recognition success! Welcome back, {}.", user.name);
        }
        Command::Mark => {
            let face = app.capture_face().await?.ok_or("Capture cancelled")?;
            let mut flow = AttendanceFlow::new(app.client.clone());
            flow.mark(&face).await.map_err(report)?;
            if let Some(at) = flow.marked_at() {
                println!(
                    "Attendance marked! Your attendance has been recorded at {}",
                    at.format("%H:%M:%S")
                );
            }
        }
        Command::List => {
            let summary = Dashboard::new(app.client.clone())
                .load()
                .await
                .map_err(report)?;
            print_summary(&summary);
        }
        Command::Logout => {
            app.store.clear();
            println!("Logged out.");
        }
        Command::Whoami => match app.store.current() {
            Some(credential) => match credential.user {
                Some(user) => println!("{} <{}> (id {})", user.name, user.email, user.id),
                None => println!("Signed in (identity not loaded since last restart)"),
            },
            None => println!("Not signed in"),
        },
    }

    Ok(())
}

impl App {
    fn build(cli: &Cli) -> Result<Self, String> {
        let config = match &cli.config {
            Some(path) => FileConfig::from_file(path).map_err(|e| e.to_string())?,
            None => FileConfig::default(),
        };
        let config = config
            .with_env_overrides()
            .and_then(|c| c.with_api_url(cli.api_url.clone()))
            .map_err(|e| e.to_string())?;

        let store = Arc::new(SessionStore::open(Box::new(FileStorage::new(
            &config.storage.session_file,
        ))));
        let client = ApiClient::new(&config.api, Arc::clone(&store))
            .map_err(|e| format!("Failed to build http client: {}", e))?;
        info!(base_url = %client.base_url(), "Using attendance service");

        Ok(Self {
            source: video_source(cli.mock_camera),
            preview: Arc::new(PreviewTarget::new()),
            config,
            store,
            client,
        })
    }

    /// Opens the camera and waits for the user to take the picture.
    async fn capture_face(&self) -> Result<Option<StillImage>, String> {
        let mut session = CaptureSession::new(
            self.config.capture.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.preview),
        );

        let still = capture_when(&mut session, shutter())
            .await
            .map_err(|e| FlowError::from(e).user_message())?;
        if let Some(still) = &still {
            println!("Face captured ({}x{}).", still.width(), still.height());
        }
        Ok(still)
    }
}

/// Resolves to true on Enter, false on `q` or Ctrl-C.
async fn shutter() -> bool {
    print!("Camera active. Press Enter to capture, q then Enter or Ctrl-C to cancel: ");
    let _ = std::io::stdout().flush();

    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    });

    tokio::select! {
        read = line => match read {
            Ok(Ok(line)) => !line.trim().eq_ignore_ascii_case("q"),
            _ => false,
        },
        _ = tokio::signal::ctrl_c() => {
            println!();
            false
        }
    }
}

#[cfg(feature = "camera")]
fn video_source(mock: bool) -> Arc<dyn VideoSource> {
    if mock {
        warn!("Using mock camera input");
        return Arc::new(MockSource::new());
    }
    Arc::new(face_attendance::capture::NokhwaSource::new())
}

#[cfg(not(feature = "camera"))]
fn video_source(mock: bool) -> Arc<dyn VideoSource> {
    if !mock {
        warn!("Built without the `camera` feature, using mock camera input");
    }
    Arc::new(MockSource::new())
}

fn report(err: FlowError) -> String {
    if let Some(failure) = err.request_failure() {
        warn!(status = ?failure.status, "Request failed: {}", failure);
    }
    err.user_message()
}

fn print_summary(summary: &face_attendance::flows::AttendanceSummary) {
    println!(
        "Total records: {}   Unique users: {}",
        summary.total(),
        summary.unique_users()
    );
    if summary.is_empty() {
        println!("No attendance records found");
        return;
    }

    println!("{:<24} {:<12} {:<10}", "Name", "Date", "Time");
    for record in &summary.records {
        let date = record
            .local_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| record.timestamp.clone());
        let time = record
            .local_time()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        println!("{:<24} {:<12} {:<10}", record.user_name, date, time);
    }
}
