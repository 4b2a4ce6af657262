// ABOUTME: Entry point for the easyads binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and drives the client pages against the API.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use easyads_client::{App, AuthForm, AuthMode, ClientConfig, Page};
use easyads_core::{Credentials, ProductId, Route};

#[derive(Parser)]
#[command(name = "easyads", version, about = "Turn product photos into generated ads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session token
    Login(CredentialArgs),
    /// Create an account, then sign in
    Signup(CredentialArgs),
    /// Clear the stored session
    Logout,
    /// Show whether a session is stored
    Status,
    /// Navigate to a path such as `/dashboard` or `/product/3`
    Open { path: String },
    /// List your products
    Dashboard,
    /// Upload a new product image
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Show a product and its generations
    Product { id: ProductId },
    /// Request a new generation for a product
    Generate {
        id: ProductId,
        #[arg(long)]
        prompt: String,
    },
}

#[derive(clap::Args)]
struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "EASYADS_PASSWORD", hide_env_values = true)]
    password: String,
}

impl CredentialArgs {
    fn credentials(&self) -> Credentials {
        Credentials::new(self.email.trim(), &self.password)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("easyads=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let app = App::bootstrap(&config)
        .with_context(|| format!("opening client storage in {}", config.home.display()))?;

    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Login(args) => authenticate(app, AuthMode::Login, &args).await,
        Command::Signup(args) => authenticate(app, AuthMode::SignUp, &args).await,
        Command::Logout => {
            let route = app.logout().context("clearing stored session")?;
            println!("Signed out.");
            show(&app.open(route).await)
        }
        Command::Status => {
            app.session().resolved().await;
            println!("{}", render::session(&app.session().state()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Open { path } => {
            let route: Route = path.parse()?;
            show(&app.open(route).await)
        }
        Command::Dashboard => show(&app.open(Route::Dashboard).await),
        Command::Create {
            name,
            description,
            file,
        } => {
            let Page::CreateProduct(mut form) = app.open(Route::CreateProduct).await else {
                return show(&Page::Redirect(Route::Landing));
            };
            form.name = name;
            form.description = description;
            form.select_path(&file).await?;
            match app.create_product(&mut form).await {
                Some(page) => {
                    if let Some(product) = form.created() {
                        println!("Created product {} ({}).\n", product.id, product.name);
                    }
                    show(&page)
                }
                None => {
                    print!("{}", render::page(&Page::CreateProduct(form)));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Product { id } => show(&app.open(Route::Product(id)).await),
        Command::Generate { id, prompt } => {
            let page = app.open(Route::Product(id)).await;
            let Page::Product(mut product) = page else {
                return show(&page);
            };
            if product.detail().error().is_some() {
                return show(&Page::Product(product));
            }
            product.set_prompt(prompt);
            let generated = product.generate().await;
            let page = Page::Product(product);
            print!("{}", render::page(&page));
            Ok(if generated.is_some() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

async fn authenticate(
    app: &App,
    mode: AuthMode,
    args: &CredentialArgs,
) -> anyhow::Result<ExitCode> {
    let mut form = AuthForm::new(mode);
    match app.sign_in(&mut form, &args.credentials()).await {
        Some(page) => {
            println!("Signed in as {}.\n", args.email.trim());
            show(&page)
        }
        None => {
            eprintln!("{}", form.error().unwrap_or("An error occurred"));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Print a page. Redirects and failed loads exit non-zero.
fn show(page: &Page) -> anyhow::Result<ExitCode> {
    print!("{}", render::page(page));
    let failed = match page {
        Page::Redirect(_) => true,
        Page::Dashboard(dashboard) => {
            dashboard.products().error().is_some() || dashboard.error().is_some()
        }
        Page::Product(product) => product.detail().error().is_some(),
        Page::Landing | Page::CreateProduct(_) => false,
    };
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
